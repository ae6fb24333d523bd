use std::io;

use thiserror::Error;

/// Library-wide error type for ltrtml operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure outside the ledger (e.g. debug capture).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Missing or empty required setting.
    #[error("{0}")]
    Configuration(String),

    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    ConfigMissing(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A constraint field is empty.
    #[error("No value for constraint '{key}'")]
    IncompleteConstraints { key: String },

    /// A constraint field holds a value outside its allowed set.
    #[error("Invalid value '{value}' for constraint '{key}'")]
    InvalidConstraintValue { key: String, value: String },

    /// Filter is not fitted to the instrument.
    #[error("Filter '{filter}' is not available for {instrument} (check name and case)")]
    UnsupportedFilter { instrument: String, filter: String },

    /// Sprat grating other than red or blue.
    #[error("Unsupported grating '{0}': must be one of red, blue")]
    UnsupportedGrating(String),

    /// Frodo arm resolution other than high or low.
    #[error("Unsupported resolution '{value}' for {arm} arm: must be one of high, low")]
    UnsupportedResolution { arm: String, value: String },

    /// Moptop rotor speed other than fast or slow.
    #[error("Unsupported rotor speed '{value}' for filter '{filter}': must be one of fast, slow")]
    UnsupportedRotorSpeed { filter: String, value: String },

    /// Required instrument field is empty.
    #[error("Missing value for {instrument} field '{field}'")]
    MissingField { instrument: String, field: String },

    /// Sexagesimal coordinate does not split into three components.
    #[error("Malformed {axis} coordinate '{value}': expected three colon-separated components")]
    MalformedCoordinate { axis: String, value: String },

    /// Observation group has no observations.
    #[error("Observation group is empty")]
    EmptyGroup,

    /// Network, authentication or SOAP-level failure.
    #[error("Transport error: {message}")]
    Transport { message: String, status: Option<u16> },

    /// Response that is unparseable or carries an unexpected mode.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Service explicitly rejected the document.
    #[error("{reason}{}", uid_suffix(.uid))]
    Rejected { uid: Option<String>, reason: String },

    /// Ledger could not be read, decoded or written. `uid` names a group the service already
    /// accepted but that could not be recorded.
    #[error("Ledger error: {message}{}", uid_suffix(.uid))]
    Persistence { message: String, uid: Option<String> },

    /// Document serialization failed.
    #[error("XML error: {0}")]
    Xml(String),
}

fn uid_suffix(uid: &Option<String>) -> String {
    uid.as_ref().map(|u| format!(" (uid {u})")).unwrap_or_default()
}

impl AppError {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        AppError::Transport { message: message.into(), status: None }
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        AppError::Persistence { message: message.into(), uid: None }
    }

    /// Attach the uid of an accepted group to a ledger failure; other errors pass through.
    pub fn with_accepted_uid(self, accepted: &str) -> Self {
        match self {
            AppError::Persistence { message, .. } => {
                AppError::Persistence { message, uid: Some(accepted.to_string()) }
            }
            other => other,
        }
    }

    /// True for failures detected while assembling a document, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::IncompleteConstraints { .. }
                | AppError::InvalidConstraintValue { .. }
                | AppError::UnsupportedFilter { .. }
                | AppError::UnsupportedGrating(_)
                | AppError::UnsupportedResolution { .. }
                | AppError::UnsupportedRotorSpeed { .. }
                | AppError::MissingField { .. }
                | AppError::MalformedCoordinate { .. }
                | AppError::EmptyGroup
        )
    }
}

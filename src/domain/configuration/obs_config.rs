//! Observation client configuration models.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;

/// Configuration loaded from the client's TOML settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObsConfig {
    /// RTML account and proposal details.
    pub account: AccountConfig,
    /// Node agent endpoint.
    pub service: ServiceConfig,
    /// Submitted-uid ledger location.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Request/response capture.
    #[serde(default)]
    pub debug: DebugConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ObsConfig {
    pub fn new(account: AccountConfig, service: ServiceConfig) -> Self {
        Self {
            account,
            service,
            ledger: LedgerConfig::default(),
            debug: DebugConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.account.validate()?;
        self.service.validate()?;
        self.ledger.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// RTML account details. Must match the Phase2 account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub username: String,
    #[serde(default)]
    pub rtml_password: String,
    /// Proposal (project) identifier.
    pub proposal: String,
    /// Prefix for generated group uids.
    pub prefix: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("rtml_password", &"[REDACTED]")
            .field("proposal", &self.proposal)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl AccountConfig {
    pub fn new(username: &str, rtml_password: &str, proposal: &str, prefix: &str) -> Self {
        Self {
            username: username.into(),
            rtml_password: rtml_password.into(),
            proposal: proposal.into(),
            prefix: prefix.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (key, value) in [
            ("username", &self.username),
            ("rtml_password", &self.rtml_password),
            ("proposal", &self.proposal),
            ("prefix", &self.prefix),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("account.{} must not be empty", key)));
            }
        }
        Ok(())
    }
}

/// Node agent SOAP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.into(), port, path: default_path(), timeout_secs: default_timeout() }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.host.trim().is_empty() {
            return Err(AppError::Configuration("service.host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(AppError::Configuration("service.port must be greater than 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "service.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.endpoint()?;
        Ok(())
    }

    /// `http://<host>:<port><path>`
    pub fn endpoint(&self) -> Result<Url, AppError> {
        let path = self.path.strip_prefix('/').unwrap_or(&self.path);
        let raw = format!("http://{}:{}/{}", self.host.trim(), self.port, path);
        Url::parse(&raw).map_err(|e| {
            AppError::Configuration(format!("Invalid service endpoint '{}': {}", raw, e))
        })
    }
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/node_agent2/node_agent".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Where accepted group uids are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// File stem; the ledger lives at `<dir>/<name>.json`.
    #[serde(default = "default_ledger_name")]
    pub name: String,
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { name: default_ledger_name(), dir: default_dir() }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Configuration("ledger.name must not be empty".to_string()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(AppError::Configuration(format!(
                "ledger.name '{}' must be a plain file name",
                self.name
            )));
        }
        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name.trim()))
    }
}

fn default_ledger_name() -> String {
    "submitted".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Request/response capture for troubleshooting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Save every outgoing and incoming document as `<uid>.RTML`.
    #[serde(default)]
    pub save_rtml: bool,
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self { save_rtml: false, dir: default_dir() }
    }
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Terminal,
    File,
}

/// Log configuration; `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub output: LogOutput,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), output: LogOutput::default(), file: default_log_file() }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.level.trim().is_empty() {
            return Err(AppError::Configuration("logging.level must not be empty".to_string()));
        }
        if self.output == LogOutput::File && self.file.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "logging.file is required when logging.output = \"file\"".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("ltrtml.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ObsConfig {
        ObsConfig::new(
            AccountConfig::new("observer", "secret", "PL20A01", "PROJ"),
            ServiceConfig::new("161.72.57.3", 8080),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.path(), PathBuf::from("./submitted.json"));
        assert!(!config.debug.save_rtml);
        assert_eq!(config.logging.output, LogOutput::Terminal);
    }

    #[test]
    fn empty_account_fields_are_rejected() {
        for field in ["username", "rtml_password", "proposal", "prefix"] {
            let mut config = config();
            match field {
                "username" => config.account.username.clear(),
                "rtml_password" => config.account.rtml_password = "  ".into(),
                "proposal" => config.account.proposal.clear(),
                _ => config.account.prefix.clear(),
            }
            let err = config.validate().unwrap_err();
            assert!(matches!(err, AppError::Configuration(ref msg) if msg.contains(field)));
        }
    }

    #[test]
    fn service_validation() {
        let mut config = config();
        config.service.host = String::new();
        let err = config.validate();
        assert!(matches!(err, Err(AppError::Configuration(msg)) if msg.contains("host")));

        let mut config = self::config();
        config.service.port = 0;
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.service.timeout_secs = 0;
        let err = config.validate();
        assert!(matches!(err, Err(AppError::Configuration(msg)) if msg.contains("timeout_secs")));
    }

    #[test]
    fn endpoint_joins_host_port_and_path() {
        let url = ServiceConfig::new("example.org", 8080).endpoint().unwrap();
        assert_eq!(url.as_str(), "http://example.org:8080/node_agent2/node_agent");

        let service =
            ServiceConfig { path: "agent".into(), ..ServiceConfig::new("example.org", 9000) };
        assert_eq!(service.endpoint().unwrap().as_str(), "http://example.org:9000/agent");
    }

    #[test]
    fn ledger_name_must_be_plain() {
        let ledger = LedgerConfig { name: "../escape".into(), ..Default::default() };
        assert!(ledger.validate().is_err());
        let ledger = LedgerConfig { name: "".into(), ..Default::default() };
        assert!(ledger.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", config().account);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret"));
    }
}

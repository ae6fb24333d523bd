//! Interpretation of node agent RTML responses.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::domain::AppError;
use crate::domain::rtml::Mode;

/// Reason used when the service rejects a document without saying why.
pub const REJECTED_REASON: &str = "submission rejected by service";

/// Root attributes (and optional reason text) of a response document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RtmlResponse {
    pub mode: Option<String>,
    pub uid: Option<String>,
    pub reason: Option<String>,
}

/// Terminal state of a request from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed { uid: String },
    Rejected { uid: Option<String>, reason: String },
}

impl Outcome {
    /// Turn a rejection into [`AppError::Rejected`], passing confirmations through.
    pub fn into_confirmed(self) -> Result<String, AppError> {
        match self {
            Outcome::Confirmed { uid } => Ok(uid),
            Outcome::Rejected { uid, reason } => Err(AppError::Rejected { uid, reason }),
        }
    }
}

/// Read the `RTML` root attributes and any `Reason` text.
pub fn parse_response(raw: &str) -> Result<RtmlResponse, AppError> {
    let mut reader = Reader::from_str(raw);
    let mut response: Option<RtmlResponse> = None;
    let mut in_reason = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if response.is_none() {
                    response = Some(read_root(&e)?);
                } else if local_name(&e) == "Reason" {
                    in_reason = true;
                }
            }
            Ok(Event::Empty(e)) => {
                if response.is_none() {
                    response = Some(read_root(&e)?);
                }
            }
            Ok(Event::Text(t)) if in_reason => {
                let text = t.unescape().map_err(|e| AppError::ProtocolViolation(e.to_string()))?;
                let text = text.trim();
                if let Some(resp) = response.as_mut()
                    && !text.is_empty()
                {
                    resp.reason.get_or_insert_with(String::new).push_str(text);
                }
            }
            Ok(Event::End(_)) => in_reason = false,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::ProtocolViolation(format!(
                    "Unparseable response at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    response.ok_or_else(|| AppError::ProtocolViolation("Response has no root element".to_string()))
}

/// Map a raw response document onto an [`Outcome`].
///
/// Anything other than `confirm` with a uid, or `reject`, is a protocol violation.
pub fn interpret(raw: &str) -> Result<Outcome, AppError> {
    let response = parse_response(raw)?;
    let mode = response
        .mode
        .as_deref()
        .ok_or_else(|| AppError::ProtocolViolation("Response has no mode attribute".to_string()))?;

    match Mode::parse(mode) {
        Some(Mode::Confirm) => {
            let uid = response.uid.filter(|u| !u.trim().is_empty()).ok_or_else(|| {
                AppError::ProtocolViolation("Confirm response has no uid".to_string())
            })?;
            Ok(Outcome::Confirmed { uid })
        }
        Some(Mode::Reject) => Ok(Outcome::Rejected {
            uid: response.uid.filter(|u| !u.trim().is_empty()),
            reason: response.reason.unwrap_or_else(|| REJECTED_REASON.to_string()),
        }),
        _ => Err(AppError::ProtocolViolation(format!("Unexpected response mode '{}'", mode))),
    }
}

fn read_root(e: &BytesStart<'_>) -> Result<RtmlResponse, AppError> {
    let name = local_name(e);
    if name != "RTML" {
        return Err(AppError::ProtocolViolation(format!(
            "Expected RTML root element, found '{}'",
            name
        )));
    }

    let mut response = RtmlResponse::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| AppError::ProtocolViolation(e.to_string()))?;
        let value = attr.unescape_value().map_err(|e| AppError::ProtocolViolation(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"mode" => response.mode = Some(value.into_owned()),
            b"uid" => response.uid = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(response)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

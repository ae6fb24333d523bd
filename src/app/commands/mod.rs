pub mod cancel;
pub mod submit;

use tracing::warn;

use crate::app::AppContext;
use crate::domain::{AppError, Outcome, interpret};
use crate::ports::{LedgerStore, SubmissionTransport};

/// Send `document` and interpret the reply.
///
/// Any failure coming back from the transport is reported as [`AppError::Transport`] unless it
/// is already a protocol violation. The raw response is captured under `capture_name` (or the
/// server uid, when one is returned) before the outcome is acted upon.
pub(crate) fn exchange<T, L>(
    ctx: &AppContext<T, L>,
    document: &str,
    capture_name: impl Fn(&str) -> String,
    request_uid: &str,
) -> Result<Outcome, AppError>
where
    T: SubmissionTransport,
    L: LedgerStore,
{
    let raw = ctx.transport().send(document).map_err(|err| match err {
        AppError::Transport { .. } | AppError::ProtocolViolation(_) => err,
        other => AppError::transport(other.to_string()),
    })?;

    let outcome = interpret(&raw);
    let name_uid = match &outcome {
        Ok(Outcome::Confirmed { uid }) | Ok(Outcome::Rejected { uid: Some(uid), .. }) => {
            uid.as_str()
        }
        _ => request_uid,
    };
    if let Err(err) = ctx.capture().capture(&capture_name(name_uid), document, &raw) {
        warn!(uid = %name_uid, error = %err, "Failed to save RTML documents");
    }

    outcome
}

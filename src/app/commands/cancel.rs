use tracing::{error, info, warn};

use crate::app::AppContext;
use crate::domain::{AppError, Outcome, build_cancellation};
use crate::ports::{LedgerStore, RemoveOutcome, SubmissionTransport};

use super::exchange;

/// Result of an acknowledged cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReceipt {
    pub uid: String,
    /// `NotFound` when the service confirmed a uid this ledger never recorded.
    pub ledger: RemoveOutcome,
}

/// Execute the cancel command for a single group.
pub fn execute<T, L>(ctx: &AppContext<T, L>, uid: &str) -> Result<CancelReceipt, AppError>
where
    T: SubmissionTransport,
    L: LedgerStore,
{
    let document = build_cancellation(ctx.account(), uid).to_xml()?;
    ctx.ledger().load()?;

    info!(uid = %uid, "Cancelling observation group");
    let outcome =
        exchange(ctx, &document, |uid| format!("{}_cancel", uid), uid).inspect_err(|err| {
            error!(uid = %uid, error = %err, "Cancellation failed");
        })?;

    let confirmed = match outcome {
        Outcome::Confirmed { uid } => uid,
        Outcome::Rejected { uid: rejected_uid, reason } => {
            error!(uid = %uid, %reason, "Cancellation rejected");
            return Err(AppError::Rejected {
                uid: rejected_uid.or_else(|| Some(uid.to_string())),
                reason,
            });
        }
    };
    if confirmed != uid {
        warn!(requested = %uid, confirmed = %confirmed, "Service confirmed a different uid");
    }

    let ledger = ctx.ledger().remove(&confirmed).map_err(|err| {
        error!(uid = %confirmed, error = %err, "Group cancelled but ledger could not be updated");
        err.with_accepted_uid(&confirmed)
    })?;
    if ledger == RemoveOutcome::NotFound {
        warn!(uid = %confirmed, "Cancelled uid was not in the ledger");
    }

    info!(uid = %confirmed, "Observation group cancelled");
    Ok(CancelReceipt { uid: confirmed, ledger })
}

/// Cancel every uid currently in the ledger, one request each.
///
/// A failure for one uid does not stop the others; each result is reported alongside its uid.
pub fn execute_all<T, L>(
    ctx: &AppContext<T, L>,
) -> Result<Vec<(String, Result<CancelReceipt, AppError>)>, AppError>
where
    T: SubmissionTransport,
    L: LedgerStore,
{
    let uids = ctx.ledger().load()?;
    if uids.is_empty() {
        info!("Ledger is empty; nothing to cancel");
    }

    Ok(uids
        .into_iter()
        .map(|uid| {
            let result = execute(ctx, &uid);
            (uid, result)
        })
        .collect())
}

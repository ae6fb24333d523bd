use tracing::{error, info, warn};

use crate::app::AppContext;
use crate::domain::{AppError, Constraints, Observation, Outcome, build_submission};
use crate::ports::{AppendOutcome, LedgerStore, SubmissionTransport};

use super::exchange;

/// Result of an accepted observation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Uid issued by the service.
    pub uid: String,
    pub ledger: AppendOutcome,
}

/// Execute the submit command.
///
/// The whole group is validated and serialized, and the ledger is read, before the transport is
/// touched. Only a `confirm` reply records the uid in the ledger.
pub fn execute<T, L>(
    ctx: &AppContext<T, L>,
    observations: &[Observation],
    constraints: Option<&Constraints>,
) -> Result<SubmitReceipt, AppError>
where
    T: SubmissionTransport,
    L: LedgerStore,
{
    let request_uid = ctx.uids().next();
    let document =
        build_submission(ctx.account(), &request_uid, observations, constraints)?.to_xml()?;
    ctx.ledger().load()?;

    info!(uid = %request_uid, observations = observations.len(), "Sending observation group");
    let outcome =
        exchange(ctx, &document, |uid| uid.to_string(), &request_uid).inspect_err(|err| {
            error!(uid = %request_uid, error = %err, "Observation group failed");
        })?;

    let uid = match outcome {
        Outcome::Confirmed { uid } => uid,
        Outcome::Rejected { uid, reason } => {
            error!(uid = %request_uid, %reason, "Observation group rejected");
            return Err(AppError::Rejected { uid: uid.or(Some(request_uid)), reason });
        }
    };

    let ledger = ctx.ledger().append(&uid).map_err(|err| {
        error!(uid = %uid, error = %err, "Group accepted but could not be recorded in the ledger");
        err.with_accepted_uid(&uid)
    })?;
    if ledger == AppendOutcome::AlreadyPresent {
        warn!(uid = %uid, "Accepted uid was already in the ledger");
    }

    info!(uid = %uid, "Observation group accepted");
    Ok(SubmitReceipt { uid, ledger })
}

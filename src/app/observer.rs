//! Engine facade tying configuration, transport and ledger together.

use tracing::debug;

use crate::adapters::{FilesystemCapture, FilesystemLedger, HttpSubmissionTransport};
use crate::app::AppContext;
use crate::app::commands::cancel::{self, CancelReceipt};
use crate::app::commands::submit::{self, SubmitReceipt};
use crate::domain::{AppError, Constraints, Observation, ObsConfig};
use crate::ports::{DocumentCapture, LedgerStore, NoopCapture, SubmissionTransport};

/// Submits observation groups and keeps the ledger of accepted uids.
pub struct Observer<T: SubmissionTransport, L: LedgerStore> {
    ctx: AppContext<T, L>,
}

impl Observer<HttpSubmissionTransport, FilesystemLedger> {
    /// Wire the HTTP transport and filesystem ledger described by `config`.
    pub fn from_config(config: &ObsConfig) -> Result<Self, AppError> {
        config.validate()?;
        let transport = HttpSubmissionTransport::new(&config.service, &config.account)?;
        let ledger = FilesystemLedger::from_config(&config.ledger);
        let capture: Box<dyn DocumentCapture> = if config.debug.save_rtml {
            Box::new(FilesystemCapture::new(config.debug.dir.clone()))
        } else {
            Box::new(NoopCapture)
        };
        Self::new(config, transport, ledger, capture)
    }
}

impl<T: SubmissionTransport, L: LedgerStore> Observer<T, L> {
    pub fn new(
        config: &ObsConfig,
        transport: T,
        ledger: L,
        capture: Box<dyn DocumentCapture>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        debug!(
            username = %config.account.username,
            proposal = %config.account.proposal,
            endpoint = %config.service.endpoint()?,
            "Observer ready"
        );
        Ok(Self { ctx: AppContext::new(config.account.clone(), transport, ledger, capture) })
    }

    /// Submit one group. `constraints` apply to every observation that has none of its own.
    pub fn submit_group(
        &self,
        observations: &[Observation],
        constraints: Option<&Constraints>,
    ) -> Result<SubmitReceipt, AppError> {
        submit::execute(&self.ctx, observations, constraints)
    }

    pub fn cancel_group(&self, uid: &str) -> Result<CancelReceipt, AppError> {
        cancel::execute(&self.ctx, uid)
    }

    /// Cancel every recorded group, continuing past individual failures.
    pub fn cancel_all(&self) -> Result<Vec<(String, Result<CancelReceipt, AppError>)>, AppError> {
        cancel::execute_all(&self.ctx)
    }

    /// Uids of accepted groups in submission order.
    pub fn uids(&self) -> Result<Vec<String>, AppError> {
        self.ctx.ledger().load()
    }

    pub fn transport(&self) -> &T {
        self.ctx.transport()
    }

    pub fn ledger(&self) -> &L {
        self.ctx.ledger()
    }
}

use crate::domain::{AccountConfig, UidGenerator};
use crate::ports::{DocumentCapture, LedgerStore, SubmissionTransport};

/// Application context holding dependencies for command execution.
pub struct AppContext<T: SubmissionTransport, L: LedgerStore> {
    account: AccountConfig,
    transport: T,
    ledger: L,
    capture: Box<dyn DocumentCapture>,
    uids: UidGenerator,
}

impl<T: SubmissionTransport, L: LedgerStore> AppContext<T, L> {
    /// Create a new application context.
    pub fn new(
        account: AccountConfig,
        transport: T,
        ledger: L,
        capture: Box<dyn DocumentCapture>,
    ) -> Self {
        let uids = UidGenerator::new(account.prefix.trim());
        Self { account, transport, ledger, capture, uids }
    }

    pub fn account(&self) -> &AccountConfig {
        &self.account
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn capture(&self) -> &dyn DocumentCapture {
        self.capture.as_ref()
    }

    pub fn uids(&self) -> &UidGenerator {
        &self.uids
    }
}

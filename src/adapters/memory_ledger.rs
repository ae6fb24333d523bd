use std::sync::{Arc, Mutex};

use crate::domain::AppError;
use crate::ports::LedgerStore;

/// In-memory ledger. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    uids: Arc<Mutex<Vec<String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uids<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { uids: Arc::new(Mutex::new(uids.into_iter().map(Into::into).collect())) }
    }
}

impl LedgerStore for MemoryLedger {
    fn load(&self) -> Result<Vec<String>, AppError> {
        let uids =
            self.uids.lock().map_err(|_| AppError::persistence("ledger lock poisoned"))?;
        Ok(uids.clone())
    }

    fn save(&self, uids: &[String]) -> Result<(), AppError> {
        let mut stored =
            self.uids.lock().map_err(|_| AppError::persistence("ledger lock poisoned"))?;
        *stored = uids.to_vec();
        Ok(())
    }
}

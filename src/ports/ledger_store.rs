//! Submitted-uid ledger port definition.

use crate::domain::AppError;

/// Result of appending a uid to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Added,
    /// The uid was already recorded; the ledger is unchanged.
    AlreadyPresent,
}

/// Result of removing a uid from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The uid was not recorded; the ledger is unchanged.
    NotFound,
}

/// Port for the durable, ordered record of accepted group uids.
///
/// `append` and `remove` are read-modify-write cycles over `load` and `save` and are not
/// synchronized; one writer per ledger.
pub trait LedgerStore {
    /// All recorded uids in submission order. Empty when nothing has been saved yet.
    fn load(&self) -> Result<Vec<String>, AppError>;

    /// Replace the ledger contents.
    fn save(&self, uids: &[String]) -> Result<(), AppError>;

    fn append(&self, uid: &str) -> Result<AppendOutcome, AppError> {
        let mut uids = self.load()?;
        if uids.iter().any(|u| u == uid) {
            return Ok(AppendOutcome::AlreadyPresent);
        }
        uids.push(uid.to_string());
        self.save(&uids)?;
        Ok(AppendOutcome::Added)
    }

    fn remove(&self, uid: &str) -> Result<RemoveOutcome, AppError> {
        let mut uids = self.load()?;
        let before = uids.len();
        uids.retain(|u| u != uid);
        if uids.len() == before {
            return Ok(RemoveOutcome::NotFound);
        }
        self.save(&uids)?;
        Ok(RemoveOutcome::Removed)
    }
}

//! JSON-file ledger with atomic replacement.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, LedgerConfig};
use crate::ports::LedgerStore;

/// Ledger persisted as a JSON array of uids at `<dir>/<name>.json`.
///
/// Every operation opens, reads or writes, and closes the file; nothing is held open between
/// calls. Saves go to a sibling temporary file that is then renamed over the ledger, so a crash
/// mid-save leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FilesystemLedger {
    path: PathBuf,
}

impl FilesystemLedger {
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{}.json", name)) }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self { path: config.path() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self.path.file_name().unwrap_or_default().to_string_lossy();
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

impl LedgerStore for FilesystemLedger {
    fn load(&self) -> Result<Vec<String>, AppError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AppError::persistence(format!(
                    "read {}: {}",
                    self.path.display(),
                    err
                )));
            }
        };

        serde_json::from_str(&content).map_err(|err| {
            AppError::persistence(format!("decode {}: {}", self.path.display(), err))
        })
    }

    fn save(&self, uids: &[String]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::persistence(format!("create {}: {}", parent.display(), err))
            })?;
        }

        let content = serde_json::to_string_pretty(uids)
            .map_err(|err| AppError::persistence(format!("encode ledger: {}", err)))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|err| {
            AppError::persistence(format!("write {}: {}", temp_path.display(), err))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|err| {
            AppError::persistence(format!(
                "rename {} -> {}: {}",
                temp_path.display(),
                self.path.display(),
                err
            ))
        })
    }
}

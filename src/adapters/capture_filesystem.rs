use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::DocumentCapture;

/// Writes each exchanged document pair to `<dir>/<name>.RTML`.
#[derive(Debug, Clone)]
pub struct FilesystemCapture {
    dir: PathBuf,
}

impl FilesystemCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        // Uids come from the service; keep them inside the capture directory.
        let safe: String =
            name.chars().map(|c| if matches!(c, '/' | '\\') { '_' } else { c }).collect();
        self.dir.join(format!("{}.RTML", safe))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentCapture for FilesystemCapture {
    fn capture(&self, name: &str, outgoing: &str, incoming: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;
        let mut content = String::with_capacity(outgoing.len() + incoming.len() + 1);
        content.push_str(outgoing);
        if !outgoing.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(incoming);
        fs::write(self.path_for(name), content)?;
        Ok(())
    }
}

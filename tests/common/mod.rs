//! Shared testing utilities for ltrtml integration tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ltrtml::{
    AccountConfig, AppError, Constraints, FilesystemCapture, FilesystemLedger, LedgerConfig,
    ObsConfig, Observer, ServiceConfig, SubmissionTransport, Target,
};
use tempfile::TempDir;

/// Transport double: records every document and answers from a script.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    sent: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<VecDeque<Result<String, AppError>>>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, raw: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(raw.into()));
        self
    }

    pub fn fail(self, err: AppError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl SubmissionTransport for ScriptedTransport {
    fn send(&self, document: &str) -> Result<String, AppError> {
        self.sent.lock().unwrap().push(document.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::transport("no scripted reply")))
    }
}

#[allow(dead_code)]
pub fn confirm(uid: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<RTML xmlns="http://www.rtml.org/v3.1a" mode="confirm" uid="{uid}" version="3.1a">
  <Project ProjectID="PL20A01"/>
</RTML>"#
    )
}

#[allow(dead_code)]
pub fn reject(uid: &str) -> String {
    format!(r#"<RTML xmlns="http://www.rtml.org/v3.1a" mode="reject" uid="{uid}" version="3.1a"/>"#)
}

#[allow(dead_code)]
pub fn vega() -> Target {
    Target::new("Vega", "18:36:56.336", "+38:47:01.280")
}

#[allow(dead_code)]
pub fn constraints() -> Constraints {
    Constraints {
        air_mass: "2.0".into(),
        sky_bright: "2.0".into(),
        seeing: "1.2".into(),
        photometric: "no".into(),
        start_date: "2020-02-18".into(),
        start_time: "18:00".into(),
        end_date: "2020-02-28".into(),
        end_time: "00:00".into(),
    }
}

/// Isolated directory holding the ledger and captured documents.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        Self { root: TempDir::new().expect("Failed to create temp directory for tests") }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn capture_dir(&self) -> PathBuf {
        self.root.path().join("rtml")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.path().join("submitted.json")
    }

    pub fn config(&self) -> ObsConfig {
        let mut config = ObsConfig::new(
            AccountConfig::new("observer", "secret", "PL20A01", "PROJ"),
            ServiceConfig::new("192.0.2.10", 8080),
        );
        config.ledger =
            LedgerConfig { name: "submitted".into(), dir: self.root.path().to_path_buf() };
        config.debug.save_rtml = true;
        config.debug.dir = self.capture_dir();
        config
    }

    pub fn ledger(&self) -> FilesystemLedger {
        FilesystemLedger::from_config(&self.config().ledger)
    }

    pub fn observer(
        &self,
        transport: ScriptedTransport,
    ) -> Observer<ScriptedTransport, FilesystemLedger> {
        let capture = FilesystemCapture::new(self.capture_dir());
        Observer::new(&self.config(), transport, self.ledger(), Box::new(capture))
            .expect("test configuration should be valid")
    }

    /// Seed the ledger file directly.
    pub fn seed_ledger(&self, uids: &[&str]) {
        let json = serde_json::to_string(uids).unwrap();
        std::fs::write(self.ledger_path(), json).unwrap();
    }
}

mod document_capture;
mod ledger_store;
mod submission_transport;

pub use document_capture::{DocumentCapture, NoopCapture};
pub use ledger_store::{AppendOutcome, LedgerStore, RemoveOutcome};
pub use submission_transport::SubmissionTransport;

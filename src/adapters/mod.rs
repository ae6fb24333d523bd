pub mod capture_filesystem;
pub mod ledger_filesystem;
pub mod memory_ledger;
pub mod soap_transport_http;

pub use capture_filesystem::FilesystemCapture;
pub use ledger_filesystem::FilesystemLedger;
pub use memory_ledger::MemoryLedger;
pub use soap_transport_http::HttpSubmissionTransport;

//! ltrtml: build RTML observation requests for the Liverpool Telescope, submit them to the
//! node agent, and keep a ledger of the groups it accepted.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ltrtml::{Constraints, FilterExposure, Observation, ObservationSpec, Observer, Target};
//!
//! # fn main() -> Result<(), ltrtml::AppError> {
//! let config = ltrtml::load_config(Path::new("ltrtml.toml"))?;
//! ltrtml::init_logging(&config)?;
//! let observer = Observer::from_config(&config)?;
//!
//! let vega = Target::new("Vega", "18:36:56.336", "+38:47:01.280");
//! let spec = ObservationSpec::Ioo {
//!     filters: vec![FilterExposure::new("R", "60", "3")],
//!     binning: "2".into(),
//! };
//! let constraints = Constraints {
//!     air_mass: "2.0".into(),
//!     sky_bright: "2.0".into(),
//!     seeing: "1.2".into(),
//!     photometric: "no".into(),
//!     start_date: "2020-02-18".into(),
//!     start_time: "18:00".into(),
//!     end_date: "2020-02-28".into(),
//!     end_time: "00:00".into(),
//! };
//!
//! let receipt = observer.submit_group(&[Observation::new(vega, spec)], Some(&constraints))?;
//! observer.cancel_group(&receipt.uid)?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

pub use adapters::{FilesystemCapture, FilesystemLedger, HttpSubmissionTransport, MemoryLedger};
pub use app::Observer;
pub use app::commands::cancel::CancelReceipt;
pub use app::commands::submit::SubmitReceipt;
pub use domain::{
    AccountConfig, AppError, Constraints, DebugConfig, Element, FilterExposure, FrodoArm, Grating,
    Instrument, LedgerConfig, LogOutput, LoggingConfig, Mode, MoptopFilter, ObsConfig, Observation,
    ObservationSpec, Outcome, Resolution, RotorSpeed, ServiceConfig, Target, UidGenerator,
    build_cancellation, build_submission, interpret, load_config, parse_config_content,
};
pub use ports::{
    AppendOutcome, DocumentCapture, LedgerStore, NoopCapture, RemoveOutcome, SubmissionTransport,
};

// =============================================================================
// Process setup
// =============================================================================

/// Install the `tracing` subscriber described by the `[logging]` section.
pub fn init_logging(config: &ObsConfig) -> Result<(), AppError> {
    app::logging::init(&config.logging)
}

/// Read the ledger named in `config` without contacting the service.
pub fn submitted_uids(config: &ObsConfig) -> Result<Vec<String>, AppError> {
    config.ledger.validate()?;
    FilesystemLedger::from_config(&config.ledger).load()
}

pub mod configuration;
pub mod constraints;
pub mod error;
pub mod instrument;
pub mod request;
pub mod response;
pub mod rtml;
pub mod target;

pub use configuration::{
    AccountConfig, DebugConfig, LedgerConfig, LogOutput, LoggingConfig, ObsConfig, ServiceConfig,
    load_config, parse_config_content,
};
pub use constraints::Constraints;
pub use error::AppError;
pub use instrument::{
    FilterExposure, FrodoArm, Grating, Instrument, MoptopFilter, ObservationSpec, Resolution,
    RotorSpeed,
};
pub use request::{Observation, UidGenerator, build_cancellation, build_submission};
pub use response::{Outcome, REJECTED_REASON, RtmlResponse, interpret, parse_response};
pub use rtml::{Element, Mode};
pub use target::Target;

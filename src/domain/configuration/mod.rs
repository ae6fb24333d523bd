pub mod loader;
pub mod obs_config;

pub use loader::{RTML_PASSWORD_ENV, load_config, parse_config_content};
pub use obs_config::{
    AccountConfig, DebugConfig, LedgerConfig, LogOutput, LoggingConfig, ObsConfig, ServiceConfig,
};

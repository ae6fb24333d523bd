//! Configuration loading.

use std::io;
use std::path::Path;

use crate::domain::{AppError, ObsConfig};

/// Environment variable consulted when `account.rtml_password` is absent.
pub const RTML_PASSWORD_ENV: &str = "LTRTML_RTML_PASSWORD";

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<ObsConfig, AppError> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            AppError::ConfigMissing(path.display().to_string())
        } else {
            AppError::Io(err)
        }
    })?;
    parse_config_content(&content)
}

/// Parse configuration from string content.
pub fn parse_config_content(content: &str) -> Result<ObsConfig, AppError> {
    let mut config: ObsConfig = toml::from_str(content)?;

    if config.account.rtml_password.trim().is_empty()
        && let Ok(password) = std::env::var(RTML_PASSWORD_ENV)
    {
        config.account.rtml_password = password;
    }

    config.validate()?;
    Ok(config)
}

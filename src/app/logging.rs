//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::{AppError, LogOutput, LoggingConfig};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Calling this twice in one process returns
/// [`AppError::Configuration`].
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = build_filter(config)?;

    let (terminal, file) = match config.output {
        LogOutput::Terminal => {
            (Some(fmt::layer().with_target(true).with_writer(std::io::stderr)), None)
        }
        LogOutput::File => {
            if let Some(parent) = config.file.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let sink = OpenOptions::new().create(true).append(true).open(&config.file)?;
            let layer = fmt::layer().with_ansi(false).with_target(true);
            (None, Some(layer.with_writer(Mutex::new(sink))))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(file)
        .try_init()
        .map_err(|e| AppError::Configuration(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, AppError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.level.trim()).map_err(|e| {
        AppError::Configuration(format!("Invalid logging.level '{}': {}", config.level, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn configured_level_builds_a_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "ltrtml=debug,warn".into(), ..Default::default() };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    #[serial]
    fn malformed_level_is_a_configuration_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "ltrtml=[".into(), ..Default::default() };
        assert!(matches!(build_filter(&config), Err(AppError::Configuration(_))));
    }

    #[test]
    #[serial]
    fn second_init_fails_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            output: LogOutput::File,
            file: dir.path().join("logs").join("ltrtml.log"),
            ..Default::default()
        };
        // Another test in this binary may already own the global subscriber.
        let _ = init(&config);
        assert!(matches!(init(&config), Err(AppError::Configuration(_))));
    }
}

//! Tracing initialization for the binaries

use std::fs::OpenOptions;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Errors raised while installing the global subscriber
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter used when `RUST_LOG` is unset
fn default_directive(level: &str) -> String {
    format!("healthstream={level},tower_http={level}")
}

/// Install the global subscriber, writing to stderr unless a log file is
/// configured. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));
    let json = config.format.eq_ignore_ascii_case("json");

    let file = match &config.file {
        Some(path) => Some(Arc::new(OpenOptions::new().create(true).append(true).open(path)?)),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match (json, file) {
        (true, Some(file)) => registry.with(fmt::layer().json().with_writer(file)).try_init()?,
        (true, None) => registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()?,
        (false, Some(file)) => registry.with(fmt::layer().with_ansi(false).with_writer(file)).try_init()?,
        (false, None) => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let directive = default_directive("debug");
        assert_eq!(directive, "healthstream=debug,tower_http=debug");
        assert!(EnvFilter::try_new(directive).is_ok());
    }

    #[test]
    fn test_unwritable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(dir.path().join("missing").join("app.log").to_string_lossy().into_owned()),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_tracing(&config), Err(LoggingError::Io(_))));
    }
}

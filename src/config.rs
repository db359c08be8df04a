//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::parser::VITAL_TYPES;
use crate::sleep::DEFAULT_GAP_HOURS;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sleep: SleepConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    300 // large exports take a while
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sleep session reconstruction
#[derive(Debug, Clone, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_gap_hours")]
    pub gap_hours: f64,
}

fn default_gap_hours() -> f64 {
    DEFAULT_GAP_HOURS
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            gap_hours: default_gap_hours(),
        }
    }
}

/// Export parsing
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Types returned by the vitals views when none are requested
    #[serde(default = "default_vital_types")]
    pub vital_types: Vec<String>,
}

fn default_vital_types() -> Vec<String> {
    VITAL_TYPES.iter().map(|t| t.to_string()).collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            vital_types: default_vital_types(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("healthstream").join("config.toml")),
            Some(PathBuf::from("/etc/healthstream/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("HEALTHSTREAM_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("HEALTHSTREAM_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Sleep overrides
        if let Some(gap) = lookup("HEALTHSTREAM_SLEEP_GAP_HOURS") {
            match gap.parse::<f64>() {
                Ok(hours) if hours > 0.0 => self.sleep.gap_hours = hours,
                _ => tracing::warn!("Ignoring invalid HEALTHSTREAM_SLEEP_GAP_HOURS: {}", gap),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("HEALTHSTREAM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HEALTHSTREAM_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Healthstream Configuration
#
# Environment variables override these settings:
# - HEALTHSTREAM_API_HOST
# - HEALTHSTREAM_API_PORT
# - HEALTHSTREAM_SLEEP_GAP_HOURS
# - HEALTHSTREAM_LOG_LEVEL
# - HEALTHSTREAM_LOG_FORMAT

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8000

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 300

[sleep]
# Idle gap (hours) that separates two sleep sessions
gap_hours = 2.0

[parser]
# Record types returned by the vitals views when none are requested
vital_types = [
    "HKQuantityTypeIdentifierHeartRate",
    "HKQuantityTypeIdentifierRestingHeartRate",
    "HKQuantityTypeIdentifierWalkingHeartRateAverage",
    "HKQuantityTypeIdentifierBloodPressureSystolic",
    "HKQuantityTypeIdentifierBloodPressureDiastolic",
    "HKQuantityTypeIdentifierBloodGlucose",
    "HKQuantityTypeIdentifierRespiratoryRate",
    "HKQuantityTypeIdentifierAppleSleepingWristTemperature",
]

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/healthstream/healthstream.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.sleep.gap_hours, 2.0);
        assert_eq!(config.parser.vital_types.len(), VITAL_TYPES.len());
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.api.host, defaults.api.host);
        assert_eq!(parsed.api.port, defaults.api.port);
        assert_eq!(parsed.api.cors_origins, defaults.api.cors_origins);
        assert_eq!(parsed.api.request_timeout_secs, defaults.api.request_timeout_secs);
        assert_eq!(parsed.sleep.gap_hours, defaults.sleep.gap_hours);
        assert_eq!(parsed.parser.vital_types, defaults.parser.vital_types);
        assert_eq!(parsed.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 9090\n\n[sleep]\ngap_hours = 4.5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.sleep.gap_hours, 4.5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HEALTHSTREAM_API_HOST", "0.0.0.0"),
            ("HEALTHSTREAM_API_PORT", "not-a-port"),
            ("HEALTHSTREAM_SLEEP_GAP_HOURS", "3"),
            ("HEALTHSTREAM_LOG_FORMAT", "json"),
        ]
        .into();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.sleep.gap_hours, 3.0);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_non_positive_gap_override() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "HEALTHSTREAM_SLEEP_GAP_HOURS").then(|| "0".to_string()));
        assert_eq!(config.sleep.gap_hours, 2.0);
    }
}

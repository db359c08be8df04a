//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, Config};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    pub fn api(&self) -> &ApiConfig {
        &self.config.api
    }

    /// Default session gap in hours
    pub fn gap_hours(&self) -> f64 {
        self.config.sleep.gap_hours
    }

    /// Types served by the vitals endpoint when none are requested
    pub fn vital_types(&self) -> &[String] {
        &self.config.parser.vital_types
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

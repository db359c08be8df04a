//! # Healthstream
//!
//! Streaming reader for Apple Health `export.xml` files with sleep session
//! reconstruction.
//!
//! ## Features
//!
//! - **Constant-memory parsing**: Exports of hundreds of megabytes are read
//!   element by element, with cheap pre-filtering on direct attributes
//! - **Typed records**: Flattened attributes, resolved record types and
//!   derived time windows
//! - **Sleep sessions**: Overlapping multi-source sleep stages merged into
//!   disjoint per-night timelines with derived metrics
//! - **Outer surfaces**: REST API with Axum and a command-line tool
//!
//! ## Modules
//!
//! - [`parser`]: Streaming export reader and record model
//! - [`sleep`]: Interval normalization and session grouping
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use healthstream::parser::{iter_health_records, RecordFilter};
//! use healthstream::sleep::{gap_from_hours, sleep_sessions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Heart rate samples from January
//!     let filter = RecordFilter::new()
//!         .types(["HKQuantityTypeIdentifierHeartRate"])
//!         .start("2024-01-01")
//!         .end("2024-01-31 23:59:59 +0000");
//!     let count = iter_health_records("export.xml", filter)?.count();
//!     println!("Found {} heart rate samples", count);
//!
//!     // Sleep sessions split by two idle hours
//!     let gap = gap_from_hours(2.0);
//!     for session in sleep_sessions("export.xml", None::<&str>, None::<&str>, gap)? {
//!         println!("{} asleep for {}s", session.start(), session.asleep_duration().num_seconds());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod parser;
pub mod sleep;

// Re-export top-level types for convenience
pub use parser::{
    iter_health_records, parse_health_data, parse_timestamp, AttrValue, Attributes, HealthRecord,
    ParseError, ParseResult, RecordFilter, RecordReader, Timestamp, VITAL_TYPES,
};

pub use sleep::{
    build_sleep_sessions, iter_sleep_segments, normalize, sleep_sessions, SleepError, SleepResult,
    SleepSegment, SleepSession, SleepStage,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, ParserConfig, SleepConfig};

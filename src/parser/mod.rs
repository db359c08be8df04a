//! Apple Health export parser
//!
//! This module turns an `export.xml` into a stream of typed records:
//!
//! - **timestamp**: Parsing of the heterogeneous date formats found in exports
//! - **attributes**: Insertion-ordered attribute mapping
//! - **record**: `HealthRecord`, type resolution and time windows
//! - **reader**: Constant-memory streaming reader with pre-filtering
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! export.xml → quick-xml events → top-level Element
//!   → pre-filter (direct attributes) → flatten → HealthRecord → filter → caller
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use healthstream::parser::{iter_health_records, RecordFilter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let filter = RecordFilter::new()
//!         .types(["HKQuantityTypeIdentifierHeartRate"])
//!         .start("2024-01-01");
//!
//!     for record in iter_health_records("export.xml", filter)? {
//!         println!("{} {:?}", record.record_type(), record.get("value"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod error;
pub mod reader;
pub mod record;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Re-export commonly used types
pub use attributes::{AttrValue, Attributes};
pub use error::{ParseError, ParseResult};
pub use reader::{ReaderStats, RecordFilter, RecordReader};
pub use record::{resolve_record_type, Element, HealthRecord, METADATA_TAG, TAG_KEY, TYPE_KEY};
pub use timestamp::{format_timestamp, parse_timestamp, IntoTimestamp, Timestamp};

/// Record types returned by the vitals endpoint when none are requested
pub const VITAL_TYPES: &[&str] = &[
    "HKQuantityTypeIdentifierHeartRate",
    "HKQuantityTypeIdentifierRestingHeartRate",
    "HKQuantityTypeIdentifierWalkingHeartRateAverage",
    "HKQuantityTypeIdentifierBloodPressureSystolic",
    "HKQuantityTypeIdentifierBloodPressureDiastolic",
    "HKQuantityTypeIdentifierBloodGlucose",
    "HKQuantityTypeIdentifierRespiratoryRate",
    "HKQuantityTypeIdentifierAppleSleepingWristTemperature",
];

/// Stream the records of an export lazily
pub fn iter_health_records(
    path: impl AsRef<Path>,
    filter: RecordFilter,
) -> ParseResult<RecordReader<BufReader<File>>> {
    RecordReader::open(path, filter)
}

/// Read every matching record into memory, in external shape
pub fn parse_health_data(path: impl AsRef<Path>, filter: RecordFilter) -> ParseResult<Vec<Attributes>> {
    Ok(iter_health_records(path, filter)?
        .map(HealthRecord::into_attributes)
        .collect())
}

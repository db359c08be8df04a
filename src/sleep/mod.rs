//! Sleep session reconstruction
//!
//! Turns raw, overlapping, multi-source sleep analysis records into clean
//! sessions with derived metrics:
//!
//! - **stage**: Sleep stages, category values and overlap priority
//! - **segment**: A single stage interval
//! - **session**: Interval normalization and per-session metrics
//! - **grouper**: Splitting a stream of segments into sessions by idle gap
//! - **error**: Error types
//!
//! ```text
//! export.xml → SleepAnalysis records → SleepSegment → group by gap
//!   → normalize (priority sweep) → SleepSession
//! ```

pub mod error;
pub mod grouper;
pub mod segment;
pub mod session;
pub mod stage;

// Re-export commonly used types
pub use error::{SleepError, SleepResult};
pub use grouper::{build_sleep_sessions, gap_from_hours, iter_sleep_segments, sleep_sessions, DEFAULT_GAP_HOURS};
pub use segment::SleepSegment;
pub use session::{normalize, SegmentSummary, SessionSummary, SleepSession};
pub use stage::{SleepStage, SLEEP_TYPE};

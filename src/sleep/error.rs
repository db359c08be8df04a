//! Sleep analysis error types

use thiserror::Error;

use crate::parser::{ParseError, Timestamp};

/// Errors that can occur while building segments and sessions
#[derive(Error, Debug)]
pub enum SleepError {
    /// Segment ends before it starts
    #[error("Invalid segment: end ({end}) cannot be before start ({start})")]
    InvalidSegment { start: Timestamp, end: Timestamp },

    /// Stage name outside the known set
    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    /// Nothing left after dropping InBed and zero-length segments
    #[error("Sleep session requires at least one non-InBed segment")]
    EmptySession,

    /// Reading the export failed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type alias for sleep operations
pub type SleepResult<T> = Result<T, SleepError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_timestamp;

    #[test]
    fn test_error_messages() {
        let start = parse_timestamp("2024-01-06T01:10:00Z").unwrap();
        let end = parse_timestamp("2024-01-05T23:20:00Z").unwrap();
        let err = SleepError::InvalidSegment { start, end };
        assert!(err.to_string().contains("before"));

        let err = SleepError::InvalidStage("Unknown".to_string());
        assert_eq!(err.to_string(), "Invalid stage: Unknown");
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let err: SleepError = ParseError::InvalidAttributes("bad".to_string()).into();
        assert!(matches!(err, SleepError::Parse(_)));
        assert_eq!(err.to_string(), "Invalid attributes: bad");
    }
}

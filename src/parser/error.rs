//! Parser error types
//!
//! Errors surfaced by the streaming reader and the record model. Structural
//! problems inside the document and unparseable timestamps are recovered
//! locally and never show up here.

use std::path::PathBuf;
use thiserror::Error;

use super::timestamp::Timestamp;

/// Errors that can occur while opening or reading a health export
#[derive(Error, Debug)]
pub enum ParseError {
    /// The export file could not be opened
    #[error("Source not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Requested window ends before it starts
    #[error("Invalid range: end date ({end}) cannot be before start date ({start})")]
    InvalidRange { start: Timestamp, end: Timestamp },

    /// An attribute mapping could not be turned into a record
    #[error("Invalid attributes: {0}")]
    InvalidAttributes(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::InvalidAttributes(err.to_string())
    }
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::timestamp::parse_timestamp;

    #[test]
    fn test_error_display() {
        let start = parse_timestamp("2024-01-21 00:00:00 -0700").unwrap();
        let end = parse_timestamp("2024-01-20 00:00:00 -0700").unwrap();
        let err = ParseError::InvalidRange { start, end };
        assert_eq!(
            err.to_string(),
            "Invalid range: end date (2024-01-20 00:00:00 -07:00) cannot be before start date (2024-01-21 00:00:00 -07:00)"
        );

        let err = ParseError::SourceNotFound {
            path: PathBuf::from("missing.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "Source not found: missing.xml");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ParseError = json_err.into();
        assert!(matches!(err, ParseError::InvalidAttributes(_)));
    }
}

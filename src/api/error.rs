//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::parser::ParseError;
use crate::sleep::SleepError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Export file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed request the data cannot satisfy (reversed range, bad segment)
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::SourceNotFound { .. } => ApiError::NotFound(err.to_string()),
            ParseError::InvalidRange { .. } | ParseError::InvalidAttributes(_) => {
                ApiError::Unprocessable(err.to_string())
            }
        }
    }
}

impl From<SleepError> for ApiError {
    fn from(err: SleepError) -> Self {
        match err {
            SleepError::Parse(inner) => inner.into(),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Worker task failed: {}", err))
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        // Log the error
        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_timestamp;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Unprocessable("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_domain_error_conversion() {
        let missing = ParseError::SourceNotFound {
            path: "export.xml".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(matches!(ApiError::from(missing), ApiError::NotFound(_)));

        let start = parse_timestamp("2024-01-02").unwrap();
        let end = parse_timestamp("2024-01-01").unwrap();
        let reversed = SleepError::Parse(ParseError::InvalidRange { start, end });
        assert!(matches!(ApiError::from(reversed), ApiError::Unprocessable(_)));

        assert!(matches!(ApiError::from(SleepError::EmptySession), ApiError::Unprocessable(_)));
    }
}

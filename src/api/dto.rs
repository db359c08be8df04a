//! Data Transfer Objects
//!
//! Query parameters and small response bodies. Records and sessions are
//! serialized in their own external shape.

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::parser::RecordFilter;

/// Query string of `/api/v1/records` and `/api/v1/vitals`
#[derive(Debug, Default)]
pub struct RecordsParams {
    /// Path to the export on the server's filesystem
    pub file_path: String,
    /// Record types or tags
    pub types: Vec<String>,
    /// Inclusive start (export format, ISO-8601 or naive)
    pub start: Option<String>,
    /// Inclusive end
    pub end: Option<String>,
}

impl RecordsParams {
    /// Build from raw query pairs.
    ///
    /// `types` may be repeated and each occurrence may hold a comma-separated
    /// list. For the other keys the last occurrence wins; unknown keys are
    /// ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut file_path = None;
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "file_path" => file_path = Some(value),
                "types" => params.types.extend(split_types(Some(&value))),
                "start" => params.start = Some(value),
                "end" => params.end = Some(value),
                _ => {}
            }
        }
        params.file_path =
            file_path.ok_or_else(|| ApiError::Validation("missing query parameter: file_path".to_string()))?;
        Ok(params)
    }

    pub fn type_list(&self) -> Vec<String> {
        self.types.clone()
    }

    /// Filter over the requested window, restricted to `types`
    pub fn filter(&self, types: Vec<String>) -> RecordFilter {
        RecordFilter::new()
            .types(types)
            .start(self.start.as_deref())
            .end(self.end.as_deref())
    }
}

/// Query string of `/api/v1/sessions`
#[derive(Debug, Deserialize)]
pub struct SessionsParams {
    pub file_path: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    /// Idle gap separating sessions; the configured default when absent
    #[serde(default)]
    pub gap_hours: Option<f64>,
}

/// Split a comma-separated list, dropping blanks
pub fn split_types(types: Option<&str>) -> Vec<String> {
    types
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Root response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_types() {
        assert_eq!(split_types(None), Vec::<String>::new());
        assert_eq!(split_types(Some("")), Vec::<String>::new());
        assert_eq!(
            split_types(Some(" HKQuantityTypeIdentifierHeartRate, Workout ,,")),
            vec!["HKQuantityTypeIdentifierHeartRate", "Workout"]
        );
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_params_accept_repeated_and_comma_separated_types() {
        let params = RecordsParams::from_pairs(pairs(&[
            ("file_path", "export.xml"),
            ("types", "HKQuantityTypeIdentifierHeartRate"),
            ("types", "Workout, Correlation"),
            ("start", "2024-01-20"),
            ("unknown", "ignored"),
        ]))
        .unwrap();

        assert_eq!(params.file_path, "export.xml");
        assert_eq!(
            params.type_list(),
            vec!["HKQuantityTypeIdentifierHeartRate", "Workout", "Correlation"]
        );
        assert_eq!(params.start.as_deref(), Some("2024-01-20"));
        assert!(params.end.is_none());
    }

    #[test]
    fn test_params_require_file_path() {
        let err = RecordsParams::from_pairs(pairs(&[("types", "Workout")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_filter_ignores_unparseable_bounds() {
        let params = RecordsParams {
            file_path: "export.xml".to_string(),
            types: Vec::new(),
            start: Some("yesterday-ish".to_string()),
            end: Some("2024-01-20".to_string()),
        };
        let filter = params.filter(params.type_list());
        let (start, end) = filter.window();
        assert!(start.is_none());
        assert!(end.is_some());
        assert!(filter.type_set().is_none());
    }
}

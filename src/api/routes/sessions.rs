//! Sleep Session Routes
//!
//! - GET /api/v1/sessions - Reconstructed sleep sessions

use axum::{
    extract::{Query, State},
    response::Response,
};
use std::sync::Arc;

use super::{list_response, run_blocking};
use crate::api::dto::SessionsParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::sleep::{gap_from_hours, sleep_sessions};

/// GET /api/v1/sessions
///
/// Sleep sessions within the window, split by `gap_hours` of idle time.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionsParams>,
) -> ApiResult<Response> {
    let gap_hours = params.gap_hours.unwrap_or_else(|| state.gap_hours());
    if !gap_hours.is_finite() || gap_hours <= 0.0 {
        return Err(ApiError::Validation(format!(
            "gap_hours must be greater than 0, got {}",
            gap_hours
        )));
    }

    let SessionsParams {
        file_path, start, end, ..
    } = params;
    let sessions = run_blocking(move || {
        Ok(sleep_sessions(&file_path, start.as_deref(), end.as_deref(), gap_from_hours(gap_hours))?)
    })
    .await?;

    Ok(list_response(sessions))
}

//! Vitals Routes
//!
//! - GET /api/v1/vitals - Vital-sign records (heart rate, blood pressure, ...)

use axum::{
    extract::{Query, State},
    response::Response,
};
use std::sync::Arc;

use super::{list_response, run_blocking};
use crate::api::dto::RecordsParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::parser::parse_health_data;

/// GET /api/v1/vitals
///
/// Same as `/records`, but `types` defaults to the configured vital types.
pub async fn list_vitals(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let params = RecordsParams::from_pairs(pairs)?;
    let mut types = params.type_list();
    if types.is_empty() {
        types = state.vital_types().to_vec();
    }
    let filter = params.filter(types);

    let path = params.file_path;
    let records = run_blocking(move || Ok(parse_health_data(&path, filter)?)).await?;

    Ok(list_response(records))
}

//! Record Routes
//!
//! - GET /api/v1/records - Stream an export through the record filter

use axum::{extract::Query, response::Response};

use super::{list_response, run_blocking};
use crate::api::dto::RecordsParams;
use crate::api::error::ApiResult;
use crate::parser::parse_health_data;

/// GET /api/v1/records
///
/// Records of the requested types within the requested window, in document
/// order. Without `types` every record is returned.
pub async fn list_records(Query(pairs): Query<Vec<(String, String)>>) -> ApiResult<Response> {
    let params = RecordsParams::from_pairs(pairs)?;
    let filter = params.filter(params.type_list());
    tracing::debug!(file_path = %params.file_path, ?filter, "Listing records");

    let path = params.file_path;
    let records = run_blocking(move || Ok(parse_health_data(&path, filter)?)).await?;

    Ok(list_response(records))
}

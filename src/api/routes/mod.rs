//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod records;
pub mod sessions;
pub mod vitals;

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::error::ApiResult;

/// Header carrying the number of items in a list response
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Run a blocking export read off the async runtime
pub(crate) async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// JSON list with its length in `X-Total-Count`
pub(crate) fn list_response<T: Serialize>(items: Vec<T>) -> Response {
    let count = HeaderValue::from(items.len());
    ([(TOTAL_COUNT_HEADER, count)], Json(items)).into_response()
}

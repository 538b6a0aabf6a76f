use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use common::Error;

/// Handler error mapped onto an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            // No provider could answer: report which ones were tried.
            ApiError::Core(Error::AllSourcesExhausted { request, attempts }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": format!("no data source available for {request}"),
                    "tried": attempts,
                })),
            )
                .into_response(),
            ApiError::Core(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body every failed request carries.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub kind: &'a str,
    pub message: String,
}

/// Render an error as `{"kind": ..., "message": ...}` with the given status.
///
/// Callers log 500s themselves with the full error chain; TraceLayer already records
/// method, uri and status for every request.
pub fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    (status, axum::Json(ErrorBody { kind, message })).into_response()
}

//! Response finalization.
//!
//! # Responsibilities
//! - Turn an error raised by a handler into the uniform JSON error body
//! - Log server-side failures exactly once
//! - Provide the standard success status body
//!
//! # Design Decisions
//! - Client errors (status < 500) are not logged as errors
//! - Untyped errors surface as InternalServerError

use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::error::{ErrorResponse, RaisedError};
use crate::http::request::{RequestIdExt, X_REQUEST_ID};

/// Standard success body: `{"status":"OK"}`.
pub fn ok_status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Replace a response carrying a raised error with the uniform error body.
pub async fn finalize_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or_default().to_string();

    let response = next.run(request).await;
    let Some(raised) = response.extensions().get::<RaisedError>().cloned() else {
        return response;
    };

    let body = ErrorResponse::from_error(raised.error(), &path, &request_id);
    log_error_response(&body);
    error_response(&body)
}

/// Render an error body with its status, echoing the request id when known.
pub fn error_response(body: &ErrorResponse) -> Response {
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Json(body)).into_response();

    if !body.request_id.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&body.request_id) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
    }
    response
}

/// Log an error body at error level when it is a server-side failure.
pub(crate) fn log_error_response(body: &ErrorResponse) {
    if !body.is_server_error() {
        return;
    }
    tracing::error!(
        error_id = %body.error_id,
        status = body.status,
        path = %body.path,
        request_id = %body.request_id,
        "Request failed: {}",
        body.message
    );
}

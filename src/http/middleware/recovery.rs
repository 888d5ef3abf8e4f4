//! Panic recovery.
//!
//! Sits outside request id assignment, so the error body only carries a
//! request id the caller sent. The metrics layer below is unwound by a panic,
//! so the inbound sample for a recovered request is recorded here.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::FutureExt;

use crate::error::{ErrorResponse, TaxonomyError};
use crate::http::middleware::is_exempt;
use crate::http::middleware::metrics::endpoint_label;
use crate::http::request::X_REQUEST_ID;
use crate::http::response::{error_response, log_error_response};
use crate::observability::{LatencyTimer, MetricRecorder};

/// Convert a panic anywhere below into a 500 error body.
pub async fn recover(
    State(metrics): State<MetricRecorder>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let endpoint = endpoint_label(&request);
    let method = request.method().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let timer = LatencyTimer::start();
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let err = TaxonomyError::internal(format!(
                "Unexpected fault: {}",
                panic_message(panic.as_ref())
            ));
            let body = ErrorResponse::from_taxonomy(&err, &path, &request_id);
            log_error_response(&body);
            if !is_exempt(&path) {
                metrics.record_inbound(&endpoint, &method, body.status, timer.elapsed_ms());
            }
            error_response(&body)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

//! Access logging.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::middleware::is_exempt;
use crate::http::request::RequestIdExt;
use crate::observability::LatencyTimer;

/// Log one line when a request arrives and one when its response leaves.
pub async fn log_requests(request: Request, next: Next) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or_default().to_string();
    let timer = LatencyTimer::start();

    tracing::info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        status = response.status().as_u16(),
        latency_ms = timer.elapsed_ms(),
        "Outgoing response"
    );
    response
}

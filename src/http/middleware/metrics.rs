//! Inbound request metrics.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::middleware::is_exempt;
use crate::normalize::reduce_cardinality;
use crate::observability::{LatencyTimer, MetricRecorder};

/// Record count and latency for every served request.
///
/// Matched routes are labelled with their template (`/v1/things/{id}`);
/// unmatched paths fall back to the cardinality-reduced raw path.
pub async fn record_metrics(
    State(metrics): State<MetricRecorder>,
    request: Request,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let endpoint = endpoint_label(&request);
    let method = request.method().to_string();

    let timer = LatencyTimer::start();
    let response = next.run(request).await;
    metrics.record_inbound(
        &endpoint,
        &method,
        response.status().as_u16(),
        timer.elapsed_ms(),
    );
    response
}

/// Route template of a matched request, otherwise its reduced raw path.
pub(crate) fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| reduce_cardinality(request.uri().path()))
}

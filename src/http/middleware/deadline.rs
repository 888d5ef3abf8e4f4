//! Inbound request deadline.
//!
//! The request scope gets the deadline too, so outbound calls made by the
//! handler stop when the request runs out of time.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::context::WorkScope;
use crate::error::TaxonomyError;

/// Total time allowed for one request.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout(pub Duration);

/// Fail a request that outlives its timeout with an internal error.
///
/// The error is raised like a handler error, so finalization writes the body.
pub async fn enforce_deadline(
    State(RequestTimeout(timeout)): State<RequestTimeout>,
    mut request: Request,
    next: Next,
) -> Response {
    let scope = request
        .extensions()
        .get::<WorkScope>()
        .cloned()
        .unwrap_or_default()
        .with_timeout(timeout);
    request.extensions_mut().insert(scope);

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => TaxonomyError::internal(format!(
            "Request timed out after {} ms",
            timeout.as_millis()
        ))
        .into_response(),
    }
}

//! Request identity on the inbound edge.
//!
//! # Responsibilities
//! - Assign or propagate the request id and echo it on the response
//! - Resolve the request locale
//! - Open a cancellable scope per request
//! - Build a `RequestContext` for handlers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An empty inbound id counts as absent
//! - The request scope is cancelled when the request finishes or is dropped

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::{new_id, RequestContext, ScopedRequestId, WorkScope};
use crate::error::TaxonomyError;

/// Request id header, set on outbound calls and echoed on inbound responses.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Calling client header.
pub const X_CLIENT_ID: &str = "x-clientid";

const BEARER_PREFIX: &str = "Bearer ";

/// Request id assigned to an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Locale resolved for an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

/// Locale used when the caller sends none.
#[derive(Debug, Clone)]
pub struct DefaultLocale(Arc<str>);

impl DefaultLocale {
    pub fn new(locale: &str) -> Self {
        Self(Arc::from(locale))
    }
}

/// Access to the identity attached by the middleware chain.
pub trait RequestIdExt {
    /// Request id, once assigned.
    fn request_id(&self) -> Option<&str>;

    /// Locale, once resolved.
    fn locale(&self) -> Option<&str>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions().get::<RequestId>().map(|id| id.0.as_str())
    }

    fn locale(&self) -> Option<&str> {
        self.extensions().get::<Locale>().map(|l| l.0.as_str())
    }
}

impl RequestIdExt for Parts {
    fn request_id(&self) -> Option<&str> {
        self.extensions.get::<RequestId>().map(|id| id.0.as_str())
    }

    fn locale(&self) -> Option<&str> {
        self.extensions.get::<Locale>().map(|l| l.0.as_str())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Reuse the inbound request id or mint one; echo it on the response.
pub async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = header_str(request.headers(), X_REQUEST_ID)
        .map(String::from)
        .unwrap_or_else(new_id);

    let scope = WorkScope::root().with_value(ScopedRequestId(request_id.clone()));
    let guard = scope.clone().cancel_on_drop();
    request.extensions_mut().insert(RequestId(request_id.clone()));
    request.extensions_mut().insert(scope);

    let mut response = next.run(request).await;
    drop(guard);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// Take the locale from Accept-Language, falling back to the configured default.
pub async fn extract_locale(
    State(default): State<DefaultLocale>,
    mut request: Request,
    next: Next,
) -> Response {
    let locale = header_str(request.headers(), ACCEPT_LANGUAGE)
        .map(String::from)
        .unwrap_or_else(|| default.0.to_string());

    request.extensions_mut().insert(Locale(locale));
    next.run(request).await
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let scope = parts
            .extensions
            .get::<WorkScope>()
            .cloned()
            .unwrap_or_default();
        let request_id = parts.request_id().unwrap_or_default().to_string();
        let locale = parts.locale().unwrap_or_default().to_string();
        let client_id = header_str(&parts.headers, X_CLIENT_ID).unwrap_or_default();
        let credential = header_str(&parts.headers, AUTHORIZATION)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(String::from);

        Ok(RequestContext::new(
            &scope,
            request_id,
            client_id,
            locale,
            credential,
        ))
    }
}

/// Single query value for `key`, or BadRequest when absent.
pub fn query_value(uri: &Uri, key: &str) -> Result<String, TaxonomyError> {
    query_pairs(uri)
        .find(|(k, _)| k == key)
        .map(|(_, value)| value)
        .ok_or_else(|| missing_param(key))
}

/// Every query value for `key` (`?k=a&k=b`), or BadRequest when absent.
pub fn query_values(uri: &Uri, key: &str) -> Result<Vec<String>, TaxonomyError> {
    let values: Vec<String> = query_pairs(uri)
        .filter(|(k, _)| k == key)
        .map(|(_, value)| value)
        .collect();

    if values.is_empty() {
        return Err(missing_param(key));
    }
    Ok(values)
}

fn query_pairs(uri: &Uri) -> impl Iterator<Item = (String, String)> + '_ {
    url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
}

fn missing_param(key: &str) -> TaxonomyError {
    TaxonomyError::bad_request(format!("No value found for param: {}", key))
}

/// Log a message tagged with the request id.
pub fn trace(ctx: &RequestContext, message: &str) {
    tracing::info!(request_id = %ctx.id(), "{}", message);
}

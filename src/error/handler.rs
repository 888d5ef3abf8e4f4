//! Errors raised by request handlers.
//!
//! Handlers return `Result<T, HandlerError>` (or `Result<T, TaxonomyError>`).
//! The error does not render itself: it rides in the response extensions as a
//! [`RaisedError`] until the finalization middleware writes the uniform body.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::taxonomy::TaxonomyError;

/// Any error raised while handling a request.
///
/// Built from every `std::error::Error` through `?`, so handlers can mix
/// taxonomy errors with library errors.
pub struct HandlerError(Box<dyn StdError + Send + Sync + 'static>);

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

impl HandlerError {
    /// Raise an untyped error from a message; it surfaces as an internal error.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self(Box::new(MessageError(message.to_string())))
    }

    /// The wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Error attached to a response for the finalization middleware.
#[derive(Clone)]
pub struct RaisedError(Arc<dyn StdError + Send + Sync + 'static>);

impl RaisedError {
    pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }

    /// The raised error.
    pub fn error(&self) -> &(dyn StdError + 'static) {
        self.0.as_ref()
    }

    /// Status the error maps to: the taxonomy status, otherwise 500.
    pub fn status(&self) -> StatusCode {
        self.0
            .downcast_ref::<TaxonomyError>()
            .map(TaxonomyError::status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl fmt::Debug for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RaisedError").field(&self.0).finish()
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        RaisedError(Arc::from(self.0)).into_response()
    }
}

impl IntoResponse for TaxonomyError {
    fn into_response(self) -> Response {
        RaisedError::new(self).into_response()
    }
}

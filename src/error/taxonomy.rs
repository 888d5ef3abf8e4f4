//! Typed errors with a fixed wire status.

use axum::http::StatusCode;
use thiserror::Error;

use crate::context::new_id;

/// Recognized error kinds and their wire status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
}

impl ErrorKind {
    /// Wire status code of this kind.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }

    /// Kind for a status code, if the status belongs to the taxonomy.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::NotFound),
            500 => Some(ErrorKind::InternalServerError),
            502 => Some(ErrorKind::BadGateway),
            _ => None,
        }
    }

    /// Canonical reason phrase, used when an error carries no message.
    pub fn reason(self) -> &'static str {
        self.status().canonical_reason().unwrap_or("Unknown Error")
    }

    /// True for kinds that indicate an operational incident.
    pub fn is_server_error(self) -> bool {
        self.status().is_server_error()
    }
}

/// Error carrying a correlation id, a human message and a wire status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error(id={id}, statusCode={} message=[{message}])", .kind.status().as_u16())]
pub struct TaxonomyError {
    id: String,
    message: String,
    kind: ErrorKind,
}

impl TaxonomyError {
    /// Create an error of `kind` with a fresh id.
    ///
    /// An empty message is replaced by the kind's reason phrase.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = kind.reason().to_string();
        }
        Self {
            id: new_id(),
            message,
            kind,
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 403 Forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// 502 Bad Gateway.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadGateway, message)
    }

    /// Replace the id with a known correlation id (usually the request id).
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = id;
        }
        self
    }

    /// Correlation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Wire status code.
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// True when the error should be treated as an operational incident.
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_map_to_fixed_status() {
        let cases = [
            (TaxonomyError::bad_request("x"), 400),
            (TaxonomyError::unauthorized("x"), 401),
            (TaxonomyError::forbidden("x"), 403),
            (TaxonomyError::not_found("x"), 404),
            (TaxonomyError::internal("x"), 500),
            (TaxonomyError::bad_gateway("x"), 502),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(ErrorKind::from_status(status), Some(err.kind()));
            assert_eq!(err.is_server_error(), status >= 500);
        }
        assert_eq!(ErrorKind::from_status(418), None);
    }

    #[test]
    fn test_empty_message_uses_reason_phrase() {
        assert_eq!(TaxonomyError::not_found("").message(), "Not Found");
        assert_eq!(TaxonomyError::bad_gateway("").message(), "Bad Gateway");
        assert_eq!(TaxonomyError::forbidden("no access").message(), "no access");
    }

    #[test]
    fn test_correlation_id() {
        let err = TaxonomyError::internal("boom");
        assert!(!err.id().is_empty());

        let err = err.with_correlation_id("req-7");
        assert_eq!(err.id(), "req-7");

        let err = err.with_correlation_id("");
        assert_eq!(err.id(), "req-7");
    }

    #[test]
    fn test_display() {
        let err = TaxonomyError::bad_request("missing field").with_correlation_id("abc");
        assert_eq!(
            err.to_string(),
            "Error(id=abc, statusCode=400 message=[missing field])"
        );
    }
}

//! Translation of downstream call failures.

use serde::Deserialize;

use crate::error::taxonomy::TaxonomyError;

/// Error body expected from other services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// How a downstream call failed.
#[derive(Debug, Clone, Copy)]
pub enum DownstreamFailure<'a> {
    /// No response at all: transport error, timeout, refused connection, cancellation.
    NoResponse { cause: &'a str },
    /// A response with a non-2xx status and its raw body.
    Status { status: u16, body: &'a [u8] },
    /// A response with a non-2xx status whose body could not be read.
    UnreadableBody { status: u16, cause: &'a str },
}

impl TaxonomyError {
    /// Collapse a downstream failure into a BadGateway error.
    ///
    /// The remote status never passes through: a downstream 404 does not mean
    /// the caller's resource is missing. The request id becomes the correlation id.
    pub fn from_downstream_failure(request_id: &str, failure: DownstreamFailure<'_>) -> Self {
        let message = match failure {
            DownstreamFailure::NoResponse { cause } => format!(
                "Downstream request failed with no response. requestId=[{}] err=[{}]",
                request_id, cause
            ),
            DownstreamFailure::Status { status, body } => {
                match serde_json::from_slice::<RemoteError>(body) {
                    Ok(remote) => format!(
                        "Downstream request failed. requestId=[{}] status=[{}] code=[{}] message=[{}]",
                        request_id,
                        status,
                        remote.code.unwrap_or_default(),
                        remote.message.unwrap_or_default()
                    ),
                    Err(parse_err) => unreadable(request_id, status, &parse_err),
                }
            }
            DownstreamFailure::UnreadableBody { status, cause } => {
                unreadable(request_id, status, &cause)
            }
        };

        TaxonomyError::bad_gateway(message).with_correlation_id(request_id)
    }
}

fn unreadable(request_id: &str, status: u16, cause: &dyn std::fmt::Display) -> String {
    format!(
        "Downstream request failed, error body unreadable. requestId=[{}] status=[{}] err=[{}]",
        request_id, status, cause
    )
}

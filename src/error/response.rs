//! Wire form of an error.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::error::taxonomy::TaxonomyError;

/// JSON error body: `{errorId, message, status, path, requestId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
}

impl ErrorResponse {
    /// Build the wire body for a taxonomy error.
    pub fn from_taxonomy(err: &TaxonomyError, path: &str, request_id: &str) -> Self {
        Self {
            error_id: err.id().to_string(),
            message: err.message().to_string(),
            status: err.status().as_u16(),
            path: path.to_string(),
            request_id: request_id.to_string(),
        }
    }

    /// Build the wire body for any error.
    ///
    /// Taxonomy errors are copied through; anything else becomes an internal
    /// error whose message is the original error's description.
    pub fn from_error(err: &(dyn StdError + 'static), path: &str, request_id: &str) -> Self {
        match err.downcast_ref::<TaxonomyError>() {
            Some(taxonomy) => Self::from_taxonomy(taxonomy, path, request_id),
            None => Self::from_taxonomy(&TaxonomyError::internal(err.to_string()), path, request_id),
        }
    }

    /// True when the body describes an operational incident.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

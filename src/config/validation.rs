//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, parsable addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::observability::logging::JSON_FORMAT;

const LOG_FORMATS: [&str; 2] = ["pretty", JSON_FORMAT];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("request.default_locale must not be empty")]
    EmptyLocale,

    #[error("observability.log_format '{0}' is not one of pretty, json")]
    LogFormat(String),
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.request.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request.timeout_secs"));
    }
    if config.request.default_locale.trim().is_empty() {
        errors.push(ValidationError::EmptyLocale);
    }
    if config.client.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("client.timeout_secs"));
    }
    if !LOG_FORMATS.contains(&config.observability.log_format.as_str()) {
        errors.push(ValidationError::LogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

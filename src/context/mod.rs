//! Per-request identity and cancellation.
//!
//! # Data Flow
//! ```text
//! inbound edge (http::request) or call site (background job)
//!     → scope.rs (WorkScope: cancellation + deadline + typed values)
//!     → request.rs (RequestContext: id, client id, locale, credential over a scope)
//!     → client (headers + fail-fast on cancelled scope)
//! ```
//!
//! # Design Decisions
//! - Identity fields are typed attributes, never looked up from the scope
//! - The request id is also stored on the scope for code that only holds a scope
//! - A context is immutable; derive a new one to change a field
//! - Cloning is an `Arc` bump, so contexts move freely into spawned tasks

pub mod request;
pub mod scope;

pub use request::{RequestContext, DEFAULT_LOCALE};
pub use scope::{CancelOnDrop, ScopedRequestId, WorkScope};

use uuid::Uuid;

/// Mint a new globally unique identifier (UUID v4, hyphenated).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

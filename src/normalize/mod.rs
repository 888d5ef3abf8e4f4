//! URL normalization for logs and metric labels.
//!
//! # Data Flow
//! ```text
//! raw URL (base + path + query)
//!     → query.rs   redact_query:        values → :value / :values   (log lines)
//!     → endpoint.rs reduce_cardinality: drop query, UUIDs → :id      (metric labels)
//!     → endpoint.rs strip_query:         path only                   (routing)
//! ```
//!
//! # Design Decisions
//! - Pure string functions, no parsing into `Url` (inputs may be relative or empty)
//! - Both reductions are idempotent
//! - UUID matching is case-insensitive so every spelling of an id lands on one label

pub mod endpoint;
pub mod query;

pub use endpoint::{reduce_cardinality, strip_query, ID_PLACEHOLDER};
pub use query::{redact_query, VALUES_PLACEHOLDER, VALUE_PLACEHOLDER};

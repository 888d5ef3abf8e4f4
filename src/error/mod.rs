//! Uniform error taxonomy.
//!
//! # Data Flow
//! ```text
//! handler / extractor raises error
//!     → handler.rs (HandlerError / TaxonomyError → response extension)
//!     → http::response (finalization middleware)
//!     → response.rs (ErrorResponse wire body, non-taxonomy errors coerced to 500)
//!
//! downstream call fails (client)
//!     → downstream.rs (no response / non-2xx / undecodable body → BadGateway)
//! ```
//!
//! # Design Decisions
//! - Status codes come from a closed set of kinds
//! - Only 5xx kinds are operational incidents (logged at error level)
//! - Downstream failures always surface as BadGateway, whatever the remote status

pub mod downstream;
pub mod handler;
pub mod response;
pub mod taxonomy;

pub use downstream::{DownstreamFailure, RemoteError};
pub use handler::{HandlerError, RaisedError};
pub use response::ErrorResponse;
pub use taxonomy::{ErrorKind, TaxonomyError};

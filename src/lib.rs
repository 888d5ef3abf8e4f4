//! Request instrumentation for HTTP services.
//!
//! Every inbound request gets a request id, a locale and a cancellable scope;
//! every outbound call carries them on to the next service. Both sides record
//! count and latency per endpoint, and every failure surfaces as one uniform
//! JSON error body.
//!
//! ```text
//!   caller ──▶ http (recovery → metrics → request id → locale → logging → errors)
//!                 │
//!                 ▼
//!            handler (RequestContext)
//!                 │
//!                 ▼
//!            client::InstrumentedClient ──▶ downstream service
//! ```

// Identity and errors
pub mod context;
pub mod error;

// Edges
pub mod client;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod normalize;
pub mod observability;

pub use client::InstrumentedClient;
pub use config::ServiceConfig;
pub use context::{RequestContext, WorkScope};
pub use error::{ErrorKind, ErrorResponse, HandlerError, TaxonomyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricRecorder;

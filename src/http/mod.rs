//! Inbound HTTP instrumentation.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → middleware/recovery.rs (panic → 500 error body)
//!     → middleware/metrics.rs (count + latency per route template)
//!     → request.rs (request id, locale, request scope)
//!     → middleware/logging.rs (access log)
//!     → response.rs (raised error → uniform error body)
//!     → handler (RequestContext extractor)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{
    query_value, query_values, trace, Locale, RequestId, RequestIdExt, X_CLIENT_ID, X_REQUEST_ID,
};
pub use response::ok_status;
pub use server::{always_healthy, HealthCheck, HttpServer, HEALTH_PATH, METRICS_PATH};

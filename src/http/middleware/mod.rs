//! Inbound middleware chain.
//!
//! # Order (outermost first)
//! ```text
//! recovery → metrics → request id → locale → logging → error finalization → deadline → handler
//! ```
//!
//! Metrics and access logging skip the health and metrics endpoints.

pub mod deadline;
pub mod logging;
pub mod metrics;
pub mod recovery;

pub use deadline::{enforce_deadline, RequestTimeout};
pub use logging::log_requests;
pub use metrics::record_metrics;
pub use recovery::recover;

use crate::http::server::{HEALTH_PATH, METRICS_PATH};

/// True for paths that metrics and access logging leave alone.
pub(crate) fn is_exempt(path: &str) -> bool {
    path == HEALTH_PATH || path == METRICS_PATH
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http middleware (inbound) ─┐
//!                            ├→ metrics.rs (MetricRecorder: counters + histograms)
//! client (outbound) ─────────┘        → GET /metrics (Prometheus scrape)
//!
//! all subsystems → logging.rs (tracing subscriber, text or JSON)
//! ```
//!
//! # Design Decisions
//! - Request id flows through every log line and error body
//! - Metric labels only ever carry normalized endpoints
//! - Metrics are cheap (atomic increments behind the registry handle)

pub mod logging;
pub mod metrics;

pub use metrics::{LatencyTimer, MetricRecorder, MetricsError};

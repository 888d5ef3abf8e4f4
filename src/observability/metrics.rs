//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): inbound requests by endpoint, method, status
//! - `http_request_latency_ms` (histogram): inbound latency in milliseconds
//! - `rpc_requests_total` (counter): outbound calls by endpoint, method, status
//! - `rpc_request_latency_ms` (histogram): outbound latency in milliseconds
//!
//! # Design Decisions
//! - One registry per process, built at startup and handed out as a cheap handle
//! - The recorder is never installed globally; components record through the handle
//! - Every attempted outbound call yields exactly one sample, with a fixed status
//!   substituted when no response was received

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{Key, Label, Level, Metadata, Recorder, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusRecorder};
use thiserror::Error;

/// Status recorded for an outbound call that produced no response.
pub const NO_RESPONSE_STATUS: u16 = 503;

const LATENCY_SUFFIX: &str = "_latency_ms";

/// Histogram buckets in milliseconds.
pub const LATENCY_BUCKETS_MS: [f64; 12] = [
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0,
];

/// Instrument family: which side of the service boundary a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Requests served by this process.
    Inbound,
    /// Calls this process makes to other services.
    Outbound,
}

impl Family {
    fn counter_name(self) -> &'static str {
        match self {
            Family::Inbound => "http_requests_total",
            Family::Outbound => "rpc_requests_total",
        }
    }

    fn histogram_name(self) -> &'static str {
        match self {
            Family::Inbound => "http_request_latency_ms",
            Family::Outbound => "rpc_request_latency_ms",
        }
    }
}

/// Errors building the metrics registry.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid metrics configuration: {0}")]
    Build(#[from] BuildError),
}

/// Handle to the process-wide instrument registry.
///
/// Clones share the same instruments. Recording is lock-free from the caller's
/// point of view and never fails.
#[derive(Clone)]
pub struct MetricRecorder {
    recorder: Arc<PrometheusRecorder>,
}

impl MetricRecorder {
    /// Build the registry and describe its instruments.
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Suffix(LATENCY_SUFFIX.to_string()), &LATENCY_BUCKETS_MS)?
            .build_recorder();

        recorder.describe_counter(
            Family::Inbound.counter_name().into(),
            None,
            "Total number of served requests".into(),
        );
        recorder.describe_histogram(
            Family::Inbound.histogram_name().into(),
            Some(Unit::Milliseconds),
            "Served request latency in milliseconds".into(),
        );
        recorder.describe_counter(
            Family::Outbound.counter_name().into(),
            None,
            "Total number of calls to other services".into(),
        );
        recorder.describe_histogram(
            Family::Outbound.histogram_name().into(),
            Some(Unit::Milliseconds),
            "Call duration to other services in milliseconds".into(),
        );

        Ok(Self {
            recorder: Arc::new(recorder),
        })
    }

    /// Record a served request.
    pub fn record_inbound(&self, endpoint: &str, method: &str, status: u16, latency_ms: f64) {
        self.record(Family::Inbound, endpoint, method, status, latency_ms);
    }

    /// Record an outbound call that received a response.
    pub fn record_outbound(&self, endpoint: &str, method: &str, status: u16, latency_ms: f64) {
        self.record(Family::Outbound, endpoint, method, status, latency_ms);
    }

    /// Record a failed outbound call, substituting [`NO_RESPONSE_STATUS`] when
    /// there was no response.
    pub fn record_outbound_failure(
        &self,
        endpoint: &str,
        method: &str,
        status: Option<u16>,
        latency_ms: f64,
    ) {
        let status = status.unwrap_or(NO_RESPONSE_STATUS);
        self.record(Family::Outbound, endpoint, method, status, latency_ms);
    }

    fn record(&self, family: Family, endpoint: &str, method: &str, status: u16, latency_ms: f64) {
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        let labels = || {
            vec![
                Label::new("endpoint", endpoint.to_string()),
                Label::new("method", method.to_string()),
                Label::new("status", status.to_string()),
            ]
        };

        let counter_key = Key::from_parts(family.counter_name(), labels());
        self.recorder
            .register_counter(&counter_key, &metadata)
            .increment(1);

        let histogram_key = Key::from_parts(family.histogram_name(), labels());
        self.recorder
            .register_histogram(&histogram_key, &metadata)
            .record(latency_ms);
    }

    /// Render all instruments in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.recorder.handle().render()
    }
}

impl std::fmt::Debug for MetricRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRecorder").finish_non_exhaustive()
    }
}

/// Wall-clock timer reporting milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since start in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        to_millis(self.elapsed())
    }
}

/// Convert a duration to fractional milliseconds.
pub fn to_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

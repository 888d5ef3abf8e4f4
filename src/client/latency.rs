//! Soft SLA watch on outbound calls.

use std::time::Duration;

use crate::context::RequestContext;
use crate::observability::metrics::{to_millis, LatencyTimer};

/// Logs a warning on drop when the watched call ran longer than the threshold.
///
/// Dropping fires regardless of how the call ended, including early returns.
pub(crate) struct LatencyWatch<'a> {
    timer: LatencyTimer,
    threshold: Duration,
    client: &'a str,
    path: String,
    ctx: &'a RequestContext,
}

impl<'a> LatencyWatch<'a> {
    pub(crate) fn start(
        client: &'a str,
        path: String,
        ctx: &'a RequestContext,
        threshold: Duration,
    ) -> Self {
        Self {
            timer: LatencyTimer::start(),
            threshold,
            client,
            path,
            ctx,
        }
    }
}

impl Drop for LatencyWatch<'_> {
    fn drop(&mut self) {
        let elapsed = self.timer.elapsed();
        if elapsed <= self.threshold {
            return;
        }

        tracing::warn!(
            client = %self.client,
            path = %self.path,
            request_id = %self.ctx.id(),
            client_id = %self.ctx.client_id(),
            latency = %format!("{:.2} ms", to_millis(elapsed)),
            warning_threshold = %format!("{:.2} ms", to_millis(self.threshold)),
            "Unusually high latency in service call"
        );
    }
}

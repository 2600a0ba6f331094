//! Metric sink that emits `tracing` events.

use call_timer_ports::MetricSinkPort;

/// Target used for every timing event.
pub const METRIC_TARGET: &str = "call_timer::metric";

/// Emits an `info` event per sample with `metric` and `duration_ms` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricSink;

impl MetricSinkPort for TracingMetricSink {
    fn record_timer_ms(&self, key: &str, duration_ms: u64) {
        tracing::info!(target: METRIC_TARGET, metric = key, duration_ms, "timer");
    }
}

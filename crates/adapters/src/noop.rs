//! Metric sink that discards samples.

use call_timer_ports::MetricSinkPort;

/// Discards every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricSink;

impl MetricSinkPort for NoopMetricSink {
    fn record_timer_ms(&self, _key: &str, _duration_ms: u64) {}
}

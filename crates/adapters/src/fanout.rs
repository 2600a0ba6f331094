//! Metric sink composition.

use call_timer_ports::MetricSinkPort;
use std::sync::Arc;

/// Forwards each sample to every inner sink, in insertion order.
#[derive(Clone, Default)]
pub struct FanoutMetricSink {
    sinks: Vec<Arc<dyn MetricSinkPort>>,
}

impl FanoutMetricSink {
    /// Fan out to `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn MetricSinkPort>>) -> Self {
        Self { sinks }
    }

    /// Append another sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricSinkPort>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when there are no inner sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MetricSinkPort for FanoutMetricSink {
    fn record_timer_ms(&self, key: &str, duration_ms: u64) {
        for sink in &self.sinks {
            sink.record_timer_ms(key, duration_ms);
        }
    }
}

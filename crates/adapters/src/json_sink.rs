//! JSON-lines metric sink.

use crate::json_line::{now_epoch_ms, to_line};
use crate::log_sink::LogSink;
use call_timer_ports::{MetricSinkPort, MetricTags};
use serde_json::Value;
use std::sync::Arc;

const SERIALIZE_FAILED_LINE: &str =
    "{\"type\":\"metric\",\"metricType\":\"error\",\"name\":\"sink.serialize_failed\",\"value\":1}\n";

/// Metric sink that writes one JSON line per timing sample.
#[derive(Clone)]
pub struct JsonMetricSink {
    sink: Arc<dyn LogSink>,
    base_tags: MetricTags,
}

impl JsonMetricSink {
    /// Create a metric sink backed by the provided line sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_tags: MetricTags::new(),
        }
    }

    /// Set tags applied to every sample.
    #[must_use]
    pub fn with_base_tags(mut self, tags: MetricTags) -> Self {
        self.base_tags = tags;
        self
    }
}

impl MetricSinkPort for JsonMetricSink {
    fn record_timer_ms(&self, key: &str, duration_ms: u64) {
        let mut payload = serde_json::Map::new();
        payload.insert("type".to_string(), Value::String("metric".to_string()));
        payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
        payload.insert("metricType".to_string(), Value::String("timer".to_string()));
        payload.insert("name".to_string(), Value::String(key.to_string()));
        payload.insert("value".to_string(), Value::from(duration_ms));
        payload.insert("unit".to_string(), Value::String("ms".to_string()));
        if !self.base_tags.is_empty() {
            payload.insert("tags".to_string(), tags_to_json(&self.base_tags));
        }

        self.sink
            .write_line(&to_line(payload, SERIALIZE_FAILED_LINE));
    }
}

fn tags_to_json(tags: &MetricTags) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in tags {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;

    #[test]
    fn sample_becomes_timer_metric_line() -> Result<(), Box<dyn std::error::Error>> {
        let lines = Arc::new(MemoryLogSink::default());
        let sink = JsonMetricSink::new(lines.clone());

        sink.record_timer_ms("timer.OrderService.placeOrder", 42);

        let written = lines.take();
        assert_eq!(written.len(), 1);
        let payload: Value = serde_json::from_str(written[0].trim())?;
        assert_eq!(payload["type"], "metric");
        assert_eq!(payload["metricType"], "timer");
        assert_eq!(payload["name"], "timer.OrderService.placeOrder");
        assert_eq!(payload["value"], 42);
        assert_eq!(payload["unit"], "ms");
        assert!(payload.get("tags").is_none());
        Ok(())
    }

    #[test]
    fn base_tags_are_attached() -> Result<(), Box<dyn std::error::Error>> {
        let lines = Arc::new(MemoryLogSink::default());
        let mut tags = MetricTags::new();
        tags.insert("service".into(), "orders".into());
        let sink = JsonMetricSink::new(lines.clone()).with_base_tags(tags);

        sink.record_timer_ms("timer.custom.key", 0);

        let payload: Value = serde_json::from_str(lines.take()[0].trim())?;
        assert_eq!(payload["tags"]["service"], "orders");
        assert_eq!(payload["value"], 0);
        Ok(())
    }
}

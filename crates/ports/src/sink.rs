//! Metric sink boundary contract.

/// Destination for timing samples.
///
/// Implementations must tolerate high-frequency calls from many threads.
/// Recording is fire-and-forget: a sink reports its own failures through
/// its own channels and never back to the timed call.
pub trait MetricSinkPort: Send + Sync {
    /// Record a duration (in whole milliseconds) under a prefixed metric key.
    fn record_timer_ms(&self, key: &str, duration_ms: u64);
}

/// Static tags attached to every sample by tag-aware sinks.
pub type MetricTags = std::collections::BTreeMap<Box<str>, Box<str>>;

//! Timing samples.

use crate::primitives::MetricKey;
use serde::Serialize;
use std::time::Duration;

/// Whole milliseconds in `elapsed`, truncated (never rounded) and saturating
/// at `u64::MAX`.
#[must_use]
pub fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// One measured call: the metric key and its duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSample {
    /// Prefixed metric key.
    pub key: MetricKey,
    /// Elapsed time in whole milliseconds.
    pub duration_ms: u64,
}

impl TimingSample {
    /// Create a sample from a precomputed millisecond duration.
    #[must_use]
    pub const fn new(key: MetricKey, duration_ms: u64) -> Self {
        Self { key, duration_ms }
    }

    /// Create a sample from an elapsed duration.
    #[must_use]
    pub fn from_elapsed(key: MetricKey, elapsed: Duration) -> Self {
        Self::new(key, elapsed_millis(elapsed))
    }
}

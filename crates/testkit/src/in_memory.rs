//! In-memory adapter implementations for port contracts.
//!
//! These implementations are intended for:
//! - Unit/integration tests
//! - Deterministic contract tests for the ports layer

use call_timer_ports::{LogEvent, LogLevel, LoggerPort, MetricSinkPort};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One sample captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSample {
    /// Metric key as handed to the sink.
    pub key: String,
    /// Duration in whole milliseconds.
    pub duration_ms: u64,
}

/// Metric sink that keeps every sample in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    samples: Mutex<Vec<RecordedSample>>,
}

impl RecordingSink {
    fn lock(&self) -> MutexGuard<'_, Vec<RecordedSample>> {
        // A test that panicked mid-push still left a consistent Vec behind.
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all samples recorded so far.
    pub fn samples(&self) -> Vec<RecordedSample> {
        self.lock().clone()
    }

    /// Drain recorded samples.
    pub fn take(&self) -> Vec<RecordedSample> {
        std::mem::take(&mut *self.lock())
    }

    /// Keys of recorded samples, in arrival order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().iter().map(|sample| sample.key.clone()).collect()
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl MetricSinkPort for RecordingSink {
    fn record_timer_ms(&self, key: &str, duration_ms: u64) {
        self.lock().push(RecordedSample {
            key: key.to_owned(),
            duration_ms,
        });
    }
}

/// Metric sink that panics on every sample.
#[derive(Debug, Default)]
pub struct PanickingSink;

impl MetricSinkPort for PanickingSink {
    fn record_timer_ms(&self, key: &str, _duration_ms: u64) {
        panic!("sink rejected {key}");
    }
}

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}
}

/// Logger that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl CapturingLogger {
    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of captured events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Names of captured events, in order.
    pub fn event_names(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|event| event.event.to_string())
            .collect()
    }

    /// Events at or above `level`.
    pub fn at_least(&self, level: LogLevel) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|event| event.level >= level)
            .cloned()
            .collect()
    }

    /// Value of `field` on the first event named `event`.
    pub fn field(&self, event: &str, field: &str) -> Option<Value> {
        self.lock()
            .iter()
            .find(|candidate| &*candidate.event == event)
            .and_then(|candidate| candidate.fields.as_ref())
            .and_then(|fields| fields.get(field).cloned())
    }
}

impl LoggerPort for CapturingLogger {
    fn log(&self, event: LogEvent) {
        self.lock().push(event);
    }
}

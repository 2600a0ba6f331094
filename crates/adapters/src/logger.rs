//! Structured JSON logger adapter.

use crate::json_line::{now_epoch_ms, to_line};
use crate::log_sink::LogSink;
use call_timer_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use serde_json::Value;
use std::sync::Arc;

const SERIALIZE_FAILED_LINE: &str = "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n";

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let mut fields = self.base_fields.clone();
        if let Some(extra) = event.fields {
            fields.extend(extra);
        }

        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
        payload.insert(
            "level".to_string(),
            Value::String(level_str(event.level).to_string()),
        );
        payload.insert("event".to_string(), Value::String(event.event.into_string()));
        payload.insert(
            "message".to_string(),
            Value::String(event.message.into_string()),
        );
        if !fields.is_empty() {
            payload.insert("fields".to_string(), fields_to_json(fields));
        }

        self.sink
            .write_line(&to_line(payload, SERIALIZE_FAILED_LINE));
    }
}

/// Lowercase level name used on the wire.
#[must_use]
pub const fn level_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

fn fields_to_json(fields: LogFields) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.into_string(), value))
            .collect(),
    )
}

//! Logger adapter forwarding events to `tracing`.

use call_timer_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use serde_json::Value;

/// Target used for every forwarded event.
pub const LOG_TARGET: &str = "call_timer";

/// Forwards structured events to the active `tracing` subscriber.
///
/// Fields are rendered as one JSON object in the `fields` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let fields = event.fields.map(fields_json).unwrap_or_default();
        let name = &*event.event;
        let message = &*event.message;

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(target: LOG_TARGET, event = name, fields = %fields, "{message}");
            },
            LogLevel::Info => {
                tracing::info!(target: LOG_TARGET, event = name, fields = %fields, "{message}");
            },
            LogLevel::Warn => {
                tracing::warn!(target: LOG_TARGET, event = name, fields = %fields, "{message}");
            },
            LogLevel::Error => {
                tracing::error!(target: LOG_TARGET, event = name, fields = %fields, "{message}");
            },
        }
    }
}

fn fields_json(fields: LogFields) -> String {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.into_string(), value))
            .collect(),
    )
    .to_string()
}

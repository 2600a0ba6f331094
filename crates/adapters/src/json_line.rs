//! Shared helpers for JSON-lines payloads.

use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

/// Encode `payload` as one line; `fallback` is written verbatim when encoding fails.
pub(crate) fn to_line(payload: Map<String, Value>, fallback: &str) -> String {
    serde_json::to_string(&Value::Object(payload)).map_or_else(
        |_| fallback.to_owned(),
        |mut encoded| {
            encoded.push('\n');
            encoded
        },
    )
}

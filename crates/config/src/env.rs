//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: present-but-invalid values fail fast instead of
//! silently falling back to file or default values.

use crate::schema::{LogFormat, LogLevelSetting, SinkKind, TimingConfig, ValidatedTimingConfig};
use call_timer_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: metric sink kind (`json`, `tracing`, `noop`).
pub const ENV_SINK: &str = "CALL_TIMER_SINK";
/// Env var: comma-separated `key=value` base tags, replacing file tags.
pub const ENV_BASE_TAGS: &str = "CALL_TIMER_BASE_TAGS";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "CALL_TIMER_LOG_LEVEL";
/// Env var: log output format (`json`, `tracing`, `off`).
pub const ENV_LOG_FORMAT: &str = "CALL_TIMER_LOG_FORMAT";

const ALL_ENV_VARS: [&str; 4] = [ENV_SINK, ENV_BASE_TAGS, ENV_LOG_LEVEL, ENV_LOG_FORMAT];

const MAX_CSV_ITEMS: usize = 1_000;

/// Typed env-derived overrides for `TimingConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingEnv {
    /// Override for `sink.kind`.
    pub sink_kind: Option<SinkKind>,
    /// Replacement for `sink.baseTags`.
    pub base_tags: Option<BTreeMap<String, String>>,
    /// Override for `logging.level`.
    pub log_level: Option<LogLevelSetting>,
    /// Override for `logging.format`.
    pub log_format: Option<LogFormat>,
}

impl TimingEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            sink_kind: parse_optional_enum(map, ENV_SINK, parse_sink_kind)?,
            base_tags: parse_optional_tags(map, ENV_BASE_TAGS)?,
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, parse_log_level)?,
            log_format: parse_optional_enum(map, ENV_LOG_FORMAT, parse_log_format)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }
        Self::from_map(&map)
    }

    /// True when no override is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sink_kind.is_none()
            && self.base_tags.is_none()
            && self.log_level.is_none()
            && self.log_format.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: TimingConfig,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(kind) = env.sink_kind {
        config.sink.kind = kind;
    }
    if let Some(tags) = env.base_tags.as_ref() {
        config.sink.base_tags.clone_from(tags);
    }
    if let Some(level) = env.log_level {
        config.logging.level = level;
    }
    if let Some(format) = env.log_format {
        config.logging.format = format;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// CSV list exceeds a safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// CSV contained an entry that is not `key=value`.
    InvalidTagEntry {
        /// Env var name.
        var: &'static str,
        /// Invalid entry.
        entry: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
            Self::CsvTooLarge { .. } | Self::InvalidTagEntry { .. } => {
                ErrorCode::new("config", "invalid_env_csv")
            },
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
            Self::InvalidTagEntry { var, entry } => {
                write!(formatter, "{var} contains invalid tag entry: {entry}")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            EnvParseError::InvalidTagEntry { var, entry } => envelope
                .with_metadata("env_var", var)
                .with_metadata("entry", entry),
        }
    }
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    parse(&trimmed.to_ascii_lowercase())
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: raw.clone(),
        })
}

fn parse_sink_kind(value: &str) -> Option<SinkKind> {
    match value {
        "json" => Some(SinkKind::Json),
        "tracing" => Some(SinkKind::Tracing),
        "noop" => Some(SinkKind::Noop),
        _ => None,
    }
}

fn parse_log_level(value: &str) -> Option<LogLevelSetting> {
    match value {
        "trace" => Some(LogLevelSetting::Trace),
        "debug" => Some(LogLevelSetting::Debug),
        "info" => Some(LogLevelSetting::Info),
        "warn" | "warning" => Some(LogLevelSetting::Warn),
        "error" => Some(LogLevelSetting::Error),
        _ => None,
    }
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value {
        "json" => Some(LogFormat::Json),
        "tracing" => Some(LogFormat::Tracing),
        "off" => Some(LogFormat::Off),
        _ => None,
    }
}

fn parse_optional_tags(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<BTreeMap<String, String>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    let entries = parse_csv(raw);
    if entries.len() > MAX_CSV_ITEMS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: entries.len(),
            max: MAX_CSV_ITEMS,
        });
    }

    let mut tags = BTreeMap::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(EnvParseError::InvalidTagEntry { var, entry });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(EnvParseError::InvalidTagEntry { var, entry });
        }
        tags.insert(key.to_owned(), value.trim().to_owned());
    }

    Ok(Some(tags))
}

fn parse_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_map_yields_no_overrides() -> Result<(), EnvParseError> {
        let env = TimingEnv::from_map(&BTreeMap::new())?;
        assert!(env.is_empty());
        Ok(())
    }

    #[test]
    fn enum_values_are_case_insensitive() -> Result<(), EnvParseError> {
        let env = TimingEnv::from_map(&env_map(&[
            (ENV_SINK, " JSON "),
            (ENV_LOG_LEVEL, "Warning"),
            (ENV_LOG_FORMAT, "off"),
        ]))?;

        assert_eq!(env.sink_kind, Some(SinkKind::Json));
        assert_eq!(env.log_level, Some(LogLevelSetting::Warn));
        assert_eq!(env.log_format, Some(LogFormat::Off));
        Ok(())
    }

    #[test]
    fn invalid_values_fail_fast() {
        assert_eq!(
            TimingEnv::from_map(&env_map(&[(ENV_SINK, "statsd")])),
            Err(EnvParseError::InvalidEnum {
                var: ENV_SINK,
                value: "statsd".to_string()
            })
        );
        assert_eq!(
            TimingEnv::from_map(&env_map(&[(ENV_LOG_LEVEL, "  ")])),
            Err(EnvParseError::EmptyValue { var: ENV_LOG_LEVEL })
        );
        assert_eq!(
            TimingEnv::from_map(&env_map(&[(ENV_BASE_TAGS, "service=orders,broken")])),
            Err(EnvParseError::InvalidTagEntry {
                var: ENV_BASE_TAGS,
                entry: "broken".to_string()
            })
        );
    }

    #[test]
    fn env_tags_replace_file_tags() -> Result<(), ErrorEnvelope> {
        let mut base = TimingConfig::default();
        base.sink
            .base_tags
            .insert("service".to_string(), "file".to_string());
        base.sink
            .base_tags
            .insert("region".to_string(), "eu".to_string());

        let env = TimingEnv::from_map(&env_map(&[(ENV_BASE_TAGS, "service = env, zone=a")]))?;
        let config = apply_env_overrides(base, &env)?;

        let tags: Vec<(&str, &str)> = config
            .sink
            .base_tags
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        assert_eq!(tags, vec![("service", "env"), ("zone", "a")]);
        assert!(!config.sink.base_tags.contains_key("region"));
        Ok(())
    }

    #[test]
    fn parse_errors_map_to_envelopes() {
        let envelope = ErrorEnvelope::from(EnvParseError::InvalidEnum {
            var: ENV_LOG_FORMAT,
            value: "xml".to_string(),
        });
        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_enum"));
        assert_eq!(
            envelope.metadata.get("env_var").map(String::as_str),
            Some(ENV_LOG_FORMAT)
        );
    }
}

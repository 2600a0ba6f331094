//! Timing configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims tag keys and values.

use call_timer_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Maximum number of base tags attached to every sample.
pub const BASE_TAGS_MAX: usize = 32;

/// Top-level timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TimingConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Metric sink selection.
    pub sink: SinkConfig,
    /// Diagnostic logging.
    pub logging: LoggingConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            sink: SinkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TimingConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedTimingConfig, ConfigSchemaError> {
        self.validate_version()?;
        self.sink.normalize_and_validate()?;

        Ok(ValidatedTimingConfig { raw: self })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTimingConfig {
    raw: TimingConfig,
}

impl ValidatedTimingConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &TimingConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> TimingConfig {
        self.raw
    }
}

impl AsRef<TimingConfig> for ValidatedTimingConfig {
    fn as_ref(&self) -> &TimingConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedTimingConfig {
    type Target = TimingConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Where timing samples are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// JSON lines on stderr.
    Json,
    /// `tracing` events.
    #[default]
    Tracing,
    /// Discard samples.
    Noop,
}

impl SinkKind {
    /// Config/env spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tracing => "tracing",
            Self::Noop => "noop",
        }
    }
}

/// Metric sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SinkConfig {
    /// Sink adapter.
    pub kind: SinkKind,
    /// Tags attached to every sample (JSON sink only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub base_tags: BTreeMap<String, String>,
}

impl SinkConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        let mut normalized = BTreeMap::new();
        for (key, value) in std::mem::take(&mut self.base_tags) {
            let trimmed = key.trim();
            if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
                return Err(ConfigSchemaError::InvalidTagKey { key });
            }
            normalized.insert(trimmed.to_owned(), value.trim().to_owned());
        }

        if normalized.len() > BASE_TAGS_MAX {
            return Err(ConfigSchemaError::ListTooLarge {
                section: "sink",
                field: "baseTags",
                len: normalized.len(),
                max: BASE_TAGS_MAX,
            });
        }

        self.base_tags = normalized;
        Ok(())
    }
}

/// Minimum severity for diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    /// Everything, including per-sample traces.
    Trace,
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevelSetting {
    /// Config/env spelling, also valid as an `EnvFilter` directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Diagnostic log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines on stderr.
    Json,
    /// `tracing` events.
    #[default]
    Tracing,
    /// No diagnostics.
    Off,
}

impl LogFormat {
    /// Config/env spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tracing => "tracing",
            Self::Off => "off",
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level.
    pub level: LogLevelSetting,
    /// Output adapter.
    pub format: LogFormat,
}

/// Parse a timing config from a JSON string, applying validation and normalization.
pub fn parse_timing_config_json(input: &str) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config: TimingConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a timing config from a TOML string, applying validation and normalization.
pub fn parse_timing_config_toml(input: &str) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config: TimingConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures for the timing config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A map or list field exceeds the maximum allowed size.
    ListTooLarge {
        /// Schema section (e.g. `sink`).
        section: &'static str,
        /// Field name in the config file (e.g. `baseTags`).
        field: &'static str,
        /// Number of entries after normalization.
        len: usize,
        /// Maximum allowed number of entries.
        max: usize,
    },
    /// A tag key is empty or contains whitespace.
    InvalidTagKey {
        /// Raw key as provided.
        key: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::ListTooLarge { .. } => ErrorCode::new("config", "list_too_large"),
            Self::InvalidTagKey { .. } => ErrorCode::new("config", "invalid_tag_key"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::ListTooLarge {
                section,
                field,
                len,
                max,
            } => write!(
                formatter,
                "{section}.{field} must have at most {max} entries (got {len})"
            ),
            Self::InvalidTagKey { key } => {
                write!(formatter, "invalid tag key: {key:?}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::ListTooLarge {
                section,
                field,
                len,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidTagKey { key } => envelope.with_metadata("key", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<(), ConfigSchemaError> {
        let config = TimingConfig::default().validate_and_normalize()?;
        assert_eq!(config.version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.sink.kind, SinkKind::Tracing);
        assert_eq!(config.logging.level, LogLevelSetting::Info);
        assert_eq!(config.logging.format, LogFormat::Tracing);
        Ok(())
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let config = TimingConfig {
            version: 2,
            ..TimingConfig::default()
        };
        assert_eq!(
            config.validate_and_normalize().err(),
            Some(ConfigSchemaError::UnsupportedVersion {
                found: 2,
                supported: 1
            })
        );
    }

    #[test]
    fn tags_are_trimmed() -> Result<(), ConfigSchemaError> {
        let mut config = TimingConfig::default();
        config
            .sink
            .base_tags
            .insert(" service ".to_string(), " orders ".to_string());

        let validated = config.validate_and_normalize()?;
        assert_eq!(
            validated.sink.base_tags.get("service").map(String::as_str),
            Some("orders")
        );
        Ok(())
    }

    #[test]
    fn tag_keys_must_be_single_tokens() {
        for key in ["", "   ", "two words"] {
            let mut config = TimingConfig::default();
            config.sink.base_tags.insert(key.to_string(), "x".to_string());

            let error = config.validate_and_normalize().err();
            assert_eq!(
                error,
                Some(ConfigSchemaError::InvalidTagKey {
                    key: key.to_string()
                })
            );
        }
    }

    #[test]
    fn too_many_tags_are_rejected() {
        let mut config = TimingConfig::default();
        for index in 0..=BASE_TAGS_MAX {
            config
                .sink
                .base_tags
                .insert(format!("tag{index}"), "v".to_string());
        }

        let Err(error) = config.validate_and_normalize() else {
            panic!("expected list_too_large");
        };
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(envelope.code, ErrorCode::new("config", "list_too_large"));
        assert_eq!(envelope.metadata.get("len").map(String::as_str), Some("33"));
    }

    #[test]
    fn level_spelling_round_trips_through_serde() -> Result<(), serde_json::Error> {
        let level: LogLevelSetting = serde_json::from_str("\"warn\"")?;
        assert_eq!(level, LogLevelSetting::Warn);
        assert_eq!(level.as_str(), "warn");
        assert!(serde_json::from_str::<LogLevelSetting>("\"verbose\"").is_err());
        Ok(())
    }
}

//! Config loading helpers (file + env).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{TimingConfig, TimingEnv, ValidatedTimingConfig, apply_env_overrides};
use call_timer_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Serialized config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension; files without one are JSON.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Load the timing config from a string.
///
/// Precedence (highest wins):
/// - env overrides (`TimingEnv`)
/// - config document
/// - defaults (`TimingConfig::default()`)
pub fn load_timing_config_from_str(
    input: &str,
    format: ConfigFormat,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config = parse_config_unvalidated(input, format)?;

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the timing config from an optional file path.
pub fn load_timing_config_from_path(
    config_path: Option<&Path>,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config = match config_path {
        None => TimingConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = ConfigFormat::from_path(path)?;
            tracing::debug!(path = %path.display(), ?format, "loading timing config");
            parse_config_unvalidated(&config_text, format)?
        },
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the timing config from std env and an optional file path.
pub fn load_timing_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let env = TimingEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_timing_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &TimingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &TimingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<TimingConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

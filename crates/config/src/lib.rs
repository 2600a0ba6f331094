//! # call-timer-config
//!
//! Configuration schema, validation, env overrides and loading for the
//! timing interceptor. This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;
/// JSON Schema export.
pub mod schema_export;

pub use schema::{
    BASE_TAGS_MAX, CURRENT_CONFIG_VERSION, ConfigSchemaError, LogFormat, LogLevelSetting,
    LoggingConfig, SinkConfig, SinkKind, TimingConfig, ValidatedTimingConfig,
    parse_timing_config_json, parse_timing_config_toml,
};

pub use env::{
    ENV_BASE_TAGS, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_SINK, EnvParseError, TimingEnv,
    apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_timing_config_from_path, load_timing_config_from_str,
    load_timing_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use schema_export::timing_config_schema;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

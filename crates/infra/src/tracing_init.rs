//! Global `tracing` subscriber installation.

use crate::InfraResult;
use call_timer_config::LoggingConfig;
use call_timer_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set and valid, otherwise from `logging.level`.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

/// Install a JSON fmt subscriber on stderr as the global default.
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> InfraResult<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("infra", "tracing_init"),
                format!("failed to install tracing subscriber: {error}"),
                ErrorClass::NonRetriable,
            )
        })
}

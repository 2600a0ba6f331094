//! # call-timer-infra
//!
//! Composition root: turns a validated timing config into wired adapters
//! and installs the global `tracing` subscriber.
//! This crate depends on `app`, `adapters`, `config`, `ports`, and `shared`.

/// Adapter selection helpers.
pub mod factory;
/// Global subscriber setup.
pub mod tracing_init;

pub use factory::{
    build_interceptor, build_interceptor_with_output, build_interceptor_with_sink, build_logger,
    build_logger_with_output, build_metric_sink, build_metric_sink_with_output,
};
pub use tracing_init::{env_filter, init_tracing};

use call_timer_shared::ErrorEnvelope;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_timer_adapters::adapters_crate_version;
    use call_timer_app::app_crate_version;
    use call_timer_config::config_crate_version;
    use call_timer_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if in_deps && line.starts_with("call-timer-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn infra_wires_every_runtime_layer() {
        let deps = workspace_deps();
        for expected in [
            "call-timer-app",
            "call-timer-adapters",
            "call-timer-config",
            "call-timer-shared",
        ] {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
        assert!(
            !deps.iter().any(|dep| dep == "call-timer-testkit"),
            "testkit must stay a dev-dependency"
        );
    }

    #[test]
    fn infra_crate_compiles() {
        assert!(!infra_crate_version().is_empty());
        assert!(!app_crate_version().is_empty());
        assert!(!adapters_crate_version().is_empty());
        assert!(!config_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}

//! # call-timer-domain
//!
//! Domain values for call timing instrumentation.
//!
//! This crate contains the naming and sampling model with no infrastructure dependencies:
//!
//! - **Primitives** - `ReceiverType`, `OperationName`, `MetricKey`
//! - **Call** - `CallContext`, `TimedMarker`, `CallSite`
//! - **Sample** - `TimingSample`, `elapsed_millis`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use call_timer_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod call;
pub mod primitives;
pub mod sample;

pub use call::{CallAttributes, CallContext, CallSite, TimedMarker};
pub use primitives::{METRIC_KEY_PREFIX, MetricKey, OperationName, PrimitiveError, ReceiverType};
pub use sample::{TimingSample, elapsed_millis};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

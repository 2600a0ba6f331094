//! # call-timer-testkit
//!
//! Test helpers and in-memory adapters.
//! This crate depends on `ports` only.

pub mod in_memory;

pub use in_memory::{CapturingLogger, NoopLogger, PanickingSink, RecordedSample, RecordingSink};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

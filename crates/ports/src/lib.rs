//! # call-timer-ports
//!
//! Port traits for the call-timer hexagonal architecture.
//!
//! This crate defines the interfaces between the timing core and its
//! collaborators (metric sinks, key strategies, loggers). It depends only on
//! `domain`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod key_generator;
pub mod logger;
pub mod sink;

pub use key_generator::*;
pub use logger::*;
pub use sink::*;

// Re-export domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `call-timer-domain`.
pub use call_timer_domain::{CallContext, TimedMarker};

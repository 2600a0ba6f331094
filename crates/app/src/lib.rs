//! # call-timer-app
//!
//! Timing interceptor and key strategies.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod interceptor;
pub mod key_generator;
pub mod timed;

pub use interceptor::{InterceptorBuildError, TimingInterceptor, TimingInterceptorBuilder};
pub use key_generator::DefaultKeyGenerator;
pub use timed::TimedOperation;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

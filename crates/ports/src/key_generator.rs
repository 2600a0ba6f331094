//! Metric key strategy contract.

use call_timer_domain::{CallContext, TimedMarker};

/// Derives the metric key for a call, without the namespace prefix.
///
/// Implementations must be pure and safe to call concurrently. Keys are
/// expected to be period-separated segments such as `OrderService.placeOrder`;
/// the interceptor prepends the namespace prefix itself.
pub trait KeyGeneratorPort: Send + Sync {
    /// Produce a non-empty key for the call.
    fn generate_key(&self, context: &CallContext, marker: &TimedMarker) -> String;
}

impl<F> KeyGeneratorPort for F
where
    F: Fn(&CallContext, &TimedMarker) -> String + Send + Sync,
{
    fn generate_key(&self, context: &CallContext, marker: &TimedMarker) -> String {
        self(context, marker)
    }
}

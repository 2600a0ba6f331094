//! Default metric key strategy.

use call_timer_ports::{CallContext, KeyGeneratorPort, TimedMarker};

/// Uses the marker's explicit key when present, otherwise
/// `<ShortReceiverType>.<operation>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultKeyGenerator;

impl KeyGeneratorPort for DefaultKeyGenerator {
    fn generate_key(&self, context: &CallContext, marker: &TimedMarker) -> String {
        marker
            .explicit_key()
            .map_or_else(|| context.derived_key(), str::to_owned)
    }
}

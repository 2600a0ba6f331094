//! Integration coverage for call naming and sample primitives.

use call_timer_domain::{
    CallContext, CallSite, METRIC_KEY_PREFIX, MetricKey, OperationName, PrimitiveError,
    ReceiverType, elapsed_millis,
};
use call_timer_shared::ErrorEnvelope;
use proptest::prelude::*;
use std::time::Duration;

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = OperationName::parse("  ") else {
        return Err(PrimitiveError::EmptyOperationName { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_operation_name");
    assert_eq!(envelope.metadata.get("input_length"), Some(&"2".to_string()));

    let Err(error) = MetricKey::prefixed("") else {
        return Err(PrimitiveError::EmptyMetricKey { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.code(), "invalid_metric_key");

    Ok(())
}

#[test]
fn derived_metric_key_matches_convention() -> Result<(), PrimitiveError> {
    let context = CallContext::new(
        ReceiverType::parse("shop::orders::OrderService")?,
        OperationName::parse("placeOrder")?,
    );

    let key = MetricKey::for_call(&context);
    assert_eq!(key.as_str(), "timer.OrderService.placeOrder");
    assert_eq!(key.unprefixed(), "OrderService.placeOrder");

    Ok(())
}

#[test]
fn call_site_defaults_to_automatic_marker() -> Result<(), PrimitiveError> {
    struct Inventory;

    let site = CallSite::of::<Inventory>("reserve")?;
    assert_eq!(site.marker().explicit_key(), None);
    assert_eq!(site.context().derived_key(), "Inventory.reserve");

    Ok(())
}

proptest! {
    #[test]
    fn short_name_is_last_path_segment(
        segments in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 0..4),
        name in "[A-Z][A-Za-z0-9]{0,12}",
        generic in proptest::option::of("[A-Z][a-z]{0,6}"),
    ) {
        let mut path = segments.join("::");
        if !path.is_empty() {
            path.push_str("::");
        }
        path.push_str(&name);
        if let Some(generic) = generic {
            path.push('<');
            path.push_str(&generic);
            path.push('>');
        }

        let receiver = ReceiverType::parse(&path)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(receiver.short_name(), name.as_str());
    }

    #[test]
    fn elapsed_millis_is_integer_division(nanos in 0_u64..u64::MAX) {
        prop_assert_eq!(elapsed_millis(Duration::from_nanos(nanos)), nanos / 1_000_000);
    }

    #[test]
    fn prefixed_keys_always_carry_namespace(raw in "[A-Za-z0-9_.]{1,32}") {
        prop_assume!(!raw.trim().is_empty());
        let key = MetricKey::prefixed(&raw)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert!(key.as_str().starts_with(METRIC_KEY_PREFIX));
        prop_assert_eq!(key.unprefixed(), raw.as_str());
    }
}

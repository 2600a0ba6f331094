//! Contract-style tests for port traits using in-memory adapters.

use call_timer_domain::{CallContext, TimedMarker};
use call_timer_ports::{KeyGeneratorPort, LogFields, LogLevel, LoggerPort, MetricSinkPort};
use call_timer_testkit::{CapturingLogger, NoopLogger, RecordingSink};
use serde_json::json;
use std::sync::Arc;
use std::thread;

struct Ledger;

#[test]
fn recording_sink_keeps_arrival_order() {
    let sink = RecordingSink::default();
    sink.record_timer_ms("timer.a", 3);
    sink.record_timer_ms("timer.b", 0);

    assert_eq!(sink.keys(), vec!["timer.a", "timer.b"]);
    assert_eq!(sink.samples()[0].duration_ms, 3);

    let drained = sink.take();
    assert_eq!(drained.len(), 2);
    assert!(sink.is_empty());
}

#[test]
fn recording_sink_is_shareable_across_threads() {
    let sink = Arc::new(RecordingSink::default());
    let port: Arc<dyn MetricSinkPort> = sink.clone();

    thread::scope(|scope| {
        for _ in 0..4 {
            let port = Arc::clone(&port);
            scope.spawn(move || port.record_timer_ms("timer.shared", 1));
        }
    });

    assert_eq!(sink.len(), 4);
}

#[test]
fn capturing_logger_filters_by_level() {
    let logger = CapturingLogger::default();
    let mut fields = LogFields::new();
    fields.insert("metric".into(), json!("timer.x"));

    logger.debug("debug.event", "quiet", None);
    logger.warn("warn.event", "loud", Some(fields));

    assert_eq!(logger.event_names(), vec!["debug.event", "warn.event"]);
    assert_eq!(logger.at_least(LogLevel::Warn).len(), 1);
    assert_eq!(logger.field("warn.event", "metric"), Some(json!("timer.x")));
    assert_eq!(logger.field("debug.event", "metric"), None);

    NoopLogger.error("ignored", "ignored", None);
}

#[test]
fn closures_satisfy_key_generator_port() -> Result<(), Box<dyn std::error::Error>> {
    let generator = |context: &CallContext, _: &TimedMarker| context.operation().to_string();
    let context = CallContext::for_receiver::<Ledger>("post")?;

    assert_eq!(generator.generate_key(&context, &TimedMarker::auto()), "post");
    Ok(())
}

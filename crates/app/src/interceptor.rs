//! Timing interceptor: measures one call and records exactly one sample.

use crate::key_generator::DefaultKeyGenerator;
use crate::timed::TimedOperation;
use call_timer_domain::{CallSite, MetricKey, TimingSample};
use call_timer_ports::{
    CallContext, KeyGeneratorPort, LogFields, LoggerPort, MetricSinkPort, TimedMarker,
};
use call_timer_shared::{ErrorCode, ErrorEnvelope};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Missing collaborator detected while assembling an interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InterceptorBuildError {
    /// No metric sink was supplied.
    #[error("timing interceptor requires a metric sink")]
    MissingSink,
    /// No key generator was supplied.
    #[error("timing interceptor requires a key generator")]
    MissingKeyGenerator,
}

impl InterceptorBuildError {
    /// Name of the missing collaborator.
    #[must_use]
    pub const fn collaborator(self) -> &'static str {
        match self {
            Self::MissingSink => "sink",
            Self::MissingKeyGenerator => "keyGenerator",
        }
    }
}

impl From<InterceptorBuildError> for ErrorEnvelope {
    fn from(error: InterceptorBuildError) -> Self {
        Self::invariant(ErrorCode::missing_collaborator(), error.to_string())
            .with_metadata("collaborator", error.collaborator())
    }
}

/// Wraps calls so each one is timed and recorded under a `timer.`-prefixed key.
///
/// Holds no per-call state: clones share collaborators and any number of
/// threads or tasks may time calls through the same instance.
#[derive(Clone)]
pub struct TimingInterceptor {
    sink: Arc<dyn MetricSinkPort>,
    key_generator: Arc<dyn KeyGeneratorPort>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl fmt::Debug for TimingInterceptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TimingInterceptor")
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl TimingInterceptor {
    /// Interceptor recording into `sink` with the default key strategy.
    #[must_use]
    pub fn new(sink: Arc<dyn MetricSinkPort>) -> Self {
        Self::with_key_generator(sink, Arc::new(DefaultKeyGenerator))
    }

    /// Interceptor recording into `sink` with a custom key strategy.
    #[must_use]
    pub fn with_key_generator(
        sink: Arc<dyn MetricSinkPort>,
        key_generator: Arc<dyn KeyGeneratorPort>,
    ) -> Self {
        Self {
            sink,
            key_generator,
            logger: None,
        }
    }

    /// Start assembling an interceptor from optional parts.
    #[must_use]
    pub fn builder() -> TimingInterceptorBuilder {
        TimingInterceptorBuilder::default()
    }

    /// Attach a logger for key-contract warnings.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Run `operation` once and record how long it took.
    ///
    /// The return value, `Ok` or `Err` alike, is handed back untouched. The
    /// sample is also recorded when `operation` panics; the panic then keeps
    /// unwinding. A sink that itself panics during that unwind aborts the
    /// process.
    pub fn time<T, F>(&self, context: &CallContext, marker: &TimedMarker, operation: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _sample = SampleGuard::start(self, context, marker);
        operation()
    }

    /// Await `operation` and record how long it took.
    ///
    /// Timing starts when this method is called, not on first poll. If the
    /// returned future is dropped before completion (or never polled), the
    /// time elapsed until the drop is recorded.
    pub fn time_async<'a, Fut>(
        &'a self,
        context: &'a CallContext,
        marker: &'a TimedMarker,
        operation: Fut,
    ) -> impl Future<Output = Fut::Output>
    where
        Fut: Future,
    {
        self.time_async_with(context, marker, || operation)
    }

    /// Start the clock, then build the future with `make`; the time spent in
    /// `make` counts toward the sample.
    pub(crate) fn time_async_with<'a, Fut, M>(
        &'a self,
        context: &'a CallContext,
        marker: &'a TimedMarker,
        make: M,
    ) -> impl Future<Output = Fut::Output>
    where
        M: FnOnce() -> Fut,
        Fut: Future,
    {
        let sample = SampleGuard::start(self, context, marker);
        let operation = make();
        async move {
            let _sample = sample;
            operation.await
        }
    }

    /// [`TimingInterceptor::time`] for a registered call site.
    pub fn time_site<T, F>(&self, site: &CallSite, operation: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.time(site.context(), site.marker(), operation)
    }

    /// [`TimingInterceptor::time_async`] for a registered call site.
    pub fn time_site_async<'a, Fut>(
        &'a self,
        site: &'a CallSite,
        operation: Fut,
    ) -> impl Future<Output = Fut::Output>
    where
        Fut: Future,
    {
        self.time_async(site.context(), site.marker(), operation)
    }

    /// Decorate `operation` so every call through the result is timed.
    #[must_use]
    pub fn wrap<F>(&self, site: CallSite, operation: F) -> TimedOperation<F> {
        TimedOperation::new(self.clone(), site, operation)
    }

    /// Resolve the prefixed metric key for a call.
    ///
    /// A key generator that returns a blank key breaks its contract; the
    /// derived `<ShortType>.<operation>` key is used instead and a warning is
    /// logged.
    pub fn metric_key(&self, context: &CallContext, marker: &TimedMarker) -> MetricKey {
        let generated = self.key_generator.generate_key(context, marker);
        MetricKey::prefixed(&generated).unwrap_or_else(|_| {
            let fallback = MetricKey::for_call(context);
            if let Some(logger) = self.logger.as_ref() {
                logger.warn(
                    "timing.key.empty",
                    "Key generator returned an empty key; using derived key",
                    Some(log_fields_fallback(context, &fallback)),
                );
            }
            fallback
        })
    }

    fn submit(&self, context: &CallContext, marker: &TimedMarker, started_at: Instant) {
        let elapsed = started_at.elapsed();
        let sample = TimingSample::from_elapsed(self.metric_key(context, marker), elapsed);
        tracing::trace!(
            metric = sample.key.as_str(),
            duration_ms = sample.duration_ms,
            "timing sample"
        );
        self.sink
            .record_timer_ms(sample.key.as_str(), sample.duration_ms);
    }
}

/// Assembles a [`TimingInterceptor`], rejecting missing collaborators.
#[derive(Default)]
pub struct TimingInterceptorBuilder {
    sink: Option<Arc<dyn MetricSinkPort>>,
    key_generator: Option<Arc<dyn KeyGeneratorPort>>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl TimingInterceptorBuilder {
    /// Set the metric sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn MetricSinkPort>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the key generator.
    #[must_use]
    pub fn key_generator(mut self, key_generator: Arc<dyn KeyGeneratorPort>) -> Self {
        self.key_generator = Some(key_generator);
        self
    }

    /// Use [`DefaultKeyGenerator`].
    #[must_use]
    pub fn default_key_generator(self) -> Self {
        self.key_generator(Arc::new(DefaultKeyGenerator))
    }

    /// Set the logger.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the interceptor; fails when the sink or key generator is missing.
    pub fn build(self) -> Result<TimingInterceptor, InterceptorBuildError> {
        let sink = self.sink.ok_or(InterceptorBuildError::MissingSink)?;
        let key_generator = self
            .key_generator
            .ok_or(InterceptorBuildError::MissingKeyGenerator)?;

        if let Some(logger) = self.logger.as_ref() {
            logger.debug("timing.interceptor.ready", "Timing interceptor assembled", None);
        }

        Ok(TimingInterceptor {
            sink,
            key_generator,
            logger: self.logger,
        })
    }
}

/// Records the sample when dropped, on every exit path.
struct SampleGuard<'a> {
    interceptor: &'a TimingInterceptor,
    context: &'a CallContext,
    marker: &'a TimedMarker,
    started_at: Instant,
}

impl<'a> SampleGuard<'a> {
    fn start(
        interceptor: &'a TimingInterceptor,
        context: &'a CallContext,
        marker: &'a TimedMarker,
    ) -> Self {
        Self {
            interceptor,
            context,
            marker,
            started_at: Instant::now(),
        }
    }
}

impl Drop for SampleGuard<'_> {
    fn drop(&mut self) {
        self.interceptor
            .submit(self.context, self.marker, self.started_at);
    }
}

fn log_fields_fallback(context: &CallContext, fallback: &MetricKey) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "receiver".to_owned().into_boxed_str(),
        Value::String(context.receiver().as_str().to_owned()),
    );
    fields.insert(
        "operation".to_owned().into_boxed_str(),
        Value::String(context.operation().as_str().to_owned()),
    );
    fields.insert(
        "metric".to_owned().into_boxed_str(),
        Value::String(fallback.as_str().to_owned()),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_timer_testkit::{CapturingLogger, RecordingSink};
    use call_timer_domain::PrimitiveError;

    struct OrderService;

    fn order_context() -> Result<CallContext, PrimitiveError> {
        CallContext::for_receiver::<OrderService>("placeOrder")
    }

    #[test]
    fn builder_rejects_missing_sink() {
        let result = TimingInterceptor::builder().default_key_generator().build();
        assert_eq!(result.err(), Some(InterceptorBuildError::MissingSink));
    }

    #[test]
    fn builder_rejects_missing_key_generator() {
        let sink = Arc::new(RecordingSink::default());
        let result = TimingInterceptor::builder().sink(sink.clone()).build();

        assert_eq!(result.err(), Some(InterceptorBuildError::MissingKeyGenerator));
        assert!(sink.is_empty());
    }

    #[test]
    fn build_error_maps_to_config_envelope() {
        let envelope: ErrorEnvelope = InterceptorBuildError::MissingSink.into();
        assert_eq!(envelope.code, ErrorCode::missing_collaborator());
        assert_eq!(
            envelope.metadata.get("collaborator").map(String::as_str),
            Some("sink")
        );
    }

    #[test]
    fn blank_custom_key_falls_back_to_derived_key() -> Result<(), PrimitiveError> {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(CapturingLogger::default());
        let blank = |_: &CallContext, _: &TimedMarker| String::from("  ");
        let interceptor = TimingInterceptor::with_key_generator(sink.clone(), Arc::new(blank))
            .with_logger(logger.clone());

        interceptor.time(&order_context()?, &TimedMarker::auto(), || ());

        assert_eq!(sink.keys(), vec!["timer.OrderService.placeOrder".to_string()]);
        assert_eq!(logger.event_names(), vec!["timing.key.empty".to_string()]);
        Ok(())
    }

    #[test]
    fn metric_key_is_prefixed_once() -> Result<(), PrimitiveError> {
        let interceptor = TimingInterceptor::new(Arc::new(RecordingSink::default()));
        let key = interceptor.metric_key(&order_context()?, &TimedMarker::with_key("custom.key"));
        assert_eq!(key.as_str(), "timer.custom.key");
        Ok(())
    }

    #[test]
    fn debug_output_hides_collaborators() {
        let interceptor = TimingInterceptor::new(Arc::new(RecordingSink::default()));
        let rendered = format!("{interceptor:?}");
        assert!(rendered.starts_with("TimingInterceptor"));
    }
}

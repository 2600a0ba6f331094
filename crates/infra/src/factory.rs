//! Adapter selection from validated config.

use crate::InfraResult;
use call_timer_adapters::{
    JsonLogger, JsonMetricSink, LogSink, NoopMetricSink, StderrLogSink, TracingLogger,
    TracingMetricSink,
};
use call_timer_app::{DefaultKeyGenerator, TimingInterceptor};
use call_timer_config::{LogFormat, LogLevelSetting, SinkKind, ValidatedTimingConfig};
use call_timer_ports::{LogLevel, LoggerPort, MetricSinkPort, MetricTags};
use call_timer_shared::ErrorEnvelope;
use std::sync::Arc;

/// Build the metric sink selected by `sink.kind`, writing JSON to stderr.
#[must_use]
pub fn build_metric_sink(config: &ValidatedTimingConfig) -> Arc<dyn MetricSinkPort> {
    build_metric_sink_with_output(config, Arc::new(StderrLogSink))
}

/// Build the metric sink selected by `sink.kind`, writing JSON lines to `output`.
#[must_use]
pub fn build_metric_sink_with_output(
    config: &ValidatedTimingConfig,
    output: Arc<dyn LogSink>,
) -> Arc<dyn MetricSinkPort> {
    match config.sink.kind {
        SinkKind::Json => {
            Arc::new(JsonMetricSink::new(output).with_base_tags(metric_tags(config)))
        },
        SinkKind::Tracing => Arc::new(TracingMetricSink),
        SinkKind::Noop => Arc::new(NoopMetricSink),
    }
}

/// Build the diagnostic logger selected by `logging.format`, writing JSON to stderr.
///
/// Returns `None` when logging is off.
#[must_use]
pub fn build_logger(config: &ValidatedTimingConfig) -> Option<Arc<dyn LoggerPort>> {
    build_logger_with_output(config, Arc::new(StderrLogSink))
}

/// Build the diagnostic logger selected by `logging.format`, writing JSON lines to `output`.
#[must_use]
pub fn build_logger_with_output(
    config: &ValidatedTimingConfig,
    output: Arc<dyn LogSink>,
) -> Option<Arc<dyn LoggerPort>> {
    match config.logging.format {
        LogFormat::Json => Some(Arc::new(
            JsonLogger::new(output).with_min_level(min_log_level(config.logging.level)),
        )),
        LogFormat::Tracing => Some(Arc::new(TracingLogger)),
        LogFormat::Off => None,
    }
}

/// Build a fully wired interceptor from config.
pub fn build_interceptor(config: &ValidatedTimingConfig) -> InfraResult<TimingInterceptor> {
    build_interceptor_with_output(config, Arc::new(StderrLogSink))
}

/// Build an interceptor whose JSON sink and logger share `output`.
pub fn build_interceptor_with_output(
    config: &ValidatedTimingConfig,
    output: Arc<dyn LogSink>,
) -> InfraResult<TimingInterceptor> {
    let sink = build_metric_sink_with_output(config, Arc::clone(&output));
    assemble(sink, build_logger_with_output(config, output), config)
}

/// Build an interceptor around a caller-supplied sink; config selects the logger only.
pub fn build_interceptor_with_sink(
    config: &ValidatedTimingConfig,
    sink: Arc<dyn MetricSinkPort>,
) -> InfraResult<TimingInterceptor> {
    assemble(sink, build_logger(config), config)
}

fn assemble(
    sink: Arc<dyn MetricSinkPort>,
    logger: Option<Arc<dyn LoggerPort>>,
    config: &ValidatedTimingConfig,
) -> InfraResult<TimingInterceptor> {
    let mut builder = TimingInterceptor::builder()
        .sink(sink)
        .key_generator(Arc::new(DefaultKeyGenerator));
    if let Some(logger) = logger {
        builder = builder.logger(logger);
    }

    let interceptor = builder.build().map_err(ErrorEnvelope::from)?;
    tracing::debug!(
        sink = config.sink.kind.as_str(),
        log_format = config.logging.format.as_str(),
        "timing interceptor wired"
    );
    Ok(interceptor)
}

const fn min_log_level(level: LogLevelSetting) -> LogLevel {
    match level {
        LogLevelSetting::Trace | LogLevelSetting::Debug => LogLevel::Debug,
        LogLevelSetting::Info => LogLevel::Info,
        LogLevelSetting::Warn => LogLevel::Warn,
        LogLevelSetting::Error => LogLevel::Error,
    }
}

fn metric_tags(config: &ValidatedTimingConfig) -> MetricTags {
    config
        .sink
        .base_tags
        .iter()
        .map(|(key, value)| (key.as_str().into(), value.as_str().into()))
        .collect()
}

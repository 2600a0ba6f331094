//! Domain primitives with validated constructors.

use crate::CallContext;
use call_timer_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix carried by every emitted metric key.
pub const METRIC_KEY_PREFIX: &str = "timer.";

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `ReceiverType` is empty after trimming.
    EmptyReceiverType {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `OperationName` is empty after trimming.
    EmptyOperationName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Unprefixed metric key is empty after trimming.
    EmptyMetricKey {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyReceiverType { .. } => ErrorCode::new("domain", "invalid_receiver_type"),
            Self::EmptyOperationName { .. } => ErrorCode::new("domain", "invalid_operation_name"),
            Self::EmptyMetricKey { .. } => ErrorCode::new("domain", "invalid_metric_key"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReceiverType { .. } => formatter.write_str("ReceiverType must be non-empty"),
            Self::EmptyOperationName { .. } => {
                formatter.write_str("OperationName must be non-empty")
            },
            Self::EmptyMetricKey { .. } => formatter.write_str("MetricKey must be non-empty"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            PrimitiveError::EmptyReceiverType { input_length }
            | PrimitiveError::EmptyOperationName { input_length }
            | PrimitiveError::EmptyMetricKey { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
        }
    }
}

/// Declared type of the object an instrumented operation is invoked on.
///
/// Holds the full type path; [`ReceiverType::short_name`] yields the
/// unqualified name used in derived metric keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiverType(Box<str>);

impl ReceiverType {
    /// Receiver type of `T`, as reported by [`std::any::type_name`].
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_owned().into_boxed_str())
    }

    /// Parse a `ReceiverType` from a type path such as `orders::OrderService`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyReceiverType {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the full type path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unqualified type name: module path, generic arguments and reference
    /// sigils removed (`&app::orders::OrderService<Db>` becomes `OrderService`).
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_type_name(&self.0)
    }
}

impl AsRef<str> for ReceiverType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ReceiverType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of the invoked operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(Box<str>);

impl OperationName {
    /// Parse an `OperationName` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyOperationName {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fully qualified metric key, always starting with [`METRIC_KEY_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MetricKey(Box<str>);

impl MetricKey {
    /// Prefix a generated key. The raw key is kept verbatim; only
    /// whitespace-only input is rejected.
    pub fn prefixed(raw: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = raw.as_ref();
        if trimmed_non_empty(raw).is_none() {
            return Err(PrimitiveError::EmptyMetricKey {
                input_length: raw.len(),
            });
        }

        Ok(Self(format!("{METRIC_KEY_PREFIX}{raw}").into_boxed_str()))
    }

    /// Key derived from the call itself: `timer.<ShortType>.<operation>`.
    #[must_use]
    pub fn for_call(context: &CallContext) -> Self {
        Self(format!("{METRIC_KEY_PREFIX}{}", context.derived_key()).into_boxed_str())
    }

    /// Access the full, prefixed key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as produced by the key generator, without the namespace prefix.
    #[must_use]
    pub fn unprefixed(&self) -> &str {
        self.0.strip_prefix(METRIC_KEY_PREFIX).unwrap_or(&self.0)
    }
}

impl AsRef<str> for MetricKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn short_type_name(full: &str) -> &str {
    let trimmed = full.trim();

    let mut rest = trimmed;
    loop {
        let next = rest
            .strip_prefix('&')
            .or_else(|| rest.strip_prefix("mut "))
            .or_else(|| rest.strip_prefix("dyn "))
            .map(str::trim_start);
        match next {
            Some(stripped) => rest = stripped,
            None => break,
        }
    }

    let base = rest.split('<').next().unwrap_or(rest);
    let short = base.rsplit("::").next().unwrap_or(base).trim();
    if short.is_empty() { trimmed } else { short }
}

//! Call context, instrumentation marker, and call-site registration.

use crate::primitives::{OperationName, PrimitiveError, ReceiverType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra naming data attached to a call (argument-derived values, tenant, etc.).
pub type CallAttributes = BTreeMap<Box<str>, Box<str>>;

/// Information about one in-flight call, used for naming its metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    receiver: ReceiverType,
    operation: OperationName,
    attributes: CallAttributes,
}

impl CallContext {
    /// Create a context from a receiver type and operation name.
    #[must_use]
    pub fn new(receiver: ReceiverType, operation: OperationName) -> Self {
        Self {
            receiver,
            operation,
            attributes: CallAttributes::new(),
        }
    }

    /// Context for `operation` invoked on a receiver of type `T`.
    pub fn for_receiver<T: ?Sized>(operation: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        Ok(Self::new(
            ReceiverType::of::<T>(),
            OperationName::parse(operation)?,
        ))
    }

    /// Attach a naming attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Receiver type.
    #[must_use]
    pub const fn receiver(&self) -> &ReceiverType {
        &self.receiver
    }

    /// Operation name.
    #[must_use]
    pub const fn operation(&self) -> &OperationName {
        &self.operation
    }

    /// Naming attributes.
    #[must_use]
    pub const fn attributes(&self) -> &CallAttributes {
        &self.attributes
    }

    /// Look up a single attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(AsRef::as_ref)
    }

    /// Two-segment key `<ShortType>.<operation>` (never empty).
    #[must_use]
    pub fn derived_key(&self) -> String {
        format!("{}.{}", self.receiver.short_name(), self.operation)
    }
}

/// Marks an operation as timed, optionally pinning its metric key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TimedMarker {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<Box<str>>,
}

impl TimedMarker {
    /// Marker without an override; the key is derived from the call.
    #[must_use]
    pub const fn auto() -> Self {
        Self { key: None }
    }

    /// Marker pinning the metric key (used verbatim, before prefixing).
    #[must_use]
    pub fn with_key(key: impl Into<Box<str>>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// The explicit key, if one was given and is non-empty.
    #[must_use]
    pub fn explicit_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| !key.is_empty())
    }
}

/// An instrumented operation registered with its marker.
///
/// Built once per call site and reused for every call through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    context: CallContext,
    marker: TimedMarker,
}

impl CallSite {
    /// Register a call site from its parts.
    #[must_use]
    pub const fn new(context: CallContext, marker: TimedMarker) -> Self {
        Self { context, marker }
    }

    /// Call site for `operation` on a receiver of type `T`, with an automatic key.
    pub fn of<T: ?Sized>(operation: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        Ok(Self::new(
            CallContext::for_receiver::<T>(operation)?,
            TimedMarker::auto(),
        ))
    }

    /// Replace the marker.
    #[must_use]
    pub fn with_marker(mut self, marker: TimedMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Pin the metric key for this call site.
    #[must_use]
    pub fn with_key(self, key: impl Into<Box<str>>) -> Self {
        self.with_marker(TimedMarker::with_key(key))
    }

    /// Call context.
    #[must_use]
    pub const fn context(&self) -> &CallContext {
        &self.context
    }

    /// Instrumentation marker.
    #[must_use]
    pub const fn marker(&self) -> &TimedMarker {
        &self.marker
    }
}

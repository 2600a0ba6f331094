//! JSON Schema export for the timing config.

use crate::TimingConfig;
use schemars::{Schema, schema_for};

/// JSON Schema for `TimingConfig`.
#[must_use]
pub fn timing_config_schema() -> Schema {
    schema_for!(TimingConfig)
}

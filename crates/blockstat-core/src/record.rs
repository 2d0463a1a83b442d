//! Records emitted by a sampling cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::field::Field;

/// Plugin identifier carried by every record.
pub const PLUGIN_NAME: &str = "blockstat";

/// Value type of every record: a single-sample gauge.
pub const VALUE_TYPE: &str = "gauge";

/// One emitted measurement for a (device, field) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueRecord {
    pub plugin: &'static str,
    /// Device name.
    pub plugin_instance: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    /// Field name, e.g. `read_ios`.
    pub type_instance: &'static str,
    /// Delta for counters, raw value for gauges.
    pub value: u64,
    /// Start of the cycle that produced the record.
    pub time: DateTime<Utc>,
}

impl ValueRecord {
    pub fn new(device: &str, field: Field, value: u64, time: DateTime<Utc>) -> Self {
        Self {
            plugin: PLUGIN_NAME,
            plugin_instance: device.to_string(),
            value_type: VALUE_TYPE,
            type_instance: field.name(),
            value,
            time,
        }
    }

    /// collectd-style identifier: `host/plugin-instance/type-type_instance`.
    pub fn identifier(&self, host: &str) -> String {
        format!(
            "{}/{}-{}/{}-{}",
            host, self.plugin, self.plugin_instance, self.value_type, self.type_instance
        )
    }
}

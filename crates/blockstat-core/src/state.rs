//! Last-observed raw counter values, keyed by device and field.

use std::collections::HashMap;

use crate::field::Field;

/// Previous-value table.
///
/// An entry for (device, field) exists once that pair has been read
/// successfully at least once. Nothing is persisted, so a restart costs one
/// warm-up cycle per field.
#[derive(Debug, Default)]
pub struct CounterStore {
    devices: HashMap<String, HashMap<Field, u64>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures a (possibly empty) per-field map exists for `device`.
    pub fn register_device(&mut self, device: &str) {
        self.devices.entry(device.to_string()).or_default();
    }

    /// Returns the stored raw value, if the pair was ever observed.
    pub fn get(&self, device: &str, field: Field) -> Option<u64> {
        self.devices.get(device)?.get(&field).copied()
    }

    /// Stores `value` as the latest observation for the pair.
    pub fn set(&mut self, device: &str, field: Field, value: u64) {
        self.devices
            .entry(device.to_string())
            .or_default()
            .insert(field, value);
    }

    /// Number of fields observed for `device`.
    pub fn observed_fields(&self, device: &str) -> usize {
        self.devices.get(device).map_or(0, HashMap::len)
    }

    /// Registered or observed device names, in no particular order.
    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Whether `device` has been registered or observed.
    pub fn contains_device(&self, device: &str) -> bool {
        self.devices.contains_key(device)
    }

    /// Number of devices tracked.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unobserved() {
        let mut store = CounterStore::new();
        assert_eq!(store.get("sda", Field::ReadIos), None);

        store.register_device("sda");
        assert_eq!(store.get("sda", Field::ReadIos), None);
        assert_eq!(store.observed_fields("sda"), 0);
    }

    #[test]
    fn test_set_then_get() {
        let mut store = CounterStore::new();
        store.register_device("sda");
        store.set("sda", Field::ReadIos, 100);
        store.set("sda", Field::ReadIos, 150);
        store.set("sda", Field::IoTicks, 5);

        assert_eq!(store.get("sda", Field::ReadIos), Some(150));
        assert_eq!(store.get("sda", Field::IoTicks), Some(5));
        assert_eq!(store.get("sdb", Field::ReadIos), None);
        assert_eq!(store.observed_fields("sda"), 2);
    }

    #[test]
    fn test_set_creates_device() {
        let mut store = CounterStore::new();
        store.set("nvme0n1", Field::WriteIos, 9);
        assert!(store.contains_device("nvme0n1"));
        assert_eq!(store.get("nvme0n1", Field::WriteIos), Some(9));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut store = CounterStore::new();
        store.register_device("sda");
        store.set("sda", Field::ReadIos, 1);
        store.register_device("sda");

        assert_eq!(store.len(), 1);
        assert_eq!(store.devices().collect::<Vec<_>>(), vec!["sda"]);
        // re-registering keeps observations
        assert_eq!(store.get("sda", Field::ReadIos), Some(1));
    }

    #[test]
    fn test_devices_lists_registered_and_observed() {
        let mut store = CounterStore::new();
        store.register_device("sdb");
        store.set("sda", Field::ReadIos, 1);
        store.set("sda", Field::WriteIos, 2);

        let mut devices: Vec<&str> = store.devices().collect();
        devices.sort();
        assert_eq!(devices, vec!["sda", "sdb"]);
        assert_eq!(store.observed_fields("sda"), 2);
        assert_eq!(store.observed_fields("sdb"), 0);
    }
}

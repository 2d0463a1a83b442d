//! The sampling cycle.
//!
//! For every configured device the processor reads the current stat line,
//! turns each processed field into a delta against the [`CounterStore`],
//! updates the store and dispatches one [`ValueRecord`] per field. A field
//! seen for the first time only primes the store.
//!
//! Failures are contained per device and per cycle: a missing or malformed
//! stat file is reported through [`Diagnostics`] and the next device is
//! processed as usual. The device stays configured and is read again on the
//! next cycle.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, trace, warn};

use crate::collector::sysfs::{self, CollectError, DEFAULT_SYS_BLOCK_PATH, StatFormat};
use crate::collector::traits::FileSystem;
use crate::delta::{CounterWidth, field_delta};
use crate::field::{Field, FieldKind};
use crate::output::OutputSink;
use crate::record::ValueRecord;
use crate::state::CounterStore;

/// Entry points a host scheduler drives.
pub trait ReadPlugin {
    /// Called once at startup with the configured device names.
    fn configure(&mut self, devices: &[String]);

    /// Called once per sampling interval.
    fn on_sampling_tick(&mut self) -> Vec<ValueRecord>;
}

/// Receives per-device failures. None of them are fatal.
pub trait Diagnostics {
    fn warn(&mut self, device: &str, error: &CollectError);
}

/// Reports failures as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&mut self, device: &str, error: &CollectError) {
        warn!(device, kind = error.kind(), "{}", error);
    }
}

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Directory holding `<device>/stat` entries.
    pub sys_block_path: PathBuf,
    pub stat_format: StatFormat,
    pub counter_width: CounterWidth,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sys_block_path: PathBuf::from(DEFAULT_SYS_BLOCK_PATH),
            stat_format: StatFormat::default(),
            counter_width: CounterWidth::default(),
        }
    }
}

/// Outcome of one cycle, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Devices whose stat line was read and processed.
    pub devices_sampled: usize,
    /// Devices skipped this cycle.
    pub devices_failed: usize,
    /// Records dispatched.
    pub records: usize,
    pub elapsed: Duration,
}

/// Owns the device set and the previous-value table for the process lifetime.
///
/// All mutation goes through `&mut self`, so cycles cannot overlap; a host
/// that shares the processor across threads must wrap it in a lock.
pub struct SampleProcessor<F: FileSystem, D: Diagnostics = TracingDiagnostics> {
    fs: F,
    diagnostics: D,
    config: ProcessorConfig,
    /// Configured devices, in insertion order, without duplicates.
    devices: Vec<String>,
    store: CounterStore,
}

impl<F: FileSystem> SampleProcessor<F> {
    /// Creates a processor that reports failures through `tracing`.
    pub fn new(fs: F) -> Self {
        Self::with_diagnostics(fs, TracingDiagnostics)
    }
}

impl<F: FileSystem, D: Diagnostics> SampleProcessor<F, D> {
    pub fn with_diagnostics(fs: F, diagnostics: D) -> Self {
        Self {
            fs,
            diagnostics,
            config: ProcessorConfig::default(),
            devices: Vec::new(),
            store: CounterStore::new(),
        }
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Adds a device to the set. Returns `false` for duplicates and empty names.
    pub fn add_device(&mut self, device: &str) -> bool {
        if device.is_empty() || self.devices.iter().any(|d| d == device) {
            return false;
        }
        self.devices.push(device.to_string());
        self.store.register_device(device);
        true
    }

    /// Configured devices, in insertion order.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Runs one cycle stamped with the current time.
    pub fn read_cycle(&mut self, sink: &mut dyn OutputSink) -> io::Result<CycleSummary> {
        self.read_cycle_at(Utc::now(), sink)
    }

    /// Runs one cycle over all configured devices, in configured order.
    ///
    /// Only a failing sink aborts the cycle; device failures are reported
    /// and skipped.
    pub fn read_cycle_at(
        &mut self,
        time: DateTime<Utc>,
        sink: &mut dyn OutputSink,
    ) -> io::Result<CycleSummary> {
        let start = Instant::now();
        let mut summary = CycleSummary::default();

        let Self {
            fs,
            diagnostics,
            config,
            devices,
            store,
        } = self;

        for device in devices.iter() {
            match sample(fs, config, store, device, time) {
                Ok(records) => {
                    summary.devices_sampled += 1;
                    for record in &records {
                        sink.dispatch(record)?;
                    }
                    summary.records += records.len();
                }
                Err(e) => {
                    summary.devices_failed += 1;
                    diagnostics.warn(device, &e);
                }
            }
        }

        sink.flush()?;
        summary.elapsed = start.elapsed();
        Ok(summary)
    }

    /// Samples a single device, updating the store.
    ///
    /// Returns the records for fields that already had a previous value. On
    /// error the store is left untouched.
    pub fn sample_device(
        &mut self,
        device: &str,
        time: DateTime<Utc>,
    ) -> Result<Vec<ValueRecord>, CollectError> {
        sample(&self.fs, &self.config, &mut self.store, device, time)
    }
}

fn sample<F: FileSystem>(
    fs: &F,
    config: &ProcessorConfig,
    store: &mut CounterStore,
    device: &str,
    time: DateTime<Utc>,
) -> Result<Vec<ValueRecord>, CollectError> {
    let stat = sysfs::read_block_stat(fs, &config.sys_block_path, device, config.stat_format)?;

    let mut records = Vec::with_capacity(Field::PROCESSED.len());
    for field in Field::PROCESSED {
        let curr = stat.get(field);
        let Some(prev) = store.get(device, field) else {
            store.set(device, field, curr);
            continue;
        };

        let value = field_delta(field, prev, curr, config.counter_width);
        if prev > curr && field.kind() == FieldKind::Counter {
            debug!(device, field = %field, prev, curr, value, "counter wrapped");
        }
        store.set(device, field, curr);
        trace!(device, field = %field, value, "sample");
        records.push(ValueRecord::new(device, field, value, time));
    }

    Ok(records)
}

impl<F: FileSystem, D: Diagnostics> ReadPlugin for SampleProcessor<F, D> {
    fn configure(&mut self, devices: &[String]) {
        for device in devices {
            self.add_device(device);
        }
    }

    fn on_sampling_tick(&mut self) -> Vec<ValueRecord> {
        let mut records: Vec<ValueRecord> = Vec::new();
        if let Err(e) = self.read_cycle(&mut records) {
            error!(error = %e, "sampling cycle failed");
        }
        records
    }
}

//! blockstat-core — block device I/O counter sampling.
//!
//! Provides:
//! - `collector` — filesystem abstraction, `/sys/block/<dev>/stat` parser, mock filesystem
//! - `field` — the per-device statistic slots and their counter/gauge classification
//! - `delta` — wraparound-aware counter delta arithmetic
//! - `state` — last-observed raw values per (device, field)
//! - `processor` — the sampling cycle: read, delta, store, dispatch
//! - `record` / `output` — emitted records and their wire formats
//!
//! # Example
//!
//! ```
//! use blockstat_core::collector::MockFs;
//! use blockstat_core::processor::{ReadPlugin, SampleProcessor};
//!
//! let fs = MockFs::new();
//! fs.add_block_device("sda", "100 0 800 50 0 0 0 0 0 5 5\n");
//!
//! let mut processor = SampleProcessor::new(fs);
//! processor.configure(&["sda".to_string()]);
//!
//! // First observation only primes the counter store.
//! assert!(processor.on_sampling_tick().is_empty());
//! ```

pub mod collector;
pub mod delta;
pub mod field;
pub mod output;
pub mod processor;
pub mod record;
pub mod state;

pub use collector::CollectError;
pub use field::{Field, FieldKind};
pub use processor::{ProcessorConfig, ReadPlugin, SampleProcessor};
pub use record::ValueRecord;

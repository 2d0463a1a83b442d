//! Block device statistics acquisition.
//!
//! Per-device statistics live under `/sys/block/<device>/stat`. Access goes
//! through the [`FileSystem`] trait so the sampling cycle can run against an
//! in-memory [`MockFs`] in tests and on non-Linux hosts.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                SampleProcessor                │
//! │   device set ── CounterStore ── delta         │
//! │                      │                        │
//! │         sysfs::read_block_stat()              │
//! │          /sys/block/<device>/stat             │
//! │                      │                        │
//! │               ┌──────▼──────┐                 │
//! │               │  FileSystem │ (trait)         │
//! │               └──────┬──────┘                 │
//! └──────────────────────┼────────────────────────┘
//!              ┌─────────┴─────────┐
//!       ┌──────▼──────┐     ┌──────▼──────┐
//!       │   RealFs    │     │   MockFs    │
//!       │  (Linux)    │     │  (Testing)  │
//!       └─────────────┘     └─────────────┘
//! ```

pub mod mock;
pub mod sysfs;
pub mod traits;

pub use mock::MockFs;
pub use sysfs::{BlockStat, CollectError, StatFormat};
pub use traits::{FileSystem, RealFs};

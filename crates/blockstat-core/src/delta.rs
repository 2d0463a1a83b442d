//! Counter delta computation with wraparound correction.
//!
//! Unlike the rate helpers elsewhere in the monitoring stack, which drop a
//! sample on counter regression, a regression here is read as the counter
//! overflowing its fixed width and restarting from zero.

use tracing::debug;

use crate::field::{Field, FieldKind};

/// Modulus of 32-bit kernel counters.
pub const WRAP_MODULUS_U32: u64 = 1 << 32;

/// Width at which raw counters wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterWidth {
    /// Counters wrap at 2^32.
    #[default]
    U32,
    /// Counters wrap at 2^64.
    U64,
}

impl CounterWidth {
    /// Largest value a counter of this width can hold.
    pub fn max_value(self) -> u64 {
        match self {
            CounterWidth::U32 => WRAP_MODULUS_U32 - 1,
            CounterWidth::U64 => u64::MAX,
        }
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        match self {
            CounterWidth::U32 => 32,
            CounterWidth::U64 => 64,
        }
    }
}

/// Computes how far a counter advanced from `prev` to `curr`.
///
/// A decrease is a wraparound: the result is `modulus - prev + curr`, which is
/// always below the modulus. If `prev` lies outside the width's domain the
/// decrease cannot be a wrap, so the counter is treated as reset and `curr`
/// is returned.
pub fn counter_delta(prev: u64, curr: u64, width: CounterWidth) -> u64 {
    if curr >= prev {
        return curr - prev;
    }
    let max = width.max_value();
    if prev > max {
        debug!(prev, curr, bits = width.bits(), "counter reset");
        return curr;
    }
    // (max - prev) + curr + 1 == modulus - prev + curr, and curr < prev keeps it <= max
    (max - prev) + curr + 1
}

/// Computes the value emitted for `field`: a delta for counters, `curr`
/// itself for gauges.
pub fn field_delta(field: Field, prev: u64, curr: u64, width: CounterWidth) -> u64 {
    match field.kind() {
        FieldKind::Gauge => curr,
        FieldKind::Counter => counter_delta(prev, curr, width),
    }
}

//! Statistic slots of `/sys/block/<dev>/stat`.
//!
//! The kernel documents the layout in `Documentation/block/stat.txt`. Only the
//! first eleven slots are known here; newer kernels append discard and flush
//! counters after them.

/// Whether a slot accumulates over time or is an instantaneous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Monotonically increasing, reported as a per-interval delta.
    Counter,
    /// Reported verbatim.
    Gauge,
}

/// One statistic slot, in line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ReadIos,
    ReadMerges,
    ReadSectors,
    ReadTicks,
    WriteIos,
    WriteMerges,
    WriteSectors,
    WriteTicks,
    InFlight,
    IoTicks,
    TimeInQueue,
}

impl Field {
    /// Number of slots in a stat line.
    pub const COUNT: usize = 11;

    /// All slots in line order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::ReadIos,
        Field::ReadMerges,
        Field::ReadSectors,
        Field::ReadTicks,
        Field::WriteIos,
        Field::WriteMerges,
        Field::WriteSectors,
        Field::WriteTicks,
        Field::InFlight,
        Field::IoTicks,
        Field::TimeInQueue,
    ];

    /// Slots that take part in a sampling cycle (indices 0..=9).
    ///
    /// `time_in_queue` is parsed but never stored or emitted.
    pub const PROCESSED: [Field; 10] = [
        Field::ReadIos,
        Field::ReadMerges,
        Field::ReadSectors,
        Field::ReadTicks,
        Field::WriteIos,
        Field::WriteMerges,
        Field::WriteSectors,
        Field::WriteTicks,
        Field::InFlight,
        Field::IoTicks,
    ];

    /// Position of the slot in the stat line.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks a slot up by its position in the stat line.
    pub fn from_index(index: usize) -> Option<Field> {
        Field::ALL.get(index).copied()
    }

    /// Name used as the record's type instance.
    pub fn name(self) -> &'static str {
        match self {
            Field::ReadIos => "read_ios",
            Field::ReadMerges => "read_merges",
            Field::ReadSectors => "read_sectors",
            Field::ReadTicks => "read_ticks",
            Field::WriteIos => "write_ios",
            Field::WriteMerges => "write_merges",
            Field::WriteSectors => "write_sectors",
            Field::WriteTicks => "write_ticks",
            Field::InFlight => "in_flight",
            Field::IoTicks => "io_ticks",
            Field::TimeInQueue => "time_in_queue",
        }
    }

    /// How the slot's value is turned into an emitted sample.
    ///
    /// `in_flight` is an instantaneous queue depth in the kernel, but it has
    /// always been reported here as a delta; `io_ticks` is the only slot
    /// passed through verbatim.
    pub fn kind(self) -> FieldKind {
        match self {
            Field::IoTicks => FieldKind::Gauge,
            _ => FieldKind::Counter,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

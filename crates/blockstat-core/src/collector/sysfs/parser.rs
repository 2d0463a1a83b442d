//! Parser for `/sys/block/<device>/stat`.
//!
//! Pure functions over string input so they can be tested without a kernel.

use crate::field::Field;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Accepted shape of a stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatFormat {
    /// Exactly 11 fields (Linux 2.6 through 4.17).
    #[default]
    Exact,
    /// At least 11 fields. Discard (4.18+) and flush (5.5+) counters that
    /// follow are ignored.
    Extended,
}

/// Raw values of one stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockStat {
    values: [u64; Field::COUNT],
}

impl BlockStat {
    pub fn new(values: [u64; Field::COUNT]) -> Self {
        Self { values }
    }

    /// Raw value of `field`.
    pub fn get(&self, field: Field) -> u64 {
        self.values[field.index()]
    }

    /// All values in line order.
    pub fn values(&self) -> &[u64; Field::COUNT] {
        &self.values
    }
}

/// Returns the line the parser looks at: the first one, leading whitespace stripped.
pub fn stat_line(content: &str) -> &str {
    content.lines().next().unwrap_or("").trim_start()
}

/// Parses the content of a `/sys/block/<device>/stat` file.
///
/// Format: read_ios read_merges read_sectors read_ticks write_ios write_merges
/// write_sectors write_ticks in_flight io_ticks time_in_queue
pub fn parse_block_stat(content: &str, format: StatFormat) -> Result<BlockStat, ParseError> {
    let parts: Vec<&str> = stat_line(content).split_whitespace().collect();

    let count_ok = match format {
        StatFormat::Exact => parts.len() == Field::COUNT,
        StatFormat::Extended => parts.len() >= Field::COUNT,
    };
    if !count_ok {
        return Err(ParseError::new(format!(
            "expected {} fields, found {}",
            Field::COUNT,
            parts.len()
        )));
    }

    let mut values = [0u64; Field::COUNT];
    for (i, slot) in values.iter_mut().enumerate() {
        *slot = parts[i].parse().map_err(|_| {
            ParseError::new(format!("invalid value {:?} for field {}", parts[i], i))
        })?;
    }

    Ok(BlockStat { values })
}

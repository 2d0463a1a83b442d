//! Reader for per-device statistics under `/sys/block`.

pub mod parser;

pub use parser::{BlockStat, ParseError, StatFormat, parse_block_stat};

use crate::collector::traits::FileSystem;
use std::io;
use std::path::{Path, PathBuf};

/// Default base directory of block device entries.
pub const DEFAULT_SYS_BLOCK_PATH: &str = "/sys/block";

/// Error type for per-device collection failures.
///
/// None of these are fatal: the device is skipped for the current cycle and
/// read again on the next one.
#[derive(Debug)]
pub enum CollectError {
    /// The stat file does not exist (device absent or detached).
    SourceUnavailable { path: PathBuf },
    /// The stat line does not have the expected shape.
    MalformedStatsLine {
        path: PathBuf,
        line: String,
        reason: String,
    },
    /// The stat file exists but could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl CollectError {
    /// Short label for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectError::SourceUnavailable { .. } => "source_unavailable",
            CollectError::MalformedStatsLine { .. } => "malformed_stats_line",
            CollectError::Io { .. } => "io",
        }
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::SourceUnavailable { path } => {
                write!(f, "path {} not found", path.display())
            }
            CollectError::MalformedStatsLine { path, line, reason } => {
                write!(
                    f,
                    "format of {} not recognized ({}): {}",
                    path.display(),
                    reason,
                    line
                )
            }
            CollectError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Path of the stat file for `device` under `base`.
pub fn stat_path(base: &Path, device: &str) -> PathBuf {
    base.join(device).join("stat")
}

/// Reads and parses the stat file of one device.
pub fn read_block_stat<F: FileSystem>(
    fs: &F,
    base: &Path,
    device: &str,
    format: StatFormat,
) -> Result<BlockStat, CollectError> {
    let path = stat_path(base, device);
    if !fs.exists(&path) {
        return Err(CollectError::SourceUnavailable { path });
    }

    let content = match fs.read_to_string(&path) {
        Ok(content) => content,
        // Removed between the existence check and the read.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CollectError::SourceUnavailable { path });
        }
        Err(source) => return Err(CollectError::Io { path, source }),
    };

    parse_block_stat(&content, format).map_err(|e| CollectError::MalformedStatsLine {
        line: parser::stat_line(&content).trim_end().to_string(),
        reason: e.message,
        path,
    })
}

/// Lists device names under `base`, sorted.
///
/// Only entries that carry a `stat` file are returned.
pub fn discover_devices<F: FileSystem>(fs: &F, base: &Path) -> io::Result<Vec<String>> {
    let mut devices: Vec<String> = fs
        .read_dir(base)?
        .into_iter()
        .filter(|entry| fs.exists(&entry.join("stat")))
        .filter_map(|entry| {
            entry
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .collect();
    devices.sort();
    Ok(devices)
}

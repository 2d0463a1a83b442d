//! blockstatd - block device I/O counter sampler.
//!
//! Reads `/sys/block/<device>/stat` for each configured device once per
//! interval and writes per-interval deltas to stdout, either as collectd
//! exec-plugin `PUTVAL` lines or as JSON lines. Logs go to stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use blockstat_core::collector::sysfs::{DEFAULT_SYS_BLOCK_PATH, discover_devices};
use blockstat_core::collector::{FileSystem, RealFs, StatFormat};
use blockstat_core::delta::CounterWidth;
use blockstat_core::output::{JsonLinesWriter, OutputSink, PutvalWriter};
use blockstat_core::processor::{Diagnostics, ProcessorConfig, ReadPlugin, SampleProcessor};

/// Block device I/O counter sampler.
#[derive(Parser, Debug)]
#[command(name = "blockstatd", about = "Block device I/O counter sampler", version)]
struct Args {
    /// Device to monitor (e.g. sda). May be repeated; duplicates are ignored.
    #[arg(short, long = "device", value_name = "NAME")]
    devices: Vec<String>,

    /// Monitor every device found under the sys-block path at startup.
    #[arg(long)]
    all_devices: bool,

    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Directory holding per-device stat files.
    #[arg(long, default_value = DEFAULT_SYS_BLOCK_PATH)]
    sys_block_path: PathBuf,

    /// Output record format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Putval)]
    format: OutputFormat,

    /// Host name used in record identifiers. Defaults to the kernel host name.
    #[arg(long)]
    hostname: Option<String>,

    /// Width at which raw counters wrap around.
    #[arg(long, value_enum, default_value_t = Width::W32)]
    counter_width: Width,

    /// Accept stat lines with discard/flush fields appended (Linux 4.18+).
    #[arg(long)]
    extended_stat_lines: bool,

    /// Stop after this many sampling cycles.
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Run a single sampling cycle, then exit. Same as `--cycles 1`.
    #[arg(long, conflicts_with = "cycles")]
    once: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// collectd exec plugin protocol.
    Putval,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Width {
    #[value(name = "32")]
    W32,
    #[value(name = "64")]
    W64,
}

impl From<Width> for CounterWidth {
    fn from(width: Width) -> Self {
        match width {
            Width::W32 => CounterWidth::U32,
            Width::W64 => CounterWidth::U64,
        }
    }
}

/// Initializes the tracing subscriber on stderr.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("blockstatd={level},blockstat_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Returns the kernel host name, falling back to "localhost".
fn resolve_hostname<F: FileSystem>(fs: &F) -> String {
    fs.read_to_string(Path::new("/proc/sys/kernel/hostname"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Collects configured device names, adding discovered ones if requested.
fn configured_devices<F: FileSystem>(fs: &F, args: &Args) -> Vec<String> {
    let mut devices = args.devices.clone();
    if args.all_devices {
        match discover_devices(fs, &args.sys_block_path) {
            Ok(found) => {
                info!(
                    "Discovered {} devices under {}",
                    found.len(),
                    args.sys_block_path.display()
                );
                devices.extend(found);
            }
            Err(e) => warn!(
                "Device discovery in {} failed: {}",
                args.sys_block_path.display(),
                e
            ),
        }
    }
    devices
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let fs = RealFs::new();
    let interval = Duration::from_secs(args.interval);
    let host = args
        .hostname
        .clone()
        .unwrap_or_else(|| resolve_hostname(&fs));

    info!("blockstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, sys_block_path={}, format={:?}, host={}",
        args.interval,
        args.sys_block_path.display(),
        args.format,
        host
    );

    let config = ProcessorConfig {
        sys_block_path: args.sys_block_path.clone(),
        stat_format: if args.extended_stat_lines {
            StatFormat::Extended
        } else {
            StatFormat::Exact
        },
        counter_width: args.counter_width.into(),
    };

    let devices = configured_devices(&fs, &args);
    let mut processor = SampleProcessor::new(fs).with_config(config);
    processor.configure(&devices);

    if processor.devices().is_empty() {
        warn!("No devices configured, cycles will emit nothing");
    } else {
        info!("Monitoring devices: {}", processor.devices().join(", "));
    }

    let stdout = io::stdout().lock();
    let mut sink: Box<dyn OutputSink> = match args.format {
        OutputFormat::Putval => Box::new(PutvalWriter::new(stdout, host, interval)),
        OutputFormat::Json => Box::new(JsonLinesWriter::new(stdout, host)),
    };

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");

    let limit = if args.once { Some(1) } else { args.cycles };
    match run(&mut processor, sink.as_mut(), interval, limit, &running) {
        Ok(cycles) => info!("Shutdown complete after {} cycles", cycles),
        Err(e) => {
            error!("Failed to write records: {}", e);
            std::process::exit(1);
        }
    }
}

/// Runs sampling cycles until `running` is cleared or `limit` cycles are done.
///
/// Returns the number of completed cycles. A sink error stops the loop.
fn run<F: FileSystem, D: Diagnostics>(
    processor: &mut SampleProcessor<F, D>,
    sink: &mut dyn OutputSink,
    interval: Duration,
    limit: Option<u64>,
    running: &AtomicBool,
) -> io::Result<u64> {
    let mut cycle_count: u64 = 0;
    while running.load(Ordering::SeqCst) {
        let summary = processor.read_cycle(sink)?;
        cycle_count += 1;
        debug!(
            "Cycle #{}: {} devices sampled, {} skipped, {} records in {:?}",
            cycle_count,
            summary.devices_sampled,
            summary.devices_failed,
            summary.records,
            summary.elapsed
        );

        if limit.is_some_and(|limit| cycle_count >= limit) {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }
    Ok(cycle_count)
}

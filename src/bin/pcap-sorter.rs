//! Sort the packets of PCAP/PCAPNG captures chronologically.
//!
//! # Usage
//!
//! ```bash
//! # Sort one file, tolerating packets up to 99 positions out of order
//! pcap-sorter -i capture.pcapng -o sorted.pcap -s 100
//!
//! # Sort every capture of a directory into out/sorted/, with 4 workers
//! pcap-sorter -i captures/ -o out/ -s 100 -j 4
//!
//! # Only check that the inputs can be read
//! pcap-sorter -i captures/ -o out/ -s 100 -d
//! ```
//!
//! The log level is selected with `-l` (0 = error .. 3 = debug); `RUST_LOG`
//! takes precedence when set.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use pcap_sorter::{run_batch, BatchConfig, DEFAULT_WORKERS, MAX_WORKERS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reorder the packets of PCAP/PCAPNG captures by timestamp")]
struct Args {
    /// Input capture file, or directory of .pcap/.pcapng files
    #[arg(short, long)]
    input: PathBuf,

    /// Output file, or directory (results are written to its sorted/ subdirectory)
    #[arg(short, long)]
    output: PathBuf,

    /// Sort window size, in packets
    #[arg(short = 's', long = "sort-window")]
    window: NonZeroUsize,

    /// Read inputs without writing any output
    #[arg(short, long, default_value_t = false)]
    dry_run: bool,

    /// Number of worker threads
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_WORKERS as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_WORKERS as i64)
    )]
    workers: u8,

    /// Log level: 0 = error, 1 = warn, 2 = info, 3 = debug
    #[arg(
        short = 'l',
        long,
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    log_level: u8,
}

fn level_filter(level: u8) -> &'static str {
    match level {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level_filter(args.log_level)),
    )
    .format_timestamp_millis()
    .init();

    let workers = match NonZeroUsize::new(usize::from(args.workers)) {
        Some(workers) => workers,
        None => {
            error!("worker count must be at least 1");
            return ExitCode::FAILURE;
        }
    };
    let config = BatchConfig {
        input: args.input,
        output: args.output,
        window: args.window,
        dry_run: args.dry_run,
        workers,
    };

    info!("=== pcap-sorter {} ===", env!("CARGO_PKG_VERSION"));
    info!("input:       {}", config.input.display());
    info!("output:      {}", config.output.display());
    info!("sort window: {}", config.window);
    info!("workers:     {}", config.workers);
    if config.dry_run {
        info!("dry run: no output will be written");
    }

    let start = Instant::now();
    match run_batch(&config) {
        Ok(report) => {
            info!(
                "=== done in {:.2?}: {} job(s), {} succeeded, {} failed ===",
                start.elapsed(),
                report.len(),
                report.succeeded(),
                report.failed()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

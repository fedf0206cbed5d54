//! Batch planning and execution
//!
//! A batch is either one input file converted to one output file, or every
//! capture file directly inside an input directory converted into the
//! `sorted/` subdirectory of an output directory.

use std::ffi::OsString;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::dispatch::JobDispatch;
use crate::error::BatchError;
use crate::job::ConversionJob;
use crate::pool::{BatchReport, WorkerPool};

/// Upper bound on the number of workers
pub const MAX_WORKERS: usize = 4;

pub const DEFAULT_WORKERS: usize = 2;

/// Subdirectory of the output directory receiving the converted files
pub const SORTED_DIR: &str = "sorted";

/// Extensions recognized as capture files, compared case-insensitively
const CAPTURE_EXTENSIONS: [&str; 2] = ["pcap", "pcapng"];

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Reorder window capacity, in packets
    pub window: NonZeroUsize,
    pub dry_run: bool,
    pub workers: NonZeroUsize,
}

/// True if `path` has a `.pcap` or `.pcapng` extension, in any case
pub fn is_capture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CAPTURE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Output path of `input` in directory mode: `<output_dir>/sorted/<stem>.pcap`
pub fn sorted_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".pcap");
    output_dir.join(SORTED_DIR).join(name)
}

/// Build the job list for `config`.
///
/// Both paths must be files or both directories. In directory mode the
/// `sorted/` subdirectory is created unless running dry, and non-capture
/// files are ignored.
pub fn plan_jobs(config: &BatchConfig) -> Result<Vec<ConversionJob>, BatchError> {
    let input_is_dir = config.input.is_dir();
    let output_is_dir = config.output.is_dir();
    match (input_is_dir, output_is_dir) {
        (false, false) => Ok(vec![planned(ConversionJob::new(
            &config.input,
            &config.output,
            config.window,
            config.dry_run,
        ))]),
        (true, true) => {
            let sorted = config.output.join(SORTED_DIR);
            if !config.dry_run {
                fs::create_dir_all(&sorted)?;
            }
            let mut jobs = Vec::new();
            for entry in WalkDir::new(&config.input)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if !is_capture_file(path) {
                    warn!("ignoring {}: not a capture file", path.display());
                    continue;
                }
                jobs.push(planned(ConversionJob::new(
                    path,
                    sorted_output_path(&config.output, path),
                    config.window,
                    config.dry_run,
                )));
            }
            Ok(jobs)
        }
        _ => Err(BatchError::MismatchedPathKinds {
            input: config.input.clone(),
            output: config.output.clone(),
        }),
    }
}

fn planned(job: ConversionJob) -> ConversionJob {
    info!("job created: {}", job);
    job
}

/// Plan, dispatch and run every job of the batch, blocking until all workers
/// have terminated
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let jobs = plan_jobs(config)?;
    if jobs.is_empty() {
        warn!("no capture file found in {}", config.input.display());
    }
    let dispatch = JobDispatch::new();
    let total = jobs.len();
    for job in jobs {
        dispatch.push(job)?;
    }
    let workers = config.workers.get().min(total.max(1));
    info!("starting {} worker(s) for {} job(s)", workers, total);
    let pool = WorkerPool::new(NonZeroUsize::new(workers).unwrap_or(config.workers));
    let report = pool.run(&dispatch)?;
    info!(
        "batch complete: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_extensions() {
        assert!(is_capture_file(Path::new("a.pcap")));
        assert!(is_capture_file(Path::new("dir/b.PCAPNG")));
        assert!(is_capture_file(Path::new("c.PcAp")));
        assert!(!is_capture_file(Path::new("d.txt")));
        assert!(!is_capture_file(Path::new("pcap")));
        assert!(!is_capture_file(Path::new("e.pcap.gz")));
    }

    #[test]
    fn output_name_replaces_extension() {
        let out = sorted_output_path(Path::new("/out"), Path::new("/in/trace.v2.pcapng"));
        assert_eq!(out, PathBuf::from("/out/sorted/trace.v2.pcap"));
        let out = sorted_output_path(Path::new("/out"), Path::new("/in/x.PCAP"));
        assert_eq!(out, PathBuf::from("/out/sorted/x.pcap"));
    }
}

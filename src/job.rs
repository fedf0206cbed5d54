use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::context::WorkerContext;
use crate::error::{JobError, PcapError};
use crate::reader::CaptureReader;
use crate::reorder::ReorderBuffer;
use crate::writer::CaptureWriter;

/// Conversion of one input capture into one sorted legacy capture
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConversionJob {
    input: PathBuf,
    output: PathBuf,
    window: NonZeroUsize,
    dry_run: bool,
}

/// Lifecycle of a job, logged at debug level
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum JobState {
    Created,
    /// Input decoded and output (if any) created
    Opened,
    Streaming,
    Draining,
    /// Both files released, on success or error
    Closed,
}

/// What a completed job did
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobSummary {
    pub packets_read: u64,
    /// Always 0 in dry-run mode
    pub packets_written: u64,
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packets read, {} written",
            self.packets_read, self.packets_written
        )
    }
}

impl fmt::Display for ConversionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (window {}{})",
            self.input.display(),
            self.output.display(),
            self.window,
            if self.dry_run { ", dry run" } else { "" }
        )
    }
}

impl ConversionJob {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(
        input: I,
        output: O,
        window: NonZeroUsize,
        dry_run: bool,
    ) -> Self {
        ConversionJob {
            input: input.into(),
            output: output.into(),
            window,
            dry_run,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn window(&self) -> NonZeroUsize {
        self.window
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Read, reorder and write the capture.
    ///
    /// In dry-run mode the output path is never touched: evicted and drained
    /// records are dropped, and the result depends only on the read side.
    /// Any error aborts the job; files are closed on every path.
    pub fn execute(self, ctx: &WorkerContext) -> Result<JobSummary, JobError> {
        let mut state = JobState::Created;
        info!(
            "{}: processing {} -> {}",
            ctx,
            self.input.display(),
            self.output.display()
        );
        let result = self.run(ctx, &mut state);
        self.enter(ctx, &mut state, JobState::Closed);
        result
    }

    fn enter(&self, ctx: &WorkerContext, state: &mut JobState, next: JobState) {
        debug!(
            "{}: {}: {:?} -> {:?}",
            ctx,
            self.input.display(),
            state,
            next
        );
        *state = next;
    }

    fn run(&self, ctx: &WorkerContext, state: &mut JobState) -> Result<JobSummary, JobError> {
        let mut reader =
            CaptureReader::open(&self.input, ctx).map_err(|source| JobError::OpenInput {
                path: self.input.clone(),
                source,
            })?;
        let mut writer = if self.dry_run {
            None
        } else {
            let mut writer = CaptureWriter::create(&self.output, reader.meta().big_endian)
                .map_err(|source| JobError::CreateOutput {
                    path: self.output.clone(),
                    source,
                })?;
            writer
                .write_header(reader.meta())
                .map_err(|source| self.write_error(source))?;
            Some(writer)
        };
        self.enter(ctx, state, JobState::Opened);

        let mut buffer = ReorderBuffer::new(self.window);
        self.enter(ctx, state, JobState::Streaming);
        loop {
            let record = match reader.next_packet() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(source) => {
                    return Err(JobError::Read {
                        path: self.input.clone(),
                        packets: reader.packets(),
                        source,
                    })
                }
            };
            if let Some(evicted) = buffer.insert(record) {
                if let Some(writer) = writer.as_mut() {
                    writer
                        .write_record(evicted)
                        .map_err(|source| self.write_error(source))?;
                }
            }
        }

        self.enter(ctx, state, JobState::Draining);
        let packets_written = match writer {
            Some(mut writer) => {
                for record in buffer.drain() {
                    writer
                        .write_record(record)
                        .map_err(|source| self.write_error(source))?;
                }
                let written = writer.packets();
                writer.finish().map_err(|source| self.write_error(source))?;
                written
            }
            None => 0,
        };

        Ok(JobSummary {
            packets_read: reader.packets(),
            packets_written,
        })
    }

    fn write_error(&self, source: PcapError) -> JobError {
        JobError::Write {
            path: self.output.clone(),
            source,
        }
    }
}

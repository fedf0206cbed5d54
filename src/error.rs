use std::path::PathBuf;

use cookie_factory::GenError;
use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

use crate::linktype::Linktype;

/// Errors raised while decoding or encoding a capture file
#[derive(Debug, Error)]
pub enum PcapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The input ended inside a header, block or payload
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// Leading magic (or section byte-order magic) is not a known capture format
    #[error("invalid magic number {0:#010x}")]
    InvalidMagic(u32),
    #[error("interface description block is missing")]
    MissingInterfaceDescription,
    #[error("unsupported link type {0} (only ETHERNET is supported)")]
    UnsupportedLinkType(Linktype),
    #[error("captured length {caplen} exceeds max snap length {snaplen}")]
    PacketTooLarge { caplen: u32, snaplen: u32 },
    /// A single block needs more memory than the reader is allowed to buffer
    #[error("block of {0} bytes exceeds the read buffer limit")]
    BufferTooSmall(usize),
    /// Block length fields disagree with the block contents
    #[error("malformed block of type {0:#x}")]
    MalformedBlock(u32),
    #[error("option runs past the end of its block")]
    TruncatedOption,
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("parse error: {0:?}")]
    NomError(ErrorKind),
}

impl<I> ParseError<I> for PcapError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        PcapError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        PcapError::NomError(kind)
    }
}

impl From<GenError> for PcapError {
    fn from(e: GenError) -> Self {
        match e {
            GenError::IoError(e) => PcapError::Io(e),
            other => PcapError::Serialize(format!("{:?}", other)),
        }
    }
}

/// Failure of a single conversion job. Never affects other jobs.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("cannot open input {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: PcapError,
    },
    #[error("cannot create output {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: PcapError,
    },
    #[error("read error in {path} after {packets} packets: {source}")]
    Read {
        path: PathBuf,
        packets: u64,
        #[source]
        source: PcapError,
    },
    #[error("write error in {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: PcapError,
    },
    #[error("job panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A participant failed while holding the dispatch lock; pending jobs are in an unknown state
    #[error("job dispatch is poisoned: a worker failed while holding the dispatch lock")]
    Poisoned,
    #[error("worker-{worker} terminated abnormally")]
    WorkerLost { worker: usize },
}

/// Errors detected before any job runs
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input {input} and output {output} must both be files or both be directories")]
    MismatchedPathKinds { input: PathBuf, output: PathBuf },
    #[error("cannot list input directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

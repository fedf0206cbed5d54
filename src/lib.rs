//! # PCAP and PCAPNG packet reorderer
//!
//! This crate reads captures in the legacy pcap or in the pcapng format, sorts
//! their packets chronologically within a bounded window, and writes them back
//! as legacy pcap files.
//!
//! The codec is built from nom parsers (one per header, frame and block type)
//! driven by a streaming reader on a circular buffer, and from cookie-factory
//! serializers on the write side. Both byte orders are supported, and the
//! output keeps the byte order of the input.
//!
//! Conversions are described by [`ConversionJob`]s, stacked in a shared
//! [`JobDispatch`] and executed by a fixed [`WorkerPool`]. A failure in one
//! job never affects the others.
//!
//! # Example: reordering a single file
//!
//! ```rust,no_run
//! use std::num::NonZeroUsize;
//! use pcap_sorter::{ConversionJob, WorkerContext};
//!
//! let window = NonZeroUsize::new(64).unwrap();
//! let job = ConversionJob::new("in.pcapng", "out.pcap", window, false);
//! match job.execute(&WorkerContext::new(1)) {
//!     Ok(summary) => println!("{}", summary),
//!     Err(e) => eprintln!("conversion failed: {}", e),
//! }
//! ```
//!
//! # Example: batch of files
//!
//! ```rust,no_run
//! use std::num::NonZeroUsize;
//! use pcap_sorter::{run_batch, BatchConfig};
//!
//! let config = BatchConfig {
//!     input: "captures/".into(),
//!     output: "out/".into(),
//!     window: NonZeroUsize::new(64).unwrap(),
//!     dry_run: false,
//!     workers: NonZeroUsize::new(2).unwrap(),
//! };
//! let report = run_batch(&config).expect("batch");
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! ```

mod endianness;
mod error;
mod linktype;
mod record;
mod utils;
pub use error::*;
pub use linktype::*;
pub use record::*;

pub mod pcap;
pub mod pcapng;
pub mod traits;

mod batch;
mod context;
mod dispatch;
mod job;
mod pool;
mod reader;
mod reorder;
mod writer;
pub use batch::*;
pub use context::*;
pub use dispatch::*;
pub use job::*;
pub use pool::*;
pub use reader::*;
pub use reorder::*;
pub use writer::*;

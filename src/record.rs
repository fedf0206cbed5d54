//! Normalized packet and capture descriptions shared by the reader, the reorder
//! buffer and the writer.

use crate::linktype::Linktype;

/// Microseconds per second
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Nanoseconds per second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Largest snap length accepted by libpcap; used when a PCAPNG interface declares no limit
pub const MAXIMUM_SNAPLEN: u32 = 262_144;

/// Container format detected from the leading magic
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureFormat {
    /// Fixed global header followed by fixed 16-byte record headers
    Legacy,
    /// Block-structured PCAPNG
    PcapNG,
}

/// Unit of the sub-second timestamp field
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeUnit {
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    /// Number of units in one second
    pub const fn units_per_sec(self) -> u64 {
        match self {
            TimeUnit::Microseconds => MICROS_PER_SEC,
            TimeUnit::Nanoseconds => NANOS_PER_SEC,
        }
    }
}

/// Per-file description, derived once when the input is opened
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptureMeta {
    pub format: CaptureFormat,
    /// Fields are stored big-endian (the byte-swapped magic variants)
    pub big_endian: bool,
    /// Timestamp resolution declared by the input
    pub time_unit: TimeUnit,
    /// Max length of captured packets, in octets
    pub snaplen: u32,
    /// The correction time in seconds between GMT (UTC) and the local timezone
    pub thiszone: i32,
    /// Timestamp accuracy (legacy header field, usually 0)
    pub sigfigs: u32,
    pub linktype: Linktype,
    pub version_major: u16,
    pub version_minor: u16,
}

impl CaptureMeta {
    /// Unit of the `ts_frac` field of records produced for this capture.
    ///
    /// Legacy nanosecond captures are normalized to microseconds on read; PCAPNG
    /// records keep the interface resolution.
    pub fn record_time_unit(&self) -> TimeUnit {
        match self.format {
            CaptureFormat::Legacy => TimeUnit::Microseconds,
            CaptureFormat::PcapNG => self.time_unit,
        }
    }
}

/// One captured packet, normalized from either container format.
///
/// The payload is owned: a record moves from the reader into the reorder
/// buffer and from there into the writer without being copied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketRecord {
    /// Timestamp, seconds part
    pub ts_sec: u32,
    /// Timestamp, fractional part in `CaptureMeta::record_time_unit` units
    pub ts_frac: u32,
    /// Length of the packet as it appeared on the network
    pub origlen: u32,
    /// Captured bytes
    pub data: Vec<u8>,
}

impl PacketRecord {
    /// Number of bytes actually captured
    #[inline]
    pub fn caplen(&self) -> u32 {
        self.data.len() as u32
    }

    /// Sort key, compared lexicographically
    #[inline]
    pub fn timestamp(&self) -> (u32, u32) {
        (self.ts_sec, self.ts_frac)
    }
}

use nom::number::streaming::le_u32;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::record::{CaptureFormat, CaptureMeta, TimeUnit};

/// Little-endian, microsecond timestamps
pub const PCAP_MAGIC_USEC: u32 = 0xa1b2_c3d4;
/// Little-endian, nanosecond timestamps
pub const PCAP_MAGIC_NSEC: u32 = 0xa1b2_3c4d;
/// Big-endian, microsecond timestamps
pub const PCAP_MAGIC_USEC_BE: u32 = 0xd4c3_b2a1;
/// Big-endian, nanosecond timestamps
pub const PCAP_MAGIC_NSEC_BE: u32 = 0x4d3c_b2a1;

/// PCAP global header
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcapHeader {
    /// File format and byte ordering, as read from a little-endian `u32`. If equal to
    /// `0xa1b2c3d4` or `0xa1b23c4d` the rest of the file is little-endian. If `0xd4c3b2a1`
    /// or `0x4d3cb2a1` (swapped), all following fields are big-endian.
    pub magic_number: u32,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the following packet header timestamps
    pub thiszone: i32,
    /// In theory, the accuracy of time stamps in the capture; in practice, all tools set it to 0
    pub sigfigs: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type
    pub network: Linktype,
}

impl PcapHeader {
    pub fn new() -> PcapHeader {
        PcapHeader {
            magic_number: PCAP_MAGIC_USEC,
            version_major: 2,
            version_minor: 4,
            thiszone: 0,
            sigfigs: 0,
            snaplen: 0,
            network: Linktype::ETHERNET,
        }
    }

    /// Build the output header for a capture described by `meta`.
    ///
    /// Version is always 2.4. The magic follows `big_endian` and the unit of the
    /// records that will be written.
    pub fn from_meta(meta: &CaptureMeta, big_endian: bool) -> PcapHeader {
        let magic_number = match (big_endian, meta.record_time_unit()) {
            (false, TimeUnit::Microseconds) => PCAP_MAGIC_USEC,
            (false, TimeUnit::Nanoseconds) => PCAP_MAGIC_NSEC,
            (true, TimeUnit::Microseconds) => PCAP_MAGIC_USEC_BE,
            (true, TimeUnit::Nanoseconds) => PCAP_MAGIC_NSEC_BE,
        };
        PcapHeader {
            magic_number,
            thiszone: meta.thiszone,
            sigfigs: meta.sigfigs,
            snaplen: meta.snaplen,
            network: meta.linktype,
            ..PcapHeader::new()
        }
    }

    pub fn is_bigendian(&self) -> bool {
        (self.magic_number & 0xFFFF) == 0xb2a1 // works for both nanosecond and microsecond resolution timestamps
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.magic_number == PCAP_MAGIC_NSEC || self.magic_number == PCAP_MAGIC_NSEC_BE
    }

    /// Describe the capture this header opens
    pub fn meta(&self) -> CaptureMeta {
        CaptureMeta {
            format: CaptureFormat::Legacy,
            big_endian: self.is_bigendian(),
            time_unit: if self.is_nanosecond_precision() {
                TimeUnit::Nanoseconds
            } else {
                TimeUnit::Microseconds
            },
            snaplen: self.snaplen,
            thiszone: self.thiszone,
            sigfigs: self.sigfigs,
            linktype: self.network,
            version_major: self.version_major,
            version_minor: self.version_minor,
        }
    }
}

impl Default for PcapHeader {
    fn default() -> Self {
        PcapHeader::new()
    }
}

fn parse_header_fields<En: PcapEndianness>(
    magic_number: u32,
    i: &[u8],
) -> IResult<&[u8], PcapHeader, PcapError> {
    let (i, version_major) = En::parse_u16(i)?;
    let (i, version_minor) = En::parse_u16(i)?;
    let (i, thiszone) = En::parse_i32(i)?;
    let (i, sigfigs) = En::parse_u32(i)?;
    let (i, snaplen) = En::parse_u32(i)?;
    let (i, network) = En::parse_i32(i)?;
    let header = PcapHeader {
        magic_number,
        version_major,
        version_minor,
        thiszone,
        sigfigs,
        snaplen,
        network: Linktype(network),
    };
    Ok((i, header))
}

/// Read the PCAP global header
///
/// Any magic other than the four legacy values is rejected with
/// `PcapError::InvalidMagic`.
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader, PcapError> {
    let (i, magic_number) = le_u32(i)?;
    match magic_number {
        PCAP_MAGIC_USEC | PCAP_MAGIC_NSEC => parse_header_fields::<PcapLE>(magic_number, i),
        PCAP_MAGIC_USEC_BE | PCAP_MAGIC_NSEC_BE => parse_header_fields::<PcapBE>(magic_number, i),
        _ => Err(nom::Err::Error(PcapError::InvalidMagic(magic_number))),
    }
}

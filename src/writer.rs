use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cookie_factory::bytes::{be_i32, be_u16, be_u32, le_i32, le_u16, le_u32};
use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen, SerializeFn};

use crate::error::PcapError;
use crate::pcap::PcapHeader;
use crate::record::{CaptureMeta, PacketRecord};

// The magic is always written as a little-endian u32: the header stores it as
// read from a little-endian u32, so the byte pattern follows the byte order.
fn pcap_header_le<W: Write>(h: &PcapHeader) -> impl SerializeFn<W> {
    tuple((
        le_u32(h.magic_number),
        le_u16(h.version_major),
        le_u16(h.version_minor),
        le_i32(h.thiszone),
        le_u32(h.sigfigs),
        le_u32(h.snaplen),
        le_i32(h.network.0),
    ))
}

fn pcap_header_be<W: Write>(h: &PcapHeader) -> impl SerializeFn<W> {
    tuple((
        le_u32(h.magic_number),
        be_u16(h.version_major),
        be_u16(h.version_minor),
        be_i32(h.thiszone),
        be_u32(h.sigfigs),
        be_u32(h.snaplen),
        be_i32(h.network.0),
    ))
}

// pcap records have no alignment constraints
fn pcap_record_le<'a, W: Write + 'a>(r: &'a PacketRecord) -> impl SerializeFn<W> + 'a {
    tuple((
        le_u32(r.ts_sec),
        le_u32(r.ts_frac),
        le_u32(r.caplen()),
        le_u32(r.origlen),
        slice(&r.data),
    ))
}

fn pcap_record_be<'a, W: Write + 'a>(r: &'a PacketRecord) -> impl SerializeFn<W> + 'a {
    tuple((
        be_u32(r.ts_sec),
        be_u32(r.ts_frac),
        be_u32(r.caplen()),
        be_u32(r.origlen),
        slice(&r.data),
    ))
}

/// Legacy PCAP writer
///
/// Emits a version 2.4 global header then one record per call, in call order.
/// Every multi-byte field is written in the byte order chosen at creation.
pub struct CaptureWriter<W: Write> {
    writer: W,
    big_endian: bool,
    packets: u64,
}

impl CaptureWriter<BufWriter<File>> {
    /// Create (or truncate) the output file
    pub fn create<P: AsRef<Path>>(path: P, big_endian: bool) -> Result<Self, PcapError> {
        let file = File::create(path.as_ref())?;
        Ok(CaptureWriter::new(BufWriter::new(file), big_endian))
    }
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(writer: W, big_endian: bool) -> Self {
        CaptureWriter {
            writer,
            big_endian,
            packets: 0,
        }
    }

    /// Write the global header for a capture described by `meta`.
    ///
    /// Time zone, accuracy, snap length and link type are carried over.
    pub fn write_header(&mut self, meta: &CaptureMeta) -> Result<(), PcapError> {
        let header = PcapHeader::from_meta(meta, self.big_endian);
        if self.big_endian {
            gen(pcap_header_be(&header), &mut self.writer)?;
        } else {
            gen(pcap_header_le(&header), &mut self.writer)?;
        }
        Ok(())
    }

    /// Append one record
    pub fn write_record(&mut self, record: PacketRecord) -> Result<(), PcapError> {
        if self.big_endian {
            gen(pcap_record_be(&record), &mut self.writer)?;
        } else {
            gen(pcap_record_le(&record), &mut self.writer)?;
        }
        self.packets += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn packets(&self) -> u64 {
        self.packets
    }

    /// Flush buffered output and return the underlying writer
    pub fn finish(mut self) -> Result<W, PcapError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::pcap::parse_pcap_header;

    const HEADER_BE: &[u8] = &hex!(
        "
A1 B2 C3 D4 00 02 00 04 00 00 0E 10 00 00 00 00
00 00 FF FF 00 00 00 01"
    );

    #[test]
    fn big_endian_header_is_reproduced() {
        let (_, hdr) = parse_pcap_header(HEADER_BE).expect("header parsing failed");
        let mut writer = CaptureWriter::new(Vec::new(), hdr.is_bigendian());
        writer.write_header(&hdr.meta()).expect("write header");
        let out = writer.finish().expect("flush");
        assert_eq!(out, HEADER_BE);
    }

    #[test]
    fn record_layout() {
        let (_, hdr) = parse_pcap_header(HEADER_BE).expect("header parsing failed");
        let mut writer = CaptureWriter::new(Vec::new(), false);
        writer.write_header(&hdr.meta()).expect("write header");
        writer
            .write_record(PacketRecord {
                ts_sec: 0x0102_0304,
                ts_frac: 5,
                origlen: 60,
                data: vec![0xaa, 0xbb],
            })
            .expect("write record");
        assert_eq!(writer.packets(), 1);
        let out = writer.finish().expect("flush");
        assert_eq!(&out[..4], &hex!("D4 C3 B2 A1"));
        assert_eq!(&out[8..12], &hex!("10 0E 00 00"));
        assert_eq!(
            &out[24..],
            &hex!("04 03 02 01 05 00 00 00 02 00 00 00 3C 00 00 00 AA BB")
        );
    }
}

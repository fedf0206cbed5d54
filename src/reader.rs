//! Streaming capture reader
//!
//! [`CaptureReader`] detects the container format from the leading magic,
//! decodes the headers once, then yields one normalized [`PacketRecord`] per
//! call to [`CaptureReader::next_packet`].
//!
//! The reader is a streaming parser based on a circular buffer, so memory usage
//! is bounded by the largest block rather than by the file size. The buffer
//! starts at [`DEFAULT_BUFFER_SIZE`] and grows when a single block does not
//! fit, up to a hard limit.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use circular::Buffer;
use log::{debug, info, warn};
use nom::combinator::map;
use nom::number::streaming::le_u32;
use nom::{IResult, Needed, Offset};

use crate::context::WorkerContext;
use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::pcap::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header};
use crate::pcapng::{
    build_ts, parse_block, parse_sectionheaderblock, time_unit_from_tsresol, Block, OptionCode,
    PcapNGOptions, SHB_MAGIC,
};
use crate::record::{CaptureFormat, CaptureMeta, PacketRecord, TimeUnit, MAXIMUM_SNAPLEN};
use crate::traits::PcapNGPacketBlock;

/// Initial capacity of the read buffer
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Hard limit on the buffer size: a single block larger than this is rejected
const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Circular buffer over a `Read`, feeding complete blocks to nom parsers
struct BlockStream<R> {
    reader: R,
    buffer: Buffer,
    reader_exhausted: bool,
    /// Total bytes consumed since the start of the input
    consumed: u64,
    max_capacity: usize,
}

impl<R: Read> BlockStream<R> {
    fn new(reader: R, capacity: usize) -> Self {
        BlockStream {
            reader,
            buffer: Buffer::with_capacity(capacity),
            reader_exhausted: false,
            consumed: 0,
            max_capacity: MAX_BUFFER_SIZE.max(capacity),
        }
    }

    fn refill(&mut self) -> Result<(), PcapError> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = loop {
            match self.reader.read(space) {
                Ok(sz) => break sz,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }

    /// Make sure `needed` more bytes fit after the buffered data
    fn make_room(&mut self, needed: usize) -> Result<(), PcapError> {
        let wanted = self.buffer.available_data().saturating_add(needed);
        if wanted <= self.buffer.capacity() {
            return Ok(());
        }
        if wanted > self.max_capacity {
            return Err(PcapError::BufferTooSmall(wanted));
        }
        self.buffer.grow(wanted.next_power_of_two().min(self.max_capacity));
        Ok(())
    }

    /// Run `parse` on the buffered bytes, reading more until it completes.
    ///
    /// Returns `Ok(None)` on a clean end of input (no pending bytes), and
    /// `PcapError::UnexpectedEof` if the input ends inside an element.
    fn parse_next<T, F>(&mut self, mut parse: F) -> Result<Option<T>, PcapError>
    where
        F: FnMut(&[u8]) -> IResult<&[u8], T, PcapError>,
    {
        loop {
            let data = self.buffer.data();
            match parse(data) {
                Ok((rem, value)) => {
                    let offset = data.offset(rem);
                    self.buffer.consume(offset);
                    self.consumed += offset as u64;
                    return Ok(Some(value));
                }
                Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(e),
                Err(nom::Err::Incomplete(needed)) => {
                    if self.reader_exhausted {
                        return if self.buffer.available_data() == 0 {
                            Ok(None)
                        } else {
                            Err(PcapError::UnexpectedEof)
                        };
                    }
                    let needed = match needed {
                        Needed::Size(n) => n.get(),
                        Needed::Unknown => 1,
                    };
                    self.make_room(needed)?;
                    self.refill()?;
                }
            }
        }
    }
}

/// Owned copy of the interface fields needed after the block is consumed
struct InterfaceInfo {
    linktype: Linktype,
    snaplen: u32,
    options: Vec<u8>,
}

/// Outcome of decoding one PCAPNG block while streaming
enum NgItem {
    Packet(PacketRecord),
    Skipped { kind: &'static str, block_type: u32, block_len: u32 },
    /// A new section starts; its blocks use the given byte order
    Section { big_endian: bool, block_len: u32 },
}

struct Progress {
    total: u64,
    /// Last reported decile
    reported: u64,
}

/// Pull reader yielding normalized packet records from a legacy PCAP or a PCAPNG input
///
/// ## Example
///
/// ```rust,no_run
/// use pcap_sorter::{CaptureReader, WorkerContext};
///
/// let ctx = WorkerContext::new(0);
/// let mut reader = CaptureReader::open("capture.pcapng", &ctx).expect("open");
/// println!("{:?}", reader.meta());
/// while let Some(record) = reader.next_packet().expect("read") {
///     println!("{}.{} {} bytes", record.ts_sec, record.ts_frac, record.caplen());
/// }
/// ```
pub struct CaptureReader<R> {
    stream: BlockStream<R>,
    meta: CaptureMeta,
    ctx: WorkerContext,
    progress: Option<Progress>,
    packets: u64,
    finished: bool,
    /// Byte order of the pcapng section being read
    section_big_endian: bool,
}

impl CaptureReader<File> {
    /// Open a capture file and decode its headers.
    ///
    /// Read progress is logged every 10% of the file size.
    pub fn open<P: AsRef<Path>>(path: P, ctx: &WorkerContext) -> Result<Self, PcapError> {
        let file = File::open(path.as_ref())?;
        let total = file.metadata()?.len();
        let mut reader = CaptureReader::new(file, ctx)?;
        reader.progress = Some(Progress { total, reported: 0 });
        Ok(reader)
    }
}

impl<R: Read> CaptureReader<R> {
    /// Decode the headers of a capture read from `reader`.
    ///
    /// Fails with `InvalidMagic`, `MissingInterfaceDescription` or
    /// `UnsupportedLinkType` if the input cannot be streamed.
    pub fn new(reader: R, ctx: &WorkerContext) -> Result<Self, PcapError> {
        let mut stream = BlockStream::new(reader, DEFAULT_BUFFER_SIZE);
        let meta = read_meta(&mut stream, ctx)?;
        debug!(
            "{}: {:?} capture, big_endian={}, {:?}, snaplen {}, linktype {}",
            ctx, meta.format, meta.big_endian, meta.time_unit, meta.snaplen, meta.linktype
        );
        let section_big_endian = meta.big_endian;
        Ok(CaptureReader {
            stream,
            meta,
            ctx: ctx.clone(),
            progress: None,
            packets: 0,
            finished: false,
            section_big_endian,
        })
    }

    /// Per-file description decoded at open time
    pub fn meta(&self) -> &CaptureMeta {
        &self.meta
    }

    /// Number of packets returned so far
    pub fn packets(&self) -> u64 {
        self.packets
    }

    /// Number of input bytes consumed so far
    pub fn bytes_consumed(&self) -> u64 {
        self.stream.consumed
    }

    /// Read the next packet, or `None` at the end of the stream.
    ///
    /// A packet larger than the snap length, or an input ending inside a
    /// packet, is an error. Unexpected PCAPNG blocks are logged and skipped.
    pub fn next_packet(&mut self) -> Result<Option<PacketRecord>, PcapError> {
        if self.finished {
            return Ok(None);
        }
        let record = match self.meta.format {
            CaptureFormat::Legacy => self.next_legacy()?,
            CaptureFormat::PcapNG => self.next_pcapng()?,
        };
        match record {
            Some(record) => {
                self.packets += 1;
                debug!(
                    "{}: packet {} ts {}.{} caplen {} origlen {}",
                    self.ctx,
                    self.packets,
                    record.ts_sec,
                    record.ts_frac,
                    record.caplen(),
                    record.origlen
                );
                self.report_progress();
                Ok(Some(record))
            }
            None => {
                self.finished = true;
                info!("{}: read progress 100% ({} packets)", self.ctx, self.packets);
                Ok(None)
            }
        }
    }

    fn next_legacy(&mut self) -> Result<Option<PacketRecord>, PcapError> {
        let snaplen = self.meta.snaplen;
        let big_endian = self.meta.big_endian;
        // nanoseconds are reduced to microseconds
        let divisor = match self.meta.time_unit {
            TimeUnit::Microseconds => 1,
            TimeUnit::Nanoseconds => 1000,
        };
        self.stream.parse_next(|i| {
            let (rem, frame) = if big_endian {
                parse_pcap_frame_be(i, snaplen)?
            } else {
                parse_pcap_frame(i, snaplen)?
            };
            let record = PacketRecord {
                ts_sec: frame.ts_sec,
                ts_frac: frame.ts_frac / divisor,
                origlen: frame.origlen,
                data: frame.data.to_vec(),
            };
            Ok((rem, record))
        })
    }

    fn next_pcapng(&mut self) -> Result<Option<PacketRecord>, PcapError> {
        let snaplen = self.meta.snaplen;
        let big_endian = self.section_big_endian;
        let unit = self.meta.time_unit;
        loop {
            let item = self.stream.parse_next(|i| {
                let (rem, block) = parse_stream_block(i, big_endian)?;
                let item = match block {
                    Block::EnhancedPacket(b) => NgItem::Packet(ng_packet_record(&b, unit, snaplen)?),
                    Block::SimplePacket(b) => NgItem::Packet(ng_packet_record(&b, unit, snaplen)?),
                    Block::Packet(b) => NgItem::Packet(ng_packet_record(&b, unit, snaplen)?),
                    Block::SectionHeader(b) => NgItem::Section {
                        big_endian: b.big_endian(),
                        block_len: b.block_len1,
                    },
                    other => NgItem::Skipped {
                        kind: match other {
                            Block::InterfaceDescription(_) => "interface description",
                            _ => "unknown",
                        },
                        block_type: other.magic(),
                        block_len: other.block_len(),
                    },
                };
                Ok((rem, item))
            })?;
            match item {
                Some(NgItem::Packet(record)) => return Ok(Some(record)),
                Some(NgItem::Skipped {
                    kind,
                    block_type,
                    block_len,
                }) => {
                    warn!(
                        "{}: unexpected {} block (type {:#x}, {} bytes) after packet {}, skipped",
                        self.ctx, kind, block_type, block_len, self.packets
                    );
                }
                Some(NgItem::Section {
                    big_endian,
                    block_len,
                }) => {
                    warn!(
                        "{}: unexpected section header block ({} bytes, big_endian={}) after packet {}, skipped",
                        self.ctx, block_len, big_endian, self.packets
                    );
                    self.section_big_endian = big_endian;
                }
                None => return Ok(None),
            }
        }
    }

    fn report_progress(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            if progress.total == 0 {
                return;
            }
            let decile = self.stream.consumed.saturating_mul(10) / progress.total;
            if decile > progress.reported && decile < 10 {
                progress.reported = decile;
                info!("{}: read progress {}%", self.ctx, decile * 10);
            }
        }
    }
}

/// Parse the next pcapng block of a section.
///
/// A Section Header carries its own byte order mark, so it is decoded with the
/// order it declares rather than the one of the current section.
fn parse_stream_block(i: &[u8], big_endian: bool) -> IResult<&[u8], Block, PcapError> {
    let (_, block_type) = le_u32(i)?;
    if block_type == SHB_MAGIC {
        map(parse_sectionheaderblock, Block::SectionHeader)(i)
    } else {
        parse_block(i, big_endian)
    }
}

fn ng_packet_record<B: PcapNGPacketBlock>(
    block: &B,
    unit: TimeUnit,
    snaplen: u32,
) -> Result<PacketRecord, nom::Err<PcapError>> {
    let caplen = block.captured_len();
    if caplen > snaplen {
        return Err(nom::Err::Failure(PcapError::PacketTooLarge { caplen, snaplen }));
    }
    let (ts_sec, ts_frac) = match block.timestamp() {
        Some((ts_high, ts_low)) => build_ts(ts_high, ts_low, unit),
        None => (0, 0),
    };
    Ok(PacketRecord {
        ts_sec,
        ts_frac,
        origlen: block.orig_len(),
        data: block.packet_data().to_vec(),
    })
}

fn read_meta<R: Read>(
    stream: &mut BlockStream<R>,
    ctx: &WorkerContext,
) -> Result<CaptureMeta, PcapError> {
    // peek, do not consume
    let magic = stream
        .parse_next(|i| {
            let (_, magic) = le_u32(i)?;
            Ok((i, magic))
        })?
        .ok_or(PcapError::UnexpectedEof)?;
    if magic == SHB_MAGIC {
        read_pcapng_meta(stream, ctx)
    } else {
        let header = stream
            .parse_next(parse_pcap_header)?
            .ok_or(PcapError::UnexpectedEof)?;
        Ok(header.meta())
    }
}

fn read_pcapng_meta<R: Read>(
    stream: &mut BlockStream<R>,
    ctx: &WorkerContext,
) -> Result<CaptureMeta, PcapError> {
    let (big_endian, version_major, version_minor) = stream
        .parse_next(|i| {
            let (rem, shb) = parse_sectionheaderblock(i)?;
            Ok((rem, (shb.big_endian(), shb.major_version, shb.minor_version)))
        })?
        .ok_or(PcapError::UnexpectedEof)?;
    let idb = stream
        .parse_next(|i| {
            let (rem, block) = parse_block(i, big_endian)?;
            match block {
                Block::InterfaceDescription(idb) => Ok((
                    rem,
                    InterfaceInfo {
                        linktype: idb.linktype,
                        snaplen: idb.snaplen,
                        options: idb.options.to_vec(),
                    },
                )),
                _ => Err(nom::Err::Failure(PcapError::MissingInterfaceDescription)),
            }
        })?
        .ok_or(PcapError::MissingInterfaceDescription)?;
    if idb.linktype != Linktype::ETHERNET {
        return Err(PcapError::UnsupportedLinkType(idb.linktype));
    }

    let mut time_unit = TimeUnit::Microseconds;
    let mut thiszone = 0;
    for option in PcapNGOptions::new(&idb.options, big_endian) {
        let option = match option {
            Ok(option) => option,
            Err(e) => {
                warn!("{}: interface options: {}, remaining options ignored", ctx, e);
                break;
            }
        };
        match option.code {
            OptionCode::IfTsresol => {
                time_unit = match option.as_u8() {
                    Some(resol) if resol & 0x80 != 0 => {
                        warn!(
                            "{}: power-of-two time resolution {:#x} not supported, assuming microseconds",
                            ctx, resol
                        );
                        TimeUnit::Microseconds
                    }
                    Some(resol) => time_unit_from_tsresol(resol).unwrap_or_else(|| {
                        warn!(
                            "{}: unsupported time resolution 10^-{}, assuming microseconds",
                            ctx, resol
                        );
                        TimeUnit::Microseconds
                    }),
                    None => {
                        warn!("{}: empty if_tsresol option, assuming microseconds", ctx);
                        TimeUnit::Microseconds
                    }
                };
            }
            OptionCode::IfTzone => match option.as_i32() {
                Some(zone) => thiszone = zone,
                None => warn!("{}: invalid if_tzone option length {}, ignored", ctx, option.len),
            },
            code => debug!("{}: skipping interface option {}", ctx, code),
        }
    }

    // 0 means no limit
    let snaplen = if idb.snaplen == 0 {
        MAXIMUM_SNAPLEN
    } else {
        idb.snaplen
    };
    Ok(CaptureMeta {
        format: CaptureFormat::PcapNG,
        big_endian,
        time_unit,
        snaplen,
        thiszone,
        sigfigs: 0,
        linktype: idb.linktype,
        version_major,
        version_minor,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use hex_literal::hex;

    use super::*;

    /// Reader handing out at most 3 bytes per call
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len()).min(3);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    const LEGACY: &[u8] = &hex!(
        "
D4 C3 B2 A1 02 00 04 00 00 00 00 00 00 00 00 00
FF FF 00 00 01 00 00 00
01 00 00 00 02 00 00 00 02 00 00 00 02 00 00 00 AA BB
03 00 00 00 04 00 00 00 01 00 00 00 40 00 00 00 CC"
    );

    #[test]
    fn legacy_packets_across_short_reads() {
        let ctx = WorkerContext::new(0);
        let mut reader = CaptureReader::new(Trickle(LEGACY), &ctx).expect("open failed");
        assert_eq!(reader.meta().format, CaptureFormat::Legacy);
        let p1 = reader.next_packet().expect("read").expect("packet 1");
        assert_eq!(p1.timestamp(), (1, 2));
        assert_eq!(p1.data, hex!("AA BB"));
        let p2 = reader.next_packet().expect("read").expect("packet 2");
        assert_eq!(p2.timestamp(), (3, 4));
        assert_eq!(p2.origlen, 64);
        assert!(reader.next_packet().expect("read").is_none());
        assert!(reader.next_packet().expect("read").is_none());
        assert_eq!(reader.packets(), 2);
        assert_eq!(reader.bytes_consumed(), LEGACY.len() as u64);
    }

    #[test]
    fn legacy_truncated_payload() {
        let ctx = WorkerContext::new(0);
        let data = &LEGACY[..LEGACY.len() - 1];
        let mut reader = CaptureReader::new(Cursor::new(data), &ctx).expect("open failed");
        assert!(reader.next_packet().expect("read").is_some());
        assert!(matches!(reader.next_packet(), Err(PcapError::UnexpectedEof)));
    }

    #[test]
    fn empty_input() {
        let ctx = WorkerContext::new(0);
        assert!(matches!(
            CaptureReader::new(Cursor::new(Vec::<u8>::new()), &ctx),
            Err(PcapError::UnexpectedEof)
        ));
    }

    #[test]
    fn block_larger_than_initial_buffer() {
        let ctx = WorkerContext::new(0);
        let payload = vec![0x5a; 100_000];
        let mut data = LEGACY[..24].to_vec();
        // snaplen 0x000f0000
        data[16..20].copy_from_slice(&hex!("00 00 0F 00"));
        data.extend_from_slice(&hex!("01 00 00 00 00 00 00 00 A0 86 01 00 A0 86 01 00"));
        data.extend_from_slice(&payload);
        let mut reader = CaptureReader::new(Cursor::new(data), &ctx).expect("open failed");
        let p = reader.next_packet().expect("read").expect("packet");
        assert_eq!(p.data, payload);
    }
}

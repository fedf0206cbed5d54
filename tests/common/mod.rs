#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::num::NonZeroUsize;

use pcap_sorter::{
    CaptureMeta, CaptureReader, ConversionJob, JobError, JobSummary, PacketRecord, PcapError,
    WorkerContext,
};

pub const LINKTYPE_ETHERNET: u16 = 1;
pub const IF_TSRESOL: u16 = 9;

/// One packet of a legacy capture: `(ts_sec, ts_frac, origlen, data)`
pub type LegacyPacket<'a> = (u32, u32, u32, &'a [u8]);

fn put_u16(out: &mut Vec<u8>, big_endian: bool, v: u16) {
    if big_endian {
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_u32(out: &mut Vec<u8>, big_endian: bool, v: u32) {
    if big_endian {
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Build a legacy capture (version 2.4, ethernet)
pub fn legacy_capture(
    big_endian: bool,
    nanosecond: bool,
    snaplen: u32,
    packets: &[LegacyPacket],
) -> Vec<u8> {
    let mut out = Vec::new();
    let magic = if nanosecond { 0xa1b2_3c4d } else { 0xa1b2_c3d4 };
    put_u32(&mut out, big_endian, magic);
    put_u16(&mut out, big_endian, 2);
    put_u16(&mut out, big_endian, 4);
    put_u32(&mut out, big_endian, 0);
    put_u32(&mut out, big_endian, 0);
    put_u32(&mut out, big_endian, snaplen);
    put_u32(&mut out, big_endian, u32::from(LINKTYPE_ETHERNET));
    for &(ts_sec, ts_frac, origlen, data) in packets {
        put_u32(&mut out, big_endian, ts_sec);
        put_u32(&mut out, big_endian, ts_frac);
        put_u32(&mut out, big_endian, data.len() as u32);
        put_u32(&mut out, big_endian, origlen);
        out.extend_from_slice(data);
    }
    out
}

/// Incremental PCAPNG capture builder, starting with a Section Header Block
pub struct NgCapture {
    big_endian: bool,
    bytes: Vec<u8>,
}

impl NgCapture {
    pub fn new(big_endian: bool) -> Self {
        let mut capture = NgCapture {
            big_endian,
            bytes: Vec::new(),
        };
        let mut body = Vec::new();
        put_u32(&mut body, big_endian, 0x1A2B_3C4D);
        put_u16(&mut body, big_endian, 1);
        put_u16(&mut body, big_endian, 0);
        body.extend_from_slice(&[0xff; 8]);
        capture.block(0x0A0D_0D0A, &body)
    }

    /// Append a block, computing both length fields
    pub fn block(mut self, block_type: u32, body: &[u8]) -> Self {
        let mut body = body.to_vec();
        pad4(&mut body);
        let len = body.len() as u32 + 12;
        put_u32(&mut self.bytes, self.big_endian, block_type);
        put_u32(&mut self.bytes, self.big_endian, len);
        self.bytes.extend_from_slice(&body);
        put_u32(&mut self.bytes, self.big_endian, len);
        self
    }

    fn options(&self, options: &[(u16, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        if options.is_empty() {
            return out;
        }
        for &(code, value) in options {
            put_u16(&mut out, self.big_endian, code);
            put_u16(&mut out, self.big_endian, value.len() as u16);
            out.extend_from_slice(value);
            pad4(&mut out);
        }
        // opt_endofopt
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    pub fn idb(self, linktype: u16, snaplen: u32, options: &[(u16, &[u8])]) -> Self {
        let mut body = Vec::new();
        put_u16(&mut body, self.big_endian, linktype);
        put_u16(&mut body, self.big_endian, 0);
        put_u32(&mut body, self.big_endian, snaplen);
        body.extend(self.options(options));
        self.block(1, &body)
    }

    /// Enhanced Packet Block with a 64-bit timestamp in interface units
    pub fn epb(self, ts: u64, origlen: u32, data: &[u8]) -> Self {
        let mut body = Vec::new();
        put_u32(&mut body, self.big_endian, 0);
        put_u32(&mut body, self.big_endian, (ts >> 32) as u32);
        put_u32(&mut body, self.big_endian, ts as u32);
        put_u32(&mut body, self.big_endian, data.len() as u32);
        put_u32(&mut body, self.big_endian, origlen);
        body.extend_from_slice(data);
        self.block(6, &body)
    }

    pub fn spb(self, origlen: u32, data: &[u8]) -> Self {
        let mut body = Vec::new();
        put_u32(&mut body, self.big_endian, origlen);
        body.extend_from_slice(data);
        self.block(3, &body)
    }

    /// Obsolete Packet Block
    pub fn pb(self, ts: u64, origlen: u32, data: &[u8]) -> Self {
        let mut body = Vec::new();
        put_u16(&mut body, self.big_endian, 0);
        put_u16(&mut body, self.big_endian, 0);
        put_u32(&mut body, self.big_endian, (ts >> 32) as u32);
        put_u32(&mut body, self.big_endian, ts as u32);
        put_u32(&mut body, self.big_endian, data.len() as u32);
        put_u32(&mut body, self.big_endian, origlen);
        body.extend_from_slice(data);
        self.block(2, &body)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decode a whole capture held in memory
pub fn read_all(bytes: &[u8]) -> Result<(CaptureMeta, Vec<PacketRecord>), PcapError> {
    let ctx = WorkerContext::new(0);
    let mut reader = CaptureReader::new(Cursor::new(bytes), &ctx)?;
    let mut records = Vec::new();
    while let Some(record) = reader.next_packet()? {
        records.push(record);
    }
    Ok((reader.meta().clone(), records))
}

pub fn timestamps(records: &[PacketRecord]) -> Vec<(u32, u32)> {
    records.iter().map(PacketRecord::timestamp).collect()
}

pub fn window(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

/// Run a conversion job on `input` through temporary files, returning the
/// job result and the output bytes (empty if no output was created)
pub fn convert(input: &[u8], window_size: usize) -> (Result<JobSummary, JobError>, Vec<u8>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let in_path = dir.path().join("in.pcap");
    let out_path = dir.path().join("out.pcap");
    fs::write(&in_path, input).expect("write input");
    let job = ConversionJob::new(&in_path, &out_path, window(window_size), false);
    let result = job.execute(&WorkerContext::new(1));
    let output = fs::read(&out_path).unwrap_or_default();
    (result, output)
}

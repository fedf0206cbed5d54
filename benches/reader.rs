use criterion::{criterion_group, criterion_main, Criterion};
use pcap_sorter::{CaptureReader, WorkerContext};
use std::io::Cursor;

const PACKETS: u32 = 10_000;

fn legacy_capture() -> Vec<u8> {
    let mut out = Vec::new();
    for v in [0xa1b2_c3d4u32, 0x0004_0002, 0, 0, 65535, 1] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for i in 0..PACKETS {
        for v in [i / 1000, (i % 1000) * 1000, 64, 64] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&[0x5a; 64]);
    }
    out
}

fn pcapng_capture() -> Vec<u8> {
    let mut out = Vec::new();
    let mut block = |block_type: u32, body: &[u8]| {
        let len = body.len() as u32 + 12;
        out.extend_from_slice(&block_type.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(&len.to_le_bytes());
    };
    let mut shb = vec![0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0];
    shb.extend_from_slice(&[0xff; 8]);
    block(0x0A0D_0D0A, &shb);
    block(1, &[1, 0, 0, 0, 0xff, 0xff, 0, 0]);
    for i in 0..PACKETS {
        let mut epb = Vec::new();
        let ts = u64::from(i) * 1000;
        for v in [0, (ts >> 32) as u32, ts as u32, 64, 64] {
            epb.extend_from_slice(&v.to_le_bytes());
        }
        epb.extend_from_slice(&[0x5a; 64]);
        block(6, &epb);
    }
    out
}

fn read_all(bytes: &[u8]) -> u64 {
    let ctx = WorkerContext::new(0);
    let mut reader = CaptureReader::new(Cursor::new(bytes), &ctx).unwrap();
    while reader.next_packet().unwrap().is_some() {}
    reader.packets()
}

fn bench_reader(c: &mut Criterion) {
    let legacy = legacy_capture();
    c.bench_function("read legacy 10k", |b| b.iter(|| read_all(&legacy)));
    let ng = pcapng_capture();
    c.bench_function("read pcapng 10k", |b| b.iter(|| read_all(&ng)));
}

criterion_group!(benches, bench_reader);
criterion_main!(benches);

//! Cost of the validation building blocks: hex fields, CRC-32, escaping and
//! status serialization.
//!
//! ```sh
//! cargo bench --bench validation_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linkframe_core::FrameConfig;
use linkframe_protocol::{
    BoundedHexField, FrameCodec, ValidationStatus, crc32,
    escape::{embed, extract},
};
use std::hint::black_box;

fn bench_hex_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_field");

    group.bench_function("try_from_int", |b| {
        b.iter(|| BoundedHexField::try_from_int(black_box(0x3610_a686), 8))
    });
    group.bench_function("try_from_text", |b| {
        b.iter(|| BoundedHexField::try_from_text(black_box("3610a686"), 8))
    });
    group.bench_function("from_text_defaulted", |b| {
        b.iter(|| BoundedHexField::from_text(black_box("3610a68z"), 8).into_field())
    });

    group.finish();
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");

    for size in [16usize, 1024, 65535] {
        group.throughput(Throughput::Bytes(size as u64));
        let data = vec![0x5au8; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| crc32(black_box(data)))
        });
    }

    group.finish();
}

/// Escaping a whole frame, the worst realistic density of delimiters.
fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");
    let config = FrameConfig::default();

    let mut codec = FrameCodec::default();
    let frame = codec.generate(&[0x1f; 1024], Default::default()).to_vec();
    let embedded = embed(&config, &frame);
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("embed", |b| b.iter(|| embed(&config, black_box(&frame))));
    group.bench_function("extract", |b| {
        b.iter(|| extract(&config, black_box(&embedded)))
    });

    group.finish();
}

fn bench_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("status");

    let mut codec = FrameCodec::default();
    let status = codec.parse(b"PKSEND\x1f0005\x1fhellx\x1f3610a686\r");
    let text = status.serialize();

    group.bench_function("serialize", |b| b.iter(|| black_box(&status).serialize()));
    group.bench_function("deserialize", |b| {
        b.iter(|| ValidationStatus::deserialize(black_box(&text)))
    });
    group.bench_function("classify", |b| b.iter(|| black_box(&status).classify()));

    group.finish();
}

criterion_group!(benches, bench_hex_field, bench_crc32, bench_escape, bench_status);

criterion_main!(benches);

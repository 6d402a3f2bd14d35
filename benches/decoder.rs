//! Decoder benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mochi_tty::io::{Charset, Decoder};

fn bench_decode_ascii(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("ascii", |b| {
        b.iter(|| {
            let mut count = 0usize;
            let mut decoder = Decoder::new(Charset::Utf8, |cps: &[char]| count += cps.len());
            decoder.write(black_box(plain_text.as_bytes())).unwrap();
            drop(decoder);
            black_box(count)
        })
    });

    group.finish();
}

fn bench_decode_multibyte(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    let text = "héllo 世界 😀 ".repeat(500);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("utf8_multibyte", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(Charset::Utf8, Vec::new());
            decoder.write(black_box(text.as_bytes())).unwrap();
            black_box(decoder.into_sink())
        })
    });

    group.finish();
}

fn bench_decode_small_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    // Keystroke-sized reads, as delivered by an interactive transport
    let text = "ls -la\r\x1b[A\x1b[B世界\r".repeat(200);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("small_chunks", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(Charset::Utf8, Vec::new());
            for chunk in text.as_bytes().chunks(3) {
                decoder.write(black_box(chunk)).unwrap();
            }
            black_box(decoder.into_sink())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_ascii,
    bench_decode_multibyte,
    bench_decode_small_chunks
);
criterion_main!(benches);

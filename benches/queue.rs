//! Event queue benchmarks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mochi_tty::readline::{EventQueue, Keymap};

fn bench_queue_bundled(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue");

    let keymap = Arc::new(Keymap::bundled());
    let input: Vec<char> = "echo hello\x01\x1b[A\x1b[B\x1b[3~\x7f\r"
        .repeat(200)
        .chars()
        .collect();
    group.throughput(Throughput::Elements(input.len() as u64));

    group.bench_function("bundled_keymap", |b| {
        b.iter(|| {
            let mut queue = EventQueue::new(Arc::clone(&keymap));
            queue.append(black_box(&input));
            let mut events = 0usize;
            while queue.next().is_some() {
                events += 1;
            }
            black_box(events)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_queue_bundled);
criterion_main!(benches);

//! Benchmarks comparing pooled execution against per-task thread spawning

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crew::prelude::*;

fn pooled_batch(pool: &ThreadPool, n: u64) -> u64 {
    let handles: Vec<ResultHandle> = (0..n).map(|i| pool.submit_fn(move || i * i)).collect();

    handles
        .into_iter()
        .map(|h| h.wait().take::<u64>().unwrap())
        .sum()
}

fn spawned_batch(n: u64) -> u64 {
    let handles: Vec<_> = (0..n).map(|i| std::thread::spawn(move || i * i)).collect();

    handles.into_iter().map(|h| h.join().unwrap()).sum()
}

fn bench_batch(c: &mut Criterion) {
    let pool = ThreadPool::new();
    pool.start_default().unwrap();

    let mut group = c.benchmark_group("batch");

    for size in [16u64, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::new("pooled", size), size, |b, &size| {
            b.iter(|| pooled_batch(&pool, black_box(size)))
        });

        group.bench_with_input(BenchmarkId::new("spawned", size), size, |b, &size| {
            b.iter(|| spawned_batch(black_box(size)))
        });
    }

    group.finish();
}

fn bench_single_submit(c: &mut Criterion) {
    let pool = ThreadPool::new();
    pool.start_default().unwrap();

    c.bench_function("submit_and_wait", |b| {
        b.iter(|| {
            let handle = pool.submit_fn(|| black_box(7u64) + 1);
            handle.wait().take::<u64>().unwrap()
        })
    });
}

criterion_group!(benches, bench_batch, bench_single_submit);
criterion_main!(benches);

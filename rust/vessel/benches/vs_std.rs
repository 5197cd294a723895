use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use vessel::Vector;

const SIZES: [usize; 3] = [1_000, 100_000, 1_000_000];

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_back_vs_std");

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("vessel", size), &size, |b, &size| {
            b.iter(|| {
                let mut v = Vector::new();
                for i in 0..size {
                    v.push_back(black_box(i)).unwrap();
                }
                black_box(v.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("std", size), &size, |b, &size| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..size {
                    v.push(black_box(i));
                }
                black_box(v.len())
            });
        });
    }

    group.finish();
}

fn bench_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("pop_back_vs_std");

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let ours: Vector<usize> = (0..size).collect();
        group.bench_with_input(BenchmarkId::new("vessel", size), &ours, |b, data| {
            b.iter_batched_ref(
                || data.clone(),
                |v| {
                    while let Ok(x) = v.pop_back() {
                        black_box(x);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });

        let theirs: Vec<usize> = (0..size).collect();
        group.bench_with_input(BenchmarkId::new("std", size), &theirs, |b, data| {
            b.iter_batched_ref(
                || data.clone(),
                |v| {
                    while let Some(x) = v.pop() {
                        black_box(x);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_access_vs_std");

    for &size in &SIZES {
        fastrand::seed(size as u64);
        let indices: Vec<usize> = (0..10_000).map(|_| fastrand::usize(0..size)).collect();
        group.throughput(Throughput::Elements(indices.len() as u64));

        let ours: Vector<u64> = (0..size as u64).collect();
        group.bench_with_input(BenchmarkId::new("vessel", size), &ours, |b, data| {
            b.iter(|| indices.iter().map(|&i| data[i]).fold(0u64, u64::wrapping_add));
        });

        let theirs: Vec<u64> = (0..size as u64).collect();
        group.bench_with_input(BenchmarkId::new("std", size), &theirs, |b, data| {
            b.iter(|| indices.iter().map(|&i| data[i]).fold(0u64, u64::wrapping_add));
        });
    }

    group.finish();
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop_mixed_vs_std");
    let size = 100_000;

    group.bench_function("vessel", |b| {
        b.iter(|| {
            let mut v = Vector::new();
            for i in 0..size {
                v.push_back(i).unwrap();
                if i % 3 == 0 {
                    black_box(v.pop_back().ok());
                }
            }
            v.clear();
            black_box(v.capacity())
        });
    });

    group.bench_function("std", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for i in 0..size {
                v.push(i);
                if i % 3 == 0 {
                    black_box(v.pop());
                }
            }
            v.clear();
            black_box(v.capacity())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_push, bench_pop, bench_random_access, bench_mixed);
criterion_main!(benches);

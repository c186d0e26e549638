//! Benchmarks for reconstructing pin state at a point in time.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use pin_replay::{project, ProjectionIndex};

use crate::{generate_log, LOG_SIZES};

pub fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");

    for &size in LOG_SIZES {
        let log = Arc::new(generate_log(size));
        // Late query: the worst case for a linear scan
        let t = size as f64 * 0.001 * 0.9;

        group.bench_with_input(BenchmarkId::new("full_scan", size), &size, |b, _| {
            b.iter(|| project(black_box(&log), black_box(t)))
        });

        let index = ProjectionIndex::new(Arc::clone(&log), 256);
        group.bench_with_input(BenchmarkId::new("indexed", size), &size, |b, _| {
            b.iter(|| index.project(black_box(t)))
        });

        group.bench_with_input(BenchmarkId::new("build_index", size), &size, |b, _| {
            b.iter(|| ProjectionIndex::new(black_box(Arc::clone(&log)), 256))
        });
    }

    group.finish();
}

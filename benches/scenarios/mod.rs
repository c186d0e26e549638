//! Real-world scenario benchmarks.
//!
//! Plays a whole generated run at 60fps, reprojecting on every tick the way
//! the terminal player does.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pin_replay::{Replay, ReplayConfig};

use crate::{generate_log, LOG_SIZES};

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");
    let config = ReplayConfig::default();

    for &size in LOG_SIZES {
        let log = generate_log(size);
        let duration = log.derive_duration(config.duration_margin, config.min_duration);
        let mut replay = Replay::new(log, duration, &config).expect("derived duration is positive");

        group.bench_with_input(BenchmarkId::new("tick_60fps", size), &size, |b, _| {
            b.iter(|| {
                replay.stop();
                replay.play();
                while replay.clock().is_playing() {
                    black_box(replay.tick(1.0 / 60.0).projection.len());
                }
            })
        });
    }

    group.finish();
}

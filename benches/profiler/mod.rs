// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

// Criterion settings shared by the linkshop benches, tunable via `LINKSHOP_BENCH_*`.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn criterion() -> Criterion {
    // Editor graphs are small; shorter windows keep a full run under a minute.
    let sample_size = env_or("LINKSHOP_BENCH_SAMPLES", 40usize).clamp(10, 200);
    let warmup = env_or("LINKSHOP_BENCH_WARMUP_MS", 1_000u64).clamp(100, 60_000);
    let measurement = env_or("LINKSHOP_BENCH_MEASURE_MS", 3_000u64).clamp(500, 120_000);

    let config = Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_millis(warmup))
        .measurement_time(Duration::from_millis(measurement));

    // 0 disables the flamegraph profiler.
    match env_or("LINKSHOP_PROFILE_HZ", 100i32) {
        hz if hz <= 0 => config,
        hz => config.with_profiler(PProfProfiler::new(hz.min(1000), Output::Flamegraph(None))),
    }
}

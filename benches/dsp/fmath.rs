//! Benchmarks for the fast exp2/sin/cos approximations against std.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use la32_dsp::dsp::fmath::{fast_cos, fast_exp2, fast_sin};

use crate::BLOCK_SIZES;

pub fn bench_fmath(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fmath");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let inputs: Vec<f32> = (0..size).map(|i| i as f32 / size as f32 * 8.0 - 4.0).collect();

        group.bench_with_input(BenchmarkId::new("fast_exp2", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&inputs) {
                    *out = fast_exp2(black_box(x));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("std_exp2", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&inputs) {
                    *out = black_box(x).exp2();
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("fast_sin_cos", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&inputs) {
                    *out = fast_sin(black_box(x)) + fast_cos(black_box(x));
                }
            })
        });
    }

    group.finish();
}

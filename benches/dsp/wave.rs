//! Benchmarks for the two waveform generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use la32_dsp::dsp::{PcmPlayer, SynthWave};
use la32_dsp::rom::PcmWave;
use la32_dsp::tables::Tables;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_wave(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wave");
    let tables = Tables::new(SAMPLE_RATE);
    let data: Vec<f32> = (0..1024).map(|i| (i as f32 / 1024.0 * std::f32::consts::TAU).sin()).collect();
    let looped = PcmWave {
        addr: 0,
        len: 1024,
        looped: true,
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Square, filter fully open: no resonance term
        let mut square = SynthWave::new(128, false, 0);
        group.bench_with_input(BenchmarkId::new("square_open", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = square.next_sample(black_box(220.0), 255, &tables);
                }
            })
        });

        // Resonant sawtooth: every term of the cosine model is live
        let mut saw = SynthWave::new(90, true, 30);
        group.bench_with_input(BenchmarkId::new("saw_resonant", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = saw.next_sample(black_box(110.0), 170, &tables);
                }
            })
        });

        let mut pcm = PcmPlayer::new(looped);
        group.bench_with_input(BenchmarkId::new("pcm_looped", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = pcm
                        .next_sample(black_box(523.25), SAMPLE_RATE, &data)
                        .unwrap_or(0.0);
                }
            })
        });
    }

    group.finish();
}

//! Benchmarks for LA32 partial rendering.
//!
//! Run with: cargo bench
//!
//! The engine runs at the hardware's 32 kHz output rate, so the deadlines
//! are a little looser than at 48 kHz:
//!   - 64 samples  = 2.00ms deadline
//!   - 128 samples = 4.00ms deadline
//!   - 256 samples = 8.00ms deadline
//!   - 512 samples = 16.00ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Per-sample primitives (fast math, ramp, waveforms, TVA)
//!   - scenarios/*  Full pool renders with many partials sounding

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 32_000.0;

criterion_group!(
    benches,
    // Per-sample primitives
    dsp::bench_fmath,
    dsp::bench_wave,
    dsp::bench_envelopes,
    // Whole-engine scenarios
    scenarios::bench_pool,
);
criterion_main!(benches);

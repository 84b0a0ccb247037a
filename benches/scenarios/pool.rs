//! Benchmarks for full pool renders.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use la32_dsp::patch::{PatchCache, PatchTemp, TvfParam};
use la32_dsp::rom::{PcmRom, PcmWave};
use la32_dsp::synth::{HeldNote, PartialPool, Part, Poly, StaticPart};
use la32_dsp::SynthConfig;

use crate::BLOCK_SIZES;

fn rom() -> Arc<PcmRom> {
    let samples: Vec<i16> = (0..2048)
        .map(|i| ((i as f32 / 2048.0 * std::f32::consts::TAU).sin() * 24000.0) as i16)
        .collect();
    let wave = PcmWave {
        addr: 0,
        len: 2048,
        looped: true,
    };
    Arc::new(PcmRom::new(&samples, vec![wave]).unwrap())
}

fn synth_patch(structure_mix: u8, structure_position: u8) -> PatchCache {
    let mut patch = PatchCache {
        waveform: 1,
        structure_mix,
        structure_position,
        ..PatchCache::default()
    };
    patch.partial_param.tvf = TvfParam {
        cutoff: 60,
        resonance: 15,
        env_depth: 50,
        env_time: [30, 40, 40, 40, 40],
        ..TvfParam::default()
    };
    patch
}

fn pcm_patch(structure_mix: u8, structure_position: u8) -> PatchCache {
    PatchCache {
        pcm_partial: true,
        structure_mix,
        structure_position,
        ..PatchCache::default()
    }
}

/// Fill `count` partials, two per note, with the given structure.
fn pool_with(count: usize, mix: u8, first: fn(u8, u8) -> PatchCache, second: fn(u8, u8) -> PatchCache) -> PartialPool {
    let mut pool = PartialPool::new(&SynthConfig::default(), rom()).unwrap();
    let part: Arc<dyn Part> = Arc::new(StaticPart::new(PatchTemp::default()));

    for (n, index) in (0..count).step_by(2).enumerate() {
        let poly: Arc<dyn Poly> = Arc::new(HeldNote::new(48 + n as u8, 100));
        pool.activate(index, 0);
        pool.activate(index + 1, 0);
        pool.start_partial(
            index,
            part.clone(),
            Some(poly.clone()),
            Some(Arc::new(first(mix, 0))),
            None,
            Some(index + 1),
        );
        pool.start_partial(
            index + 1,
            part.clone(),
            Some(poly),
            Some(Arc::new(second(mix, 1))),
            None,
            Some(index),
        );
    }
    pool
}

pub fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pool");

    for &size in BLOCK_SIZES {
        let mut out = vec![0i16; size * 2];

        // Two independent partials per note, a typical patch
        let mut layered = pool_with(8, 0, synth_patch, pcm_patch);
        group.bench_with_input(BenchmarkId::new("layered_8", size), &size, |b, _| {
            b.iter(|| {
                layered.render(black_box(&mut out));
            })
        });

        // Ring-modulated structures: slaves render through their masters
        let mut ring = pool_with(8, 2, synth_patch, pcm_patch);
        group.bench_with_input(BenchmarkId::new("ring_8", size), &size, |b, _| {
            b.iter(|| {
                ring.render(black_box(&mut out));
            })
        });

        // Full polyphony, every partial a resonant synth wave
        let mut full = pool_with(32, 0, synth_patch, synth_patch);
        group.bench_with_input(BenchmarkId::new("full_32", size), &size, |b, _| {
            b.iter(|| {
                full.render(black_box(&mut out));
            })
        });
    }

    group.finish();
}

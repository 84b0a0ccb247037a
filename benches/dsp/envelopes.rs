//! Benchmarks for the TVA, TVP and TVF envelope generators.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use la32_dsp::patch::{PatchCache, PitchEnvParam, PitchLfoParam, TvaParam, TvfParam};
use la32_dsp::synth::{HeldNote, NoteContext, StaticPart, Tva, Tvf, Tvp};
use la32_dsp::tables::Tables;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn note() -> NoteContext {
    let mut patch = PatchCache::default();
    patch.partial_param.tva = TvaParam {
        env_time: [40, 50, 60, 70, 60],
        env_level: [100, 80, 70, 60],
        ..TvaParam::default()
    };
    patch.partial_param.pitch_env = PitchEnvParam {
        depth: 5,
        time: [40, 40, 40, 40],
        level: [80, 40, 60, 50, 50],
        ..PitchEnvParam::default()
    };
    patch.partial_param.pitch_lfo = PitchLfoParam {
        rate: 60,
        depth: 30,
        mod_sensitivity: 50,
    };
    patch.partial_param.tvf = TvfParam {
        cutoff: 40,
        env_depth: 80,
        env_time: [40, 50, 60, 70, 60],
        env_level: [100, 70, 50, 40],
        ..TvfParam::default()
    };

    NoteContext {
        part: Arc::new(StaticPart::default()),
        poly: Arc::new(HeldNote::new(60, 100)),
        patch: Arc::new(patch),
        rhythm: None,
    }
}

pub fn bench_envelopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelopes");
    let tables = Arc::new(Tables::new(SAMPLE_RATE));
    let note = note();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack ramp: the ramp register steps and interrupts on every call
        let mut tva = Tva::new(tables.clone());
        tva.reset(&note, false);
        group.bench_with_input(BenchmarkId::new("tva", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = tva.next_amp(black_box(&note));
                }
            })
        });

        // Pitch envelope plus LFO
        let mut tvp = Tvp::new(tables.clone());
        tvp.reset(&note);
        group.bench_with_input(BenchmarkId::new("tvp", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = tvp.next_pitch(black_box(&note)) as f32;
                }
            })
        });

        let mut tvf = Tvf::new(tables.clone());
        tvf.reset(&note, tvp.base_pitch());
        group.bench_with_input(BenchmarkId::new("tvf", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = tvf.next_cutoff_modifier(black_box(&note)) as f32;
                }
            })
        });
    }

    group.finish();
}

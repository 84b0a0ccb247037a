//! Built-in demo material: a synthetic PCM ROM, three patches and a
//! note clock that re-triggers them.

use std::sync::Arc;

use color_eyre::eyre::Result as EyreResult;
use log::{debug, warn};

use la32_dsp::patch::{PatchCache, PatchTemp, TvaParam, TvfParam};
use la32_dsp::rom::{PcmRom, PcmWave};
use la32_dsp::synth::{HeldNote, PartialPool, Part, Poly, StaticPart};
use la32_dsp::{SynthConfig, MAX_BLOCK_SIZE};

/// The scope drives a single part.
const PART: usize = 0;

const BRIGHT_LOOP: usize = 0;
const NOISE_HIT: usize = 1;

/// Arpeggio the demo cycles through.
const KEYS: [u8; 6] = [48, 55, 60, 63, 67, 72];

/// Note period and the fraction of it the key is held.
const NOTE_SECONDS: f32 = 0.5;
const GATE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Pcm,
    ResonantSaw,
    RingPair,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Pcm, Demo::ResonantSaw, Demo::RingPair];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Pcm => "PCM loop + noise hit",
            Demo::ResonantSaw => "Resonant sawtooth",
            Demo::RingPair => "Ring-modulated pair",
        }
    }

    /// Patches for the first and (optionally) second partial of the structure.
    fn patches(self) -> (PatchCache, Option<PatchCache>) {
        match self {
            Demo::Pcm => {
                // Noise transient layered over the loop as an independent partial.
                let hit = PatchCache {
                    pcm_partial: true,
                    pcm: NOISE_HIT,
                    structure_position: 1,
                    ..PatchCache::default()
                };
                (pcm_patch(), Some(hit))
            }
            Demo::ResonantSaw => (saw_patch(), None),
            Demo::RingPair => {
                let mut master = square_patch();
                master.structure_mix = 2;
                let mut slave = PatchCache {
                    pcm_partial: true,
                    pcm: BRIGHT_LOOP,
                    structure_mix: 2,
                    structure_position: 1,
                    ..PatchCache::default()
                };
                // An octave and a fifth up for a clangy, bell-like product.
                slave.partial_param.wg.pitch_coarse = 67;
                (master, Some(slave))
            }
        }
    }
}

fn envelope(attack: u8, release: u8) -> TvaParam {
    TvaParam {
        env_time: [attack, 40, 50, 60, release],
        env_level: [100, 85, 70, 60],
        ..TvaParam::default()
    }
}

fn pcm_patch() -> PatchCache {
    let mut patch = PatchCache {
        pcm_partial: true,
        pcm: BRIGHT_LOOP,
        ..PatchCache::default()
    };
    patch.partial_param.tva = envelope(5, 40);
    patch
}

fn saw_patch() -> PatchCache {
    let mut patch = PatchCache {
        waveform: 1,
        ..PatchCache::default()
    };
    patch.partial_param.tvf = TvfParam {
        cutoff: 45,
        resonance: 25,
        env_depth: 70,
        env_time: [20, 50, 60, 60, 40],
        env_level: [100, 60, 40, 30],
        ..TvfParam::default()
    };
    patch.partial_param.tva = envelope(10, 40);
    patch
}

fn square_patch() -> PatchCache {
    let mut patch = PatchCache::default();
    patch.partial_param.wg.pulse_width = 30;
    patch.partial_param.tva = envelope(0, 50);
    patch
}

/// Two waves: a looped cycle rich in odd harmonics and a decaying noise hit.
pub fn demo_rom() -> EyreResult<PcmRom> {
    const CYCLE: usize = 256;
    const HIT: usize = 4096;

    let mut samples: Vec<i16> = (0..CYCLE)
        .map(|i| {
            let phase = i as f32 / CYCLE as f32 * std::f32::consts::TAU;
            let s = phase.sin() + (3.0 * phase).sin() / 3.0 + (5.0 * phase).sin() / 5.0;
            (s * 18_000.0) as i16
        })
        .collect();

    let mut seed = 0x1234_5678u32;
    samples.extend((0..HIT).map(|i| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (seed >> 16) as i16 as f32;
        let decay = 1.0 - i as f32 / HIT as f32;
        (noise * decay * decay) as i16
    }));

    let waves = vec![
        PcmWave {
            addr: 0,
            len: CYCLE,
            looped: true,
        },
        PcmWave {
            addr: CYCLE,
            len: HIT,
            looped: false,
        },
    ];
    Ok(PcmRom::new(&samples, waves)?)
}

/// Owns the partial pool on the audio thread and plays the selected demo.
pub struct DemoPlayer {
    pool: PartialPool,
    part: Arc<StaticPart>,
    demo: Demo,
    note: Option<Arc<HeldNote>>,
    elapsed: usize,
    note_len: usize,
    gate_len: usize,
    step: usize,
}

impl DemoPlayer {
    pub fn new(sample_rate: f32) -> EyreResult<Self> {
        let config = SynthConfig::with_sample_rate(sample_rate);
        let pool = PartialPool::new(&config, Arc::new(demo_rom()?))?;
        let note_len = (sample_rate * NOTE_SECONDS) as usize;

        Ok(Self {
            pool,
            part: Arc::new(StaticPart::new(PatchTemp {
                panpot: 7,
                output_level: 90,
            })),
            demo: Demo::Pcm,
            note: None,
            // First render starts a note straight away.
            elapsed: note_len,
            note_len,
            gate_len: (note_len as f32 * GATE) as usize,
            step: 0,
        })
    }

    /// Switch patches, cutting whatever is sounding.
    pub fn select(&mut self, demo: Demo) {
        if demo == self.demo {
            return;
        }
        debug!("demo switched to {}", demo.name());
        self.pool.deactivate_all();
        self.note = None;
        self.demo = demo;
        self.elapsed = self.note_len;
    }

    /// Render interleaved stereo, advancing the note clock.
    pub fn render(&mut self, out: &mut [i16]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE * 2) {
            let frames = block.len() / 2;
            if self.elapsed >= self.note_len {
                self.trigger();
                self.elapsed = 0;
            } else if self.elapsed >= self.gate_len {
                self.release();
            }
            self.pool.render(block);
            self.elapsed += frames;
        }
    }

    fn release(&mut self) {
        if let Some(note) = self.note.take() {
            note.release();
            self.pool.start_decay_part(PART);
        }
    }

    fn trigger(&mut self) {
        self.release();

        let key = KEYS[self.step % KEYS.len()];
        self.step += 1;

        let (first, second) = self.demo.patches();
        let needed = if second.is_some() { 2 } else { 1 };
        let free: Vec<usize> = self
            .pool
            .partials()
            .filter(|p| !p.is_active())
            .map(|p| p.index())
            .take(needed)
            .collect();
        if free.len() < needed {
            warn!("no free partials for key {key}, skipping");
            return;
        }

        let note = Arc::new(HeldNote::new(key, 100));
        let part: Arc<dyn Part> = self.part.clone();
        let poly: Arc<dyn Poly> = note.clone();
        let pair = free.get(1).copied();

        for (i, patch) in std::iter::once(first).chain(second).enumerate() {
            let index = free[i];
            let partner = if i == 0 { pair } else { Some(free[0]) };
            self.pool.activate(index, PART);
            note.assign(index);
            self.pool.start_partial(
                index,
                part.clone(),
                Some(poly.clone()),
                Some(Arc::new(patch)),
                None,
                partner,
            );
        }
        self.note = Some(note);
    }
}

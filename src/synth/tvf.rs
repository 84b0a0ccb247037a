use std::sync::Arc;

use crate::synth::context::NoteContext;
use crate::synth::tva::{bias_distance, key_time_subtraction};
use crate::tables::{Tables, KEYFOLLOW_MULT_X8, MIDDLE_C, MIDDLE_C_PITCH};

/*
TVF: Time-Variant Filter
========================

Works out the filter cutoff code (0..255) for every sample of a synthesized
partial. Internally everything is in 1/256ths of a code, so the final code is
a right shift by 8.

    cutoff = clamp(base + envelope, 0, 255 * 256) >> 8

Base
----

Fixed for the note:

    static    cutoff (0..100) mapped onto 0..255 codes
    keyfollow (base pitch - middle C) scaled by the key-follow multiplier:
              16 codes per octave at a multiplier of 1
    bias      keys away from the bias point, times (bias level - 7)

Each term is clamped to its own range before they are added.

Envelope
--------

A five segment linear envelope, independent of the TVA:

    0 ─time[0]→ level[0] ─time[1]→ level[1] ─time[2]→ level[2]
      ─time[3]→ level[3] (sustain)    ─time[4]→ 0 (release)

Segment lengths come from the envelope time table, shortened by key follow.
Small level changes are capped to a short time (env_delta_max_time) so that
a tiny step never crawls. The level is scaled by the envelope depth, by
velocity and by key position before it is added to the base.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TvfSegment {
    Attack,
    Decay1,
    Decay2,
    Sustain,
    Release,
    Finished,
}

impl TvfSegment {
    fn next(self) -> Self {
        match self {
            TvfSegment::Attack => TvfSegment::Decay1,
            TvfSegment::Decay1 => TvfSegment::Decay2,
            TvfSegment::Decay2 => TvfSegment::Sustain,
            TvfSegment::Sustain => TvfSegment::Release,
            TvfSegment::Release | TvfSegment::Finished => TvfSegment::Finished,
        }
    }

    fn index(self) -> usize {
        match self {
            TvfSegment::Attack => 0,
            TvfSegment::Decay1 => 1,
            TvfSegment::Decay2 => 2,
            TvfSegment::Sustain => 3,
            TvfSegment::Release | TvfSegment::Finished => 4,
        }
    }
}

const MAX_CUTOFF: i32 = 255 * 256;
const MAX_KEYFOLLOW: i32 = 127 * 256;
const MIN_KEYFOLLOW: i32 = -128 * 256;
const MAX_BIAS: i32 = 127 * 256;

/// Final cutoff code from a base and an envelope modifier.
#[inline]
pub fn cutoff_code(base: i32, modifier: i32) -> u8 {
    ((base + modifier) >> 8).clamp(0, 255) as u8
}

#[derive(Debug, Clone)]
pub struct Tvf {
    tables: Arc<Tables>,
    base_cutoff: i32,
    segment: TvfSegment,
    // Sustain level reached; frozen until start_decay.
    holding: bool,
    key_time_subtraction: i32,
    // Full-scale envelope contribution in cutoff units.
    env_amount: f32,
    from_level: f32,
    to_level: f32,
    level: f32,
    elapsed: u32,
    length: u32,
}

impl Tvf {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self {
            tables,
            base_cutoff: 0,
            segment: TvfSegment::Finished,
            holding: false,
            key_time_subtraction: 0,
            env_amount: 0.0,
            from_level: 0.0,
            to_level: 0.0,
            level: 0.0,
            elapsed: 0,
            length: 1,
        }
    }

    pub fn reset(&mut self, note: &NoteContext, base_pitch: i32) {
        let tvf = &note.patch.partial_param.tvf;
        let key = note.key();

        let static_cutoff = (tvf.cutoff.min(100) as i32 * 65536 / 100).clamp(0, MAX_CUTOFF);
        let keyfollow = ((base_pitch - MIDDLE_C_PITCH)
            * KEYFOLLOW_MULT_X8[(tvf.keyfollow as usize).min(16)]
            / 8)
            .clamp(MIN_KEYFOLLOW, MAX_KEYFOLLOW);
        let bias = (bias_distance(tvf.bias_point, key) * (tvf.bias_level.min(14) as i32 - 7) * 32)
            .clamp(-MAX_BIAS, MAX_BIAS);
        self.base_cutoff = (static_cutoff + keyfollow + bias).clamp(0, MAX_CUTOFF);

        let velocity_scale =
            1.0 - tvf.env_velo_sensitivity.min(100) as f32 / 100.0 * (127 - note.velocity()) as f32 / 127.0;
        let key_scale = (1.0
            + (key - MIDDLE_C) as f32 * tvf.env_depth_keyfollow.min(4) as f32 / 96.0)
            .max(0.0);
        self.env_amount = tvf.env_depth.min(100) as f32 / 100.0
            * MAX_CUTOFF as f32
            * velocity_scale.max(0.0)
            * key_scale;

        self.key_time_subtraction = key_time_subtraction(tvf.env_time_keyfollow, key);
        self.level = 0.0;
        self.holding = false;
        self.enter(TvfSegment::Attack, note);
    }

    pub fn base_cutoff(&self) -> i32 {
        self.base_cutoff
    }

    pub fn segment(&self) -> TvfSegment {
        self.segment
    }

    /// Advance one sample and return the envelope's cutoff contribution.
    #[inline]
    pub fn next_cutoff_modifier(&mut self, note: &NoteContext) -> i32 {
        if self.segment != TvfSegment::Finished && !self.holding {
            self.elapsed += 1;
            if self.elapsed >= self.length {
                self.level = self.to_level;
                if self.segment == TvfSegment::Sustain && note.poly.can_sustain() {
                    self.holding = true;
                } else {
                    self.enter(self.segment.next(), note);
                }
            } else {
                let t = self.elapsed as f32 / self.length as f32;
                self.level = self.from_level + (self.to_level - self.from_level) * t;
            }
        }
        ((self.level / 100.0 * self.env_amount) as i32).clamp(0, MAX_CUTOFF)
    }

    pub fn start_decay(&mut self, note: &NoteContext) {
        if self.segment >= TvfSegment::Release {
            return;
        }
        self.holding = false;
        self.enter(TvfSegment::Release, note);
    }

    fn enter(&mut self, segment: TvfSegment, note: &NoteContext) {
        let tvf = &note.patch.partial_param.tvf;
        self.segment = segment;
        match segment {
            TvfSegment::Sustain if !note.poly.can_sustain() => {
                self.enter(TvfSegment::Release, note);
                return;
            }
            TvfSegment::Finished => return,
            _ => {}
        }

        let index = segment.index();
        let target = if segment == TvfSegment::Release {
            0.0
        } else {
            tvf.env_level[index].min(100) as f32
        };

        let delta = (target - self.level).abs().round() as usize;
        let time = (tvf.env_time[index].min(100) as i32 - self.key_time_subtraction).clamp(0, 100);
        let time = time.min(self.tables.env_delta_max_time[delta.min(100)] as i32);

        self.from_level = self.level;
        self.to_level = target;
        self.elapsed = 0;
        self.length = self.tables.env_time_to_samples[time as usize];
    }
}

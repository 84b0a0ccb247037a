use std::f32::consts::TAU;
use std::sync::Arc;

use crate::dsp::fmath::fast_sin;
use crate::dsp::ramp::{increment_for, Ramp, TARGET_MULT};
use crate::patch::PartialParam;
use crate::synth::context::NoteContext;
use crate::synth::tva::key_time_subtraction;
use crate::tables::{Tables, KEYFOLLOW_MULT_X8, MIDDLE_C, MIDDLE_C_PITCH, PITCH_PER_OCTAVE};

/*
TVP: Time-Variant Pitch
=======================

Produces the partial's pitch code every sample. Pitch codes are
logarithmic: 4096 per octave, 0x8000 at middle C.

    pitch = base + envelope + lfo + bend

Vocabulary
----------

  base        Key position scaled by the key-follow setting, plus coarse
              (semitone) and fine (cent) tuning. Fixed for the note.

  envelope    A pitch offset driven by the same ramp register the TVA uses.
              Levels are 0..100 with 50 meaning "no offset"; depth 10 and a
              level of 100 is one octave up.

  lfo         Vibrato. A sine at the LFO rate, one semitone deep at depth 100.
              The mod wheel adds depth scaled by the modulation sensitivity.

  bend        The part's pitch bend, when the partial has the bender enabled.


Envelope
--------

    level[0] ─time[0]→ level[1] ─time[1]→ level[2] ─time[2]→ level[3]  (sustain)
                                                     start_decay ─time[3]→ level[4]

Segments whose level does not change are skipped.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvpPhase {
    /// Heading for `level[1 + n]`.
    Segment(u8),
    Sustain,
    Release,
    Done,
}

/// Velocity scale with no velocity influence.
const UNITY_VELOCITY_SCALE: i64 = 256;
/// Envelope level meaning "no pitch offset".
const ENV_CENTRE: i64 = 50;

#[derive(Debug, Clone)]
pub struct Tvp {
    tables: Arc<Tables>,
    ramp: Ramp,
    phase: TvpPhase,
    base_pitch: i32,
    key_time_subtraction: i32,
    // depth * velocity scale, applied to the envelope offset.
    env_scale: i64,
    lfo_phase: f32,
    lfo_increment: f32,
}

impl Tvp {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self {
            tables,
            ramp: Ramp::new(),
            phase: TvpPhase::Done,
            base_pitch: MIDDLE_C_PITCH,
            key_time_subtraction: 0,
            env_scale: 0,
            lfo_phase: 0.0,
            lfo_increment: 0.0,
        }
    }

    pub fn reset(&mut self, note: &NoteContext) {
        let param = &note.patch.partial_param;
        let env = &param.pitch_env;
        let key = note.key();

        self.base_pitch = base_pitch(param, key);
        self.key_time_subtraction = key_time_subtraction(env.time_keyfollow, key);

        let velocity_scale = (UNITY_VELOCITY_SCALE
            + (note.velocity() as i64 - 64) * env.velo_sensitivity.min(3) as i64 * 4 / 3)
            .max(0);
        self.env_scale = env.depth.min(10) as i64 * velocity_scale;

        self.lfo_phase = 0.0;
        self.lfo_increment = self.tables.lfo_rate_to_phase_inc[param.pitch_lfo.rate.min(100) as usize];

        self.ramp.set_current(env.level[0].min(100) as u32 * TARGET_MULT);
        self.ramp.set_target(env.level[0].min(100));
        self.enter(TvpPhase::Segment(0), note);
    }

    pub fn base_pitch(&self) -> i32 {
        self.base_pitch
    }

    pub fn phase(&self) -> TvpPhase {
        self.phase
    }

    /// Advance one sample and return the pitch code.
    #[inline]
    pub fn next_pitch(&mut self, note: &NoteContext) -> u16 {
        if self.ramp.step() {
            self.enter(self.phase.next(), note);
        }

        let param = &note.patch.partial_param;
        let level = self.ramp.current() as i64 - ENV_CENTRE * TARGET_MULT as i64;
        let env_offset = level * self.env_scale * PITCH_PER_OCTAVE as i64
            / (500 * UNITY_VELOCITY_SCALE * TARGET_MULT as i64);

        let lfo_offset = self.next_lfo(param, note);

        let bend = if param.wg.pitch_bender_enabled {
            note.part.pitch_bend()
        } else {
            0
        };

        let pitch = self.base_pitch as i64 + env_offset + lfo_offset as i64 + bend as i64;
        pitch.clamp(0, u16::MAX as i64) as u16
    }

    pub fn start_decay(&mut self, note: &NoteContext) {
        if matches!(self.phase, TvpPhase::Release | TvpPhase::Done) {
            return;
        }
        self.enter(TvpPhase::Release, note);
    }

    fn next_lfo(&mut self, param: &PartialParam, note: &NoteContext) -> i32 {
        let lfo = &param.pitch_lfo;
        let depth = (lfo.depth as u32 + note.part.modulation() as u32 * lfo.mod_sensitivity as u32 / 100)
            .min(100);
        if depth == 0 {
            return 0;
        }

        self.lfo_phase += self.lfo_increment;
        if self.lfo_phase >= TAU {
            self.lfo_phase -= TAU;
        }
        let semitone = PITCH_PER_OCTAVE as f32 / 12.0;
        (fast_sin(self.lfo_phase) * semitone * depth as f32 / 100.0) as i32
    }

    /// Program the ramp for `phase`, skipping any segment that would not move.
    fn enter(&mut self, mut phase: TvpPhase, note: &NoteContext) {
        let env = &note.patch.partial_param.pitch_env;
        loop {
            let (level, time) = match phase {
                TvpPhase::Segment(n) => {
                    let n = n as usize;
                    (env.level[n + 1], env.time[n])
                }
                TvpPhase::Sustain => {
                    if !note.poly.can_sustain() {
                        phase = TvpPhase::Release;
                        continue;
                    }
                    self.hold(phase);
                    return;
                }
                TvpPhase::Release => (env.level[4], env.time[3]),
                TvpPhase::Done => {
                    self.hold(phase);
                    return;
                }
            };

            let level = level.min(100);
            let delta = level as i32 - self.ramp.target() as i32;
            if delta == 0 {
                phase = phase.next();
                continue;
            }

            let time = time as i32 - self.key_time_subtraction;
            self.ramp.set_target(level);
            self.ramp.set_increment(increment_for(delta, time, &self.tables), &self.tables);
            self.phase = phase;
            return;
        }
    }

    fn hold(&mut self, phase: TvpPhase) {
        self.ramp.set_increment(0, &self.tables);
        self.phase = phase;
    }
}

impl TvpPhase {
    fn next(self) -> Self {
        match self {
            TvpPhase::Segment(n) if n < 2 => TvpPhase::Segment(n + 1),
            TvpPhase::Segment(_) => TvpPhase::Sustain,
            TvpPhase::Sustain => TvpPhase::Release,
            TvpPhase::Release | TvpPhase::Done => TvpPhase::Done,
        }
    }
}

/// Pitch code of the note before envelope, LFO and bend.
pub fn base_pitch(param: &PartialParam, key: i32) -> i32 {
    let wg = &param.wg;
    let keyfollow = KEYFOLLOW_MULT_X8[(wg.pitch_keyfollow as usize).min(16)];
    MIDDLE_C_PITCH
        + (key - MIDDLE_C) * PITCH_PER_OCTAVE * keyfollow / 96
        + (wg.pitch_coarse as i32 - 48) * PITCH_PER_OCTAVE / 12
        + (wg.pitch_fine as i32 - 50) * PITCH_PER_OCTAVE / 1200
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{PatchCache, PitchEnvParam, PitchLfoParam};
    use crate::synth::context::{HeldNote, StaticPart};

    fn note(key: u8, param: PartialParam) -> (NoteContext, Arc<StaticPart>) {
        let part = Arc::new(StaticPart::default());
        let note = NoteContext {
            part: part.clone(),
            poly: Arc::new(HeldNote::new(key, 64)),
            patch: Arc::new(PatchCache {
                partial_param: param,
                ..PatchCache::default()
            }),
            rhythm: None,
        };
        (note, part)
    }

    fn tvp() -> Tvp {
        Tvp::new(Arc::new(Tables::new(32_000.0)))
    }

    #[test]
    fn base_pitch_follows_key_and_tuning() {
        let mut param = PartialParam::default();
        assert_eq!(base_pitch(&param, 60), MIDDLE_C_PITCH);
        assert_eq!(base_pitch(&param, 72), MIDDLE_C_PITCH + PITCH_PER_OCTAVE);

        param.wg.pitch_coarse = 60;
        assert_eq!(base_pitch(&param, 60), MIDDLE_C_PITCH + PITCH_PER_OCTAVE);

        param.wg.pitch_coarse = 48;
        param.wg.pitch_keyfollow = 3; // no key follow
        assert_eq!(base_pitch(&param, 84), MIDDLE_C_PITCH);
    }

    #[test]
    fn flat_envelope_holds_the_base_pitch() {
        let (note, _) = note(72, PartialParam::default());
        let mut tvp = tvp();
        tvp.reset(&note);
        for _ in 0..1000 {
            assert_eq!(tvp.next_pitch(&note) as i32, MIDDLE_C_PITCH + PITCH_PER_OCTAVE);
        }
        assert_eq!(tvp.phase(), TvpPhase::Sustain);
    }

    #[test]
    fn envelope_sweeps_down_to_the_sustain_offset() {
        let mut param = PartialParam::default();
        param.pitch_env = PitchEnvParam {
            depth: 10,
            time: [20, 20, 20, 20],
            level: [100, 75, 50, 50, 0],
            ..PitchEnvParam::default()
        };
        let (note, _) = note(60, param);
        let mut tvp = tvp();
        tvp.reset(&note);

        let first = tvp.next_pitch(&note) as i32;
        assert!(first > MIDDLE_C_PITCH + PITCH_PER_OCTAVE * 9 / 10);
        let mut previous = first;
        for _ in 0..200_000 {
            let pitch = tvp.next_pitch(&note) as i32;
            assert!(pitch <= previous, "sweep must not rise");
            previous = pitch;
        }
        assert_eq!(tvp.phase(), TvpPhase::Sustain);
        assert_eq!(previous, MIDDLE_C_PITCH);

        tvp.start_decay(&note);
        for _ in 0..200_000 {
            tvp.next_pitch(&note);
        }
        assert_eq!(tvp.phase(), TvpPhase::Done);
        assert_eq!(tvp.next_pitch(&note) as i32, MIDDLE_C_PITCH - PITCH_PER_OCTAVE);
    }

    #[test]
    fn lfo_wobbles_within_a_semitone() {
        let mut param = PartialParam::default();
        param.pitch_lfo = PitchLfoParam {
            rate: 80,
            depth: 100,
            mod_sensitivity: 0,
        };
        let (note, _) = note(60, param);
        let mut tvp = tvp();
        tvp.reset(&note);

        let pitches: Vec<i32> = (0..32_000).map(|_| tvp.next_pitch(&note) as i32).collect();
        let semitone = PITCH_PER_OCTAVE / 12;
        let max = *pitches.iter().max().unwrap();
        let min = *pitches.iter().min().unwrap();
        assert!(max <= MIDDLE_C_PITCH + semitone && min >= MIDDLE_C_PITCH - semitone);
        assert!(max - min > semitone, "vibrato should swing both ways");
    }

    #[test]
    fn bend_only_applies_when_enabled() {
        let mut param = PartialParam::default();
        let (note_on, part) = note(60, param);
        part.set_pitch_bend(PITCH_PER_OCTAVE / 6);
        let mut tvp = tvp();
        tvp.reset(&note_on);
        assert_eq!(tvp.next_pitch(&note_on) as i32, MIDDLE_C_PITCH + PITCH_PER_OCTAVE / 6);

        param.wg.pitch_bender_enabled = false;
        let (note_off, part) = note(60, param);
        part.set_pitch_bend(PITCH_PER_OCTAVE / 6);
        tvp.reset(&note_off);
        assert_eq!(tvp.next_pitch(&note_off) as i32, MIDDLE_C_PITCH);
    }
}

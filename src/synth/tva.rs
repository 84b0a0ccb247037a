use std::sync::Arc;

use log::debug;

use crate::dsp::fmath::fast_exp2;
use crate::dsp::ramp::{increment_for, Ramp, DESCENDING, TARGET_MULT};
use crate::patch::PartialParam;
use crate::synth::context::NoteContext;
use crate::tables::{Tables, BIAS_LEVEL_TO_AMP_SUBTRACTION_COEFF};

/*
TVA: Time-Variant Amplifier
===========================

The amplitude envelope of one partial. It never computes a curve; it only
decides what to write into the LA32 ramp register (see `dsp::ramp`) each
time the previous ramp finishes.

Vocabulary
----------

  basic amp   What the note would sound at with a flat envelope: 155 minus
              the master volume, part level, expression, rhythm level, key
              bias, partial level and velocity subtractions, floored at 0 and
              capped at 155. Resonance takes a little more off afterwards.
              A ring-modulation slave skips the volume stages; its loudness
              belongs to its master.

  env level   0..100 added on top of the basic amp for each phase.

  phase       Which envelope point the ramp is currently heading for.


Phases
------

    Basic ─→ Attack ─→ Phase2 ─→ Phase3 ─→ Phase4 ─→ Sustain ─→ Release ─→ Dead
      │                  ↑                              │  ↑
      └── attack time 0 ─┘              can't sustain ──┘  └── start_decay
                                        (straight to Release)

Basic is only the instant after reset: the register is told to go "down as
fast as possible" from zero, which snaps it to the basic amp and fires the
first interrupt.

Each interrupt advances one phase and programs the next ramp:

    target    = basic amp + env level of the new phase
    increment = log_time[|target - previous target|] - env time

Attack time is shortened by velocity, every other phase by key follow. A
zero-length step (same target twice) is nudged by one unit so the table is
never indexed at 0.

Sustain writes a zero increment: the register parks on its target and no
interrupt ever fires. Release ramps to 0; its interrupt kills the partial.


Output
------

The register holds a log-scaled level. It is mapped to a linear gain with

    amp = 2^(current / TARGET_MULT / 16 - 1) / 65536
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TvaPhase {
    Basic,
    Attack,
    Phase2,
    Phase3,
    /// Ramp into the sustain level.
    Phase4,
    Sustain,
    Release,
    Dead,
}

impl TvaPhase {
    fn next(self) -> Self {
        match self {
            TvaPhase::Basic => TvaPhase::Attack,
            TvaPhase::Attack => TvaPhase::Phase2,
            TvaPhase::Phase2 => TvaPhase::Phase3,
            TvaPhase::Phase3 => TvaPhase::Phase4,
            TvaPhase::Phase4 => TvaPhase::Sustain,
            TvaPhase::Sustain => TvaPhase::Release,
            TvaPhase::Release | TvaPhase::Dead => TvaPhase::Dead,
        }
    }

    /// Envelope point (time and level index) a ramping phase heads for.
    fn env_point(self) -> Option<usize> {
        match self {
            TvaPhase::Attack => Some(0),
            TvaPhase::Phase2 => Some(1),
            TvaPhase::Phase3 => Some(2),
            TvaPhase::Phase4 => Some(3),
            _ => None,
        }
    }
}

const MAX_BASIC_AMP: i32 = 155;

#[derive(Debug, Clone)]
pub struct Tva {
    tables: Arc<Tables>,
    ramp: Ramp,
    phase: TvaPhase,
    playing: bool,
    // Set by recalc_sustain: the next interrupt re-enters sustain.
    sustain_reramp: bool,
    ring_slave: bool,
    key_time_subtraction: i32,
    bias_amp_subtraction: i32,
    velo_amp_subtraction: i32,
}

impl Tva {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self {
            tables,
            ramp: Ramp::new(),
            phase: TvaPhase::Dead,
            playing: false,
            sustain_reramp: false,
            ring_slave: false,
            key_time_subtraction: 0,
            bias_amp_subtraction: 0,
            velo_amp_subtraction: 0,
        }
    }

    pub fn reset(&mut self, note: &NoteContext, ring_slave: bool) {
        let param = &note.patch.partial_param;
        let key = note.key();

        self.playing = true;
        self.sustain_reramp = false;
        self.ring_slave = ring_slave;
        self.key_time_subtraction = key_time_subtraction(param.tva.env_time_keyfollow, key);
        self.bias_amp_subtraction = bias_amp_subtractions(param, key);
        self.velo_amp_subtraction =
            velo_amp_subtraction(param.tva.velo_sensitivity, note.velocity());

        let mut target = self.basic_amp(note);
        if param.tva.env_time[0] == 0 {
            // No attack: start on the attack level and let the first
            // interrupt head straight for phase 2.
            target += param.tva.env_level[0] as i32;
            self.phase = TvaPhase::Attack;
        } else {
            self.phase = TvaPhase::Basic;
        }

        self.ramp.set_current(0);
        self.ramp.set_target(target.clamp(0, 255) as u8);
        self.ramp.set_increment(DESCENDING | 0x7F, &self.tables);
    }

    /// Advance one sample and return the linear amplitude.
    #[inline]
    pub fn next_amp(&mut self, note: &NoteContext) -> f32 {
        if self.ramp.step() {
            self.next_phase(note);
        }
        let level = self.ramp.current() as f32 / TARGET_MULT as f32;
        fast_exp2(level / 16.0 - 1.0) / 65536.0
    }

    pub fn start_decay(&mut self, note: &NoteContext) {
        if self.phase >= TvaPhase::Release {
            return;
        }
        self.phase = TvaPhase::Release;
        self.sustain_reramp = false;

        let release_time = note.patch.partial_param.tva.env_time[4];
        let increment = if release_time == 0 {
            1
        } else {
            0u8.wrapping_sub(release_time)
        };
        self.ramp.set_increment(increment, &self.tables);
        self.ramp.set_target(0);
    }

    /// Re-aim a sustaining envelope after a level change (expression,
    /// volume). Does nothing outside sustain.
    pub fn recalc_sustain(&mut self, note: &NoteContext) {
        let sustain_level = note.patch.partial_param.tva.env_level[3];
        if self.phase != TvaPhase::Sustain || sustain_level == 0 {
            return;
        }

        let target = (self.basic_amp(note) + sustain_level as i32).clamp(0, 255);
        let delta = target - self.ramp.target() as i32;
        let magnitude = self.tables.env_logarithmic_time[delta.unsigned_abs().min(255) as usize]
            .saturating_sub(2)
            .min(0x7F);
        let increment = if delta >= 0 {
            magnitude
        } else {
            magnitude | DESCENDING
        };

        self.ramp.set_increment(increment, &self.tables);
        self.ramp.set_target(target as u8);
        self.sustain_reramp = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn phase(&self) -> TvaPhase {
        self.phase
    }

    pub fn target(&self) -> u8 {
        self.ramp.target()
    }

    pub fn increment(&self) -> u8 {
        self.ramp.increment()
    }

    pub fn current(&self) -> u32 {
        self.ramp.current()
    }

    fn basic_amp(&self, note: &NoteContext) -> i32 {
        let tables = &self.tables;
        let param = &note.patch.partial_param;
        let level_sub = |level: u8| tables.level_to_amp_subtraction[level.min(100) as usize] as i32;

        // Applied in order; the amp bottoms out at 0 as soon as any stage
        // takes it negative.
        let mut stages = [0i32; 7];
        let mut count = 0;
        let mut push = |value: i32| {
            stages[count] = value;
            count += 1;
        };
        if !self.ring_slave {
            let master = note.part.master_volume().min(100) as usize;
            push(tables.master_vol_to_amp_subtraction[master] as i32);
            push(level_sub(note.part.patch_temp().output_level));
            push(level_sub(note.part.expression()));
            if let Some(rhythm) = note.rhythm {
                push(level_sub(rhythm.output_level));
            }
        }
        push(self.bias_amp_subtraction);
        push(level_sub(param.tva.level));
        push(self.velo_amp_subtraction);

        let mut amp = MAX_BASIC_AMP;
        for subtraction in &stages[..count] {
            amp -= subtraction;
            if amp < 0 {
                return 0;
            }
        }
        amp = amp.min(MAX_BASIC_AMP);
        (amp - (param.tvf.resonance >> 1) as i32).max(0)
    }

    fn next_phase(&mut self, note: &NoteContext) {
        if self.phase >= TvaPhase::Dead || !self.playing {
            debug!("TVA interrupt after the envelope finished (phase {:?})", self.phase);
            return;
        }

        let phase = if self.sustain_reramp {
            self.sustain_reramp = false;
            TvaPhase::Sustain
        } else {
            self.phase.next()
        };
        self.phase = phase;

        if phase == TvaPhase::Dead {
            self.playing = false;
            return;
        }

        let tva = &note.patch.partial_param.tva;
        let all_levels_zero =
            phase.env_point().is_some_and(|point| tva.env_level[point..].iter().all(|&l| l == 0));

        let mut target;
        let mut increment = 0u8;

        if all_levels_zero {
            target = 0;
        } else {
            target = self.basic_amp(note);
            match phase {
                TvaPhase::Sustain | TvaPhase::Release => {
                    if tva.env_level[3] == 0 {
                        self.phase = TvaPhase::Dead;
                        self.playing = false;
                        return;
                    }
                    if note.poly.can_sustain() {
                        target += tva.env_level[3] as i32;
                    } else {
                        self.phase = TvaPhase::Release;
                        target = 0;
                        increment = if tva.env_time[4] == 0 {
                            1
                        } else {
                            0u8.wrapping_sub(tva.env_time[4])
                        };
                    }
                }
                _ => {
                    if let Some(point) = phase.env_point() {
                        target += tva.env_level[point] as i32;
                    }
                }
            }
        }

        if let Some(point) = self.phase.env_point() {
            let mut time = tva.env_time[point] as i32;
            if self.phase == TvaPhase::Attack {
                let sensitivity = tva.env_time_velo_sensitivity.min(4);
                time -= (note.velocity() - 64) >> (6 - sensitivity);
                if time <= 0 && tva.env_time[point] != 0 {
                    time = 1;
                }
            } else {
                time -= self.key_time_subtraction;
            }

            let previous = self.ramp.target() as i32;
            let mut delta = target - previous;
            if time > 0 && delta == 0 {
                if target > 0 {
                    target -= 1;
                    delta = -1;
                } else {
                    target += 1;
                    delta = 1;
                }
            }
            increment = increment_for(delta, time, &self.tables);
        }

        self.ramp.set_target(target.clamp(0, 255) as u8);
        self.ramp.set_increment(increment, &self.tables);
    }
}

fn mult_bias(bias_level: u8, bias: i32) -> i32 {
    let coeff = BIAS_LEVEL_TO_AMP_SUBTRACTION_COEFF[(bias_level as usize).min(12)] as i32;
    (bias * coeff) >> 5
}

/// Keys away from a bias point on its affected side. Bit 6 of the point
/// selects keys above it; otherwise keys below it count.
pub(crate) fn bias_distance(bias_point: u8, key: i32) -> i32 {
    if bias_point & 0x40 == 0 {
        (bias_point as i32 + 33 - key).max(0)
    } else {
        (key - (bias_point as i32 - 31)).max(0)
    }
}

fn bias_amp_subtractions(param: &PartialParam, key: i32) -> i32 {
    let first = mult_bias(param.tva.bias_level1, bias_distance(param.tva.bias_point1, key));
    if first > 255 {
        return 255;
    }
    let second = mult_bias(param.tva.bias_level2, bias_distance(param.tva.bias_point2, key));
    if second > 255 {
        return 255;
    }
    (first + second).min(255)
}

fn velo_amp_subtraction(velo_sensitivity: u8, velocity: i32) -> i32 {
    let mult = velo_sensitivity as i32 - 50;
    let scaled = (mult * (velocity - 64)) << 2;
    mult.abs() - (scaled >> 8)
}

/// Envelope time shortening for keys above middle C (lengthening below).
pub(crate) fn key_time_subtraction(keyfollow: u8, key: i32) -> i32 {
    if keyfollow == 0 {
        return 0;
    }
    (key - 60) >> (5 - keyfollow.min(4))
}

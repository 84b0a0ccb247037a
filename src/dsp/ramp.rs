//! LA32 ramp register: a target and a signed increment.

/*
The Ramp Register
=================

The LA32 does not run envelopes itself. The control CPU writes two
memory-mapped registers per envelope, a TARGET and an INCREMENT, and the chip
slides its internal CURRENT value towards the target on its own. When the
target is reached the chip raises an interrupt and the CPU writes the next
pair. TVA (amplitude) and TVP (pitch) are both built on this.

Vocabulary
----------

  target      8-bit level the chip ramps towards. Internally scaled by
              TARGET_MULT so the current value has 23 bits of sub-step
              resolution.

  increment   8-bit code. Top bit = direction (set = downward). Low 7 bits
              = speed, mapped through an exponential table:

                  rate = 256 * 10^((magnitude - 1) / 26)

              so every 26 steps of magnitude is 10x faster.

  interrupt   Fired on the sample where current reaches (or would pass)
              the target. The owner reacts by writing a new target and
              increment ("next phase").


Step Rules
----------

    increment == 0          current = target, no interrupt
    downward:
        rate > current      current = target, interrupt
        current -= rate
        current <= target   current = target, interrupt
    upward:
        MAX - current < rate  current = target, interrupt
        current += rate
        current >= target   current = target, interrupt

Note the "already past the target" case: a downward ramp that starts below
its target snaps UP to it on the first step. Owners use this on purpose
("go downward as fast as possible" from 0 means "jump to the target now").
*/

use crate::tables::Tables;

/// Scale between the 8-bit target register and the internal current value.
pub const TARGET_MULT: u32 = 0x80_0000;
/// Largest internal current value.
pub const MAX_CURRENT: u32 = 0xFF * TARGET_MULT;

/// Direction bit of an increment code.
pub const DESCENDING: u8 = 0x80;

/// Increment code that covers `delta` target units at the speed implied by an
/// envelope time setting. The magnitude comes from the logarithmic-time table
/// minus the time, so longer times mean slower ramps.
///
/// A time of zero or less points the ramp the wrong way, which makes the
/// register jump to the new target and interrupt on the next step.
pub fn increment_for(delta: i32, time: i32, tables: &Tables) -> u8 {
    if time <= 0 {
        return if delta >= 0 { DESCENDING | 0x7F } else { 0x7F };
    }
    let log_time = tables.env_logarithmic_time[delta.unsigned_abs().min(255) as usize] as i32;
    let magnitude = (log_time - time).clamp(1, 0x7F) as u8;
    if delta < 0 {
        magnitude | DESCENDING
    } else {
        magnitude
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ramp {
    current: u32,
    target: u8,
    increment: u8,
    rate: u32,
}

impl Ramp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the increment register.
    pub fn set_increment(&mut self, code: u8, tables: &Tables) {
        self.increment = code;
        self.rate = tables.amp_increment_rate[(code & 0x7F) as usize];
    }

    /// Write the target register.
    pub fn set_target(&mut self, target: u8) {
        self.target = target;
    }

    /// Force the internal current value.
    pub fn set_current(&mut self, current: u32) {
        self.current = current.min(MAX_CURRENT);
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn increment(&self) -> u8 {
        self.increment
    }

    /// Per-sample rate derived from the magnitude bits.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Advance one sample. Returns `true` when the interrupt fires.
    #[inline]
    pub fn step(&mut self) -> bool {
        let target = self.target as u32 * TARGET_MULT;

        if self.increment == 0 {
            self.current = target;
            return false;
        }

        if self.increment & DESCENDING != 0 {
            if self.rate > self.current {
                self.current = target;
                return true;
            }
            self.current -= self.rate;
            if self.current <= target {
                self.current = target;
                return true;
            }
        } else {
            if MAX_CURRENT - self.current < self.rate {
                self.current = target;
                return true;
            }
            self.current += self.rate;
            if self.current >= target {
                self.current = target;
                return true;
            }
        }
        false
    }
}

use std::f32::consts::{PI, TAU};

use crate::dsp::fmath::{fast_cos, fast_sin};
use crate::tables::Tables;

/*
Synthesized Waveform
====================

The LA32's non-PCM partials are a square wave whose edges are shaped by the
filter. Instead of running a filter, the chip draws the edges directly: each
edge is half a cosine, and the cutoff decides how long that half cosine is.

Vocabulary
----------

  wave_len    Samples per cycle: sample_rate / freq, never below 4.

  cosine_len  Samples per edge. Half a cycle at or below cutoff code 128,
              halving every 16 codes above it. A short edge is a bright
              wave.

  pulse_len   Samples spent in the low half, from the duty-cycle table.

  resonance   A sine burst riding on each flat part of the wave at the edge
              frequency. It fades in over the first half of every edge so the
              wave never jumps.


One Cycle
---------

          hLen
        ┌──────┐
       ╱        ╲              (edges are half cosines of cosine_len)
      ╱          ╲
  ───┘            └──────────
       cos   high  cos   low

The read position is shifted by half an edge, so a cycle starts in the middle
of the first rising edge.

Below cutoff code 128 the hardware filter is undefined. The wave is left as
a pure cosine and attenuated instead:

    gain = 2^((code - 128) / 32)

Resonance is zero below 128, rises linearly from 128 to 138, and is at full
strength from 138 up.

Sawtooth mode multiplies the result by a cosine at the wave frequency.
*/

/// Resonance amplitude at the start of a flat segment.
const RES_AMP_MAX: f32 = 1.0;
/// How much of that amplitude decays away over one edge length.
const RES_AMP_FADE: f32 = 0.5;

/// Shortest cycle, in samples, the oscillator will draw.
const MIN_WAVE_LEN: f32 = 4.0;
/// Edges shorter than this alias too badly for a resonance burst.
const MIN_COSINE_LEN: f32 = 2.0;

/// Cutoff code below which the wave is attenuated instead of filtered.
pub const FILTER_FLOOR_CODE: u8 = 128;
/// Cutoff code from which resonance is no longer reduced.
pub const FULL_RESONANCE_CODE: u8 = 138;

/// Scale applied to the resonance amplitude at a given cutoff code.
pub fn resonance_gain(cutoff_code: u8) -> f32 {
    if cutoff_code < FILTER_FLOOR_CODE {
        0.0
    } else if cutoff_code < FULL_RESONANCE_CODE {
        1.0 - (FULL_RESONANCE_CODE - cutoff_code) as f32 / 10.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct SynthWave {
    wave_pos: f32,
    pulse_width: u8,
    sawtooth: bool,
    resonance: u8,
}

impl SynthWave {
    pub fn new(pulse_width: u8, sawtooth: bool, resonance: u8) -> Self {
        Self {
            wave_pos: 0.0,
            pulse_width,
            sawtooth,
            resonance: resonance.min(30),
        }
    }

    pub fn pulse_width(&self) -> u8 {
        self.pulse_width
    }

    pub fn is_sawtooth(&self) -> bool {
        self.sawtooth
    }

    /// Render one sample at `freq` Hz with the filter at `cutoff_code`, then
    /// advance. The result is saturated to [-1, 1].
    #[inline]
    pub fn next_sample(&mut self, freq: f32, cutoff_code: u8, tables: &Tables) -> f32 {
        let code = cutoff_code as usize;
        let wave_len = (tables.sample_rate / freq).max(MIN_WAVE_LEN);
        let wave_pos = self.wave_pos;

        let mut res_amp = tables.resonance_to_amp[self.resonance as usize];
        let mut cosine_len = 0.5 * wave_len * tables.cutoff_slope_factor[code];
        if cosine_len < MIN_COSINE_LEN {
            cosine_len = MIN_COSINE_LEN;
            res_amp = 0.0;
        }

        let pulse_len = tables.pulse_width_to_duty[self.pulse_width as usize] * wave_len;
        let low_len = (pulse_len - cosine_len).max(0.0);
        let high_len = (wave_len - low_len - 2.0 * cosine_len).max(0.0);

        let mut rel_pos = wave_pos + 0.5 * cosine_len;
        if rel_pos > wave_len {
            rel_pos -= wave_len;
        }

        let mut sample = if rel_pos < cosine_len {
            -fast_cos(PI * rel_pos / cosine_len)
        } else if rel_pos < cosine_len + high_len {
            1.0
        } else if rel_pos < 2.0 * cosine_len + high_len {
            fast_cos(PI * (rel_pos - (cosine_len + high_len)) / cosine_len)
        } else {
            -1.0
        };

        if cutoff_code < FILTER_FLOOR_CODE {
            sample *= tables.cutoff_attenuation[code];
        } else {
            // Resonance sine, counted from the middle of the first edge.
            let mut res_pos = wave_pos;
            let mut res_sign = 1.0;
            if res_pos >= cosine_len + high_len {
                res_sign = -1.0;
                res_pos -= cosine_len + high_len;
            }
            let res_sample = res_sign * fast_sin(PI * res_pos / cosine_len);
            let mut fade = RES_AMP_MAX - RES_AMP_FADE * (res_pos / cosine_len);

            // Negative while inside the first half of an edge.
            let mut edge_pos = wave_pos;
            if wave_pos >= wave_len - 0.5 * cosine_len {
                edge_pos -= wave_len;
            } else if wave_pos >= high_len + 0.5 * cosine_len {
                edge_pos -= cosine_len + high_len;
            }
            if edge_pos < 0.0 {
                fade *= 0.5 * (1.0 - fast_cos(PI * edge_pos / (0.5 * cosine_len)));
            }

            sample += res_sample * res_amp * resonance_gain(cutoff_code) * fade;
        }

        if self.sawtooth {
            sample *= fast_cos(TAU * wave_pos / wave_len);
        }

        self.wave_pos += 1.0;
        if self.wave_pos > wave_len {
            self.wave_pos -= wave_len;
        }

        sample.clamp(-1.0, 1.0)
    }
}

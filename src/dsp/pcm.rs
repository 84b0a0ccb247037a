use crate::rom::PcmWave;

/*
PCM Playback
============

A PCM partial replays a stretch of the sample ROM at a rate set by the
current pitch.

Vocabulary
----------

  position      Fractional read position in samples since the start of the
                wave. The integer part picks the sample, the fraction weights
                the interpolation.

  delta         How far the position moves per output sample:

                    delta = freq * 2048 / sample_rate

                The ROM waves are laid out so that 2048 positions per cycle
                of the pitch frequency plays the recorded pitch.

  looped        Looped waves wrap the position modulo their length. One-shot
                waves run off the end, and the partial dies the first time the
                integer position is past the last sample.


Interpolation
-------------

    s = a + (b - a) * frac(position)

where a is the sample under the position and b the one after it. For a
one-shot wave the sample after the last one is silence; for a looped wave it
is the first sample again.
*/

/// Read positions per cycle of the pitch frequency.
pub const PCM_POSITION_SCALE: f32 = 2048.0;

#[derive(Debug, Clone)]
pub struct PcmPlayer {
    wave: PcmWave,
    position: f32,
    int_position: usize,
}

impl PcmPlayer {
    pub fn new(wave: PcmWave) -> Self {
        Self {
            wave,
            position: 0.0,
            int_position: 0,
        }
    }

    pub fn wave(&self) -> PcmWave {
        self.wave
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn int_position(&self) -> usize {
        self.int_position
    }

    /// Past the end of a one-shot wave.
    pub fn is_exhausted(&self) -> bool {
        !self.wave.looped && self.int_position >= self.wave.len
    }

    /// Produce one interpolated sample from `data` (the wave's own samples) and
    /// advance. Returns `None` once a one-shot wave is exhausted.
    #[inline]
    pub fn next_sample(&mut self, freq: f32, sample_rate: f32, data: &[f32]) -> Option<f32> {
        if self.is_exhausted() {
            return None;
        }
        let len = self.wave.len;

        let first = data[self.int_position];
        let next = self.sample_at(self.int_position + 1, data);
        let sample = first + (next - first) * (self.position - self.int_position as f32);

        let delta = freq * PCM_POSITION_SCALE / sample_rate;
        let mut position = self.position + delta;
        let mut int_position = position as usize;
        if self.wave.looped {
            position %= len as f32;
            int_position %= len;
        }
        self.position = position;
        self.int_position = int_position;

        Some(sample)
    }

    fn sample_at(&self, position: usize, data: &[f32]) -> f32 {
        if position < self.wave.len {
            data[position]
        } else if self.wave.looped {
            data[position % self.wave.len]
        } else {
            0.0
        }
    }
}

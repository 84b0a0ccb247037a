//! PCM sample ROM.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Location of one waveform inside the sample ROM.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmWave {
    pub addr: usize,
    pub len: usize,
    pub looped: bool,
}

/// Flat sample data plus the per-waveform descriptors.
#[derive(Debug, Clone)]
pub struct PcmRom {
    samples: Vec<f32>,
    waves: Vec<PcmWave>,
}

impl PcmRom {
    /// Build a ROM from raw 16-bit samples. Every descriptor must lie inside
    /// the sample data.
    pub fn new(samples: &[i16], waves: Vec<PcmWave>) -> Result<Self> {
        for (index, wave) in waves.iter().enumerate() {
            if wave.len == 0 {
                return Err(Error::EmptyWave { index });
            }
            let end = wave.addr.checked_add(wave.len);
            if end.map_or(true, |end| end > samples.len()) {
                return Err(Error::WaveOutOfBounds {
                    index,
                    addr: wave.addr,
                    len: wave.len,
                    rom_len: samples.len(),
                });
            }
        }

        Ok(Self {
            samples: samples.iter().map(|&s| s as f32 / 32768.0).collect(),
            waves,
        })
    }

    /// Number of PCM programs the control ROM exposes.
    pub fn pcm_count(&self) -> usize {
        self.waves.len()
    }

    pub fn wave(&self, index: usize) -> Option<PcmWave> {
        self.waves.get(index).copied()
    }

    /// Samples of one waveform, normalised to [-1, 1).
    pub fn wave_data(&self, wave: &PcmWave) -> &[f32] {
        &self.samples[wave.addr..wave.addr + wave.len]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

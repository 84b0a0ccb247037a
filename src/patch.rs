//! Per-note timbre parameters.
//!
//! Field ranges follow the hardware's parameter memory; values outside them
//! are clamped where they index a table.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wave generator block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WgParam {
    /// 0..96, 48 = unison.
    pub pitch_coarse: u8,
    /// 0..100, 50 = no detune.
    pub pitch_fine: u8,
    /// Index into the key-follow multiplier table (0..16).
    pub pitch_keyfollow: u8,
    pub pitch_bender_enabled: bool,
    /// Bit 0 selects sawtooth; values above 1 pick the second PCM bank.
    pub waveform: u8,
    pub pcm_wave: u8,
    /// 0..100.
    pub pulse_width: u8,
    /// 0..14, 7 = no velocity influence.
    pub pulse_width_velo_sensitivity: u8,
}

impl Default for WgParam {
    fn default() -> Self {
        Self {
            pitch_coarse: 48,
            pitch_fine: 50,
            pitch_keyfollow: 11,
            pitch_bender_enabled: true,
            waveform: 0,
            pcm_wave: 0,
            pulse_width: 0,
            pulse_width_velo_sensitivity: 7,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchEnvParam {
    /// 0..10.
    pub depth: u8,
    /// 0..3.
    pub velo_sensitivity: u8,
    /// 0..4.
    pub time_keyfollow: u8,
    pub time: [u8; 4],
    /// 0..100, 50 = no offset. Index 3 is sustain, 4 the release end point.
    pub level: [u8; 5],
}

impl Default for PitchEnvParam {
    fn default() -> Self {
        Self {
            depth: 0,
            velo_sensitivity: 0,
            time_keyfollow: 0,
            time: [0; 4],
            level: [50; 5],
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchLfoParam {
    pub rate: u8,
    pub depth: u8,
    pub mod_sensitivity: u8,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvfParam {
    /// 0..100.
    pub cutoff: u8,
    /// 0..30.
    pub resonance: u8,
    pub keyfollow: u8,
    /// 0..127. Bit 6 flips the side of the bias point that is affected.
    pub bias_point: u8,
    /// 0..14, 7 = no bias.
    pub bias_level: u8,
    pub env_depth: u8,
    pub env_velo_sensitivity: u8,
    pub env_depth_keyfollow: u8,
    pub env_time_keyfollow: u8,
    pub env_time: [u8; 5],
    pub env_level: [u8; 4],
}

impl Default for TvfParam {
    fn default() -> Self {
        Self {
            cutoff: 100,
            resonance: 0,
            keyfollow: 3,
            bias_point: 64,
            bias_level: 7,
            env_depth: 0,
            env_velo_sensitivity: 0,
            env_depth_keyfollow: 0,
            env_time_keyfollow: 0,
            env_time: [0; 5],
            env_level: [100; 4],
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvaParam {
    /// 0..100.
    pub level: u8,
    /// 0..100, 50 = velocity has no effect.
    pub velo_sensitivity: u8,
    pub bias_point1: u8,
    /// 0..12.
    pub bias_level1: u8,
    pub bias_point2: u8,
    pub bias_level2: u8,
    /// 0..4.
    pub env_time_keyfollow: u8,
    /// 0..4.
    pub env_time_velo_sensitivity: u8,
    /// Attack, phase 2, phase 3, phase 4, release.
    pub env_time: [u8; 5],
    /// Attack, phase 2, phase 3, sustain.
    pub env_level: [u8; 4],
}

impl Default for TvaParam {
    fn default() -> Self {
        Self {
            level: 100,
            velo_sensitivity: 50,
            bias_point1: 64,
            bias_level1: 12,
            bias_point2: 64,
            bias_level2: 12,
            env_time_keyfollow: 0,
            env_time_velo_sensitivity: 0,
            env_time: [1, 1, 1, 1, 1],
            env_level: [100, 100, 100, 100],
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialParam {
    pub wg: WgParam,
    pub pitch_env: PitchEnvParam,
    pub pitch_lfo: PitchLfoParam,
    pub tvf: TvfParam,
    pub tva: TvaParam,
}

/// Immutable per-note snapshot handed to a partial at start.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchCache {
    pub partial_param: PartialParam,
    /// 0 = independent, 1 = ring-mix, 2 = ring, 3 = split pan.
    pub structure_mix: u8,
    /// 0 = first partial of the structure, 1 = second.
    pub structure_position: u8,
    pub pcm_partial: bool,
    pub pcm: usize,
    pub waveform: u8,
    pub reverb: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchTemp {
    /// 0..14, 7 = centre, 14 = hard left.
    pub panpot: u8,
    /// 0..100.
    pub output_level: u8,
}

impl Default for PatchTemp {
    fn default() -> Self {
        Self {
            panpot: 7,
            output_level: 100,
        }
    }
}

/// Rhythm-key overrides; when present they replace the part's pan and add an
/// extra level stage.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmTemp {
    pub panpot: u8,
    pub output_level: u8,
    pub reverb: bool,
}

impl Default for RhythmTemp {
    fn default() -> Self {
        Self {
            panpot: 7,
            output_level: 100,
            reverb: false,
        }
    }
}

//! Lookup tables shared by every partial.
//!
//! Built once per sample rate and handed out behind an `Arc`; nothing in here
//! changes after construction.

use std::f32::consts::TAU;

/// Pitch code of middle C (key 60).
pub const MIDDLE_C_PITCH: i32 = 0x8000;
/// Pitch units per octave.
pub const PITCH_PER_OCTAVE: i32 = 4096;
pub const MIDDLE_C: i32 = 60;
const MIDDLE_C_FREQ: f32 = 261.625_58;

// Matches a ROM table; no closed form known.
pub const BIAS_LEVEL_TO_AMP_SUBTRACTION_COEFF: [u8; 13] =
    [255, 187, 137, 100, 74, 54, 40, 29, 21, 15, 10, 5, 0];

/// Key-follow settings 0..16 as multiples of 1/8 octave per octave.
/// The last two entries (s1, s2) behave like 2 on the partials we emulate.
pub const KEYFOLLOW_MULT_X8: [i32; 17] = [-8, -4, -2, 0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 16, 16, 16];

pub struct Tables {
    pub sample_rate: f32,
    pub pitch_to_freq: Box<[f32]>,
    pub level_to_amp_subtraction: [u8; 101],
    pub master_vol_to_amp_subtraction: [u8; 101],
    pub env_logarithmic_time: [u8; 256],
    pub amp_increment_rate: [u32; 128],
    pub pulse_width_100_to_255: [u8; 101],
    pub pulse_width_to_duty: [f32; 256],
    pub cutoff_attenuation: [f32; 256],
    pub cutoff_slope_factor: [f32; 256],
    pub resonance_to_amp: [f32; 31],
    pub env_time_to_samples: [u32; 101],
    pub env_delta_max_time: [u8; 101],
    pub lfo_rate_to_phase_inc: [f32; 101],
}

impl Tables {
    pub fn new(sample_rate: f32) -> Self {
        let pitch_to_freq = (0..=u16::MAX as i32)
            .map(|pitch| {
                let octaves = (pitch - MIDDLE_C_PITCH) as f32 / PITCH_PER_OCTAVE as f32;
                MIDDLE_C_FREQ * octaves.exp2()
            })
            .collect();

        let mut level_to_amp_subtraction = [0u8; 101];
        for (level, entry) in level_to_amp_subtraction.iter_mut().enumerate() {
            let value = (2.0 - (level as f32 + 1.0).log10()) * 128.0;
            *entry = ((value + 1.0) as i32).min(255) as u8;
        }

        let mut master_vol_to_amp_subtraction = [255u8; 101];
        for volume in 1..=100 {
            master_vol_to_amp_subtraction[volume] =
                (106.31 - 16.0 * (volume as f32).log2()) as u8;
        }

        let mut env_logarithmic_time = [64u8; 256];
        for i in 1..256 {
            env_logarithmic_time[i] = (64.0 + (i as f32).log2() * 8.0).ceil() as u8;
        }

        let mut amp_increment_rate = [0u32; 128];
        for (magnitude, entry) in amp_increment_rate.iter_mut().enumerate() {
            *entry = (10f32.powf((magnitude as f32 - 1.0) / 26.0) * 256.0) as u32;
        }

        let mut pulse_width_100_to_255 = [0u8; 101];
        for (width, entry) in pulse_width_100_to_255.iter_mut().enumerate() {
            *entry = (width as f32 * 255.0 / 100.0 + 0.5) as u8;
        }

        // Sample-analysis curve, scaled so code 255 lands on a 97% duty cycle.
        let mut pulse_width_to_duty = [0.5f32; 256];
        for code in 129..256 {
            let t = (code - 128) as f32 / 127.0;
            pulse_width_to_duty[code] = 0.5 + 0.47 * t * (2.478 - t) / 1.478;
        }

        let mut cutoff_attenuation = [1.0f32; 256];
        let mut cutoff_slope_factor = [1.0f32; 256];
        for code in 0..256 {
            let relative = code as f32 - 128.0;
            if relative < 0.0 {
                cutoff_attenuation[code] = (relative / 32.0).exp2();
            } else {
                cutoff_slope_factor[code] = (-relative / 16.0).exp2();
            }
        }

        let mut resonance_to_amp = [0f32; 31];
        for (resonance, entry) in resonance_to_amp.iter_mut().enumerate() {
            *entry = (-9.0 * (1.0 - resonance as f32 / 30.0)).exp2();
        }

        let mut env_time_to_samples = [1u32; 101];
        for (time, entry) in env_time_to_samples.iter_mut().enumerate() {
            let millis = (time as f32 / 8.0).exp2() - 1.0;
            *entry = ((millis * sample_rate / 1000.0).round() as u32).max(1);
        }

        let mut env_delta_max_time = [0u8; 101];
        for (delta, entry) in env_delta_max_time.iter_mut().enumerate() {
            *entry = (12.0 * (delta as f32 + 1.0).log2()).ceil().min(100.0) as u8;
        }

        let mut lfo_rate_to_phase_inc = [0f32; 101];
        for (rate, entry) in lfo_rate_to_phase_inc.iter_mut().enumerate() {
            let hz = 0.1 * (rate as f32 / 16.0).exp2();
            *entry = TAU * hz / sample_rate;
        }

        Self {
            sample_rate,
            pitch_to_freq,
            level_to_amp_subtraction,
            master_vol_to_amp_subtraction,
            env_logarithmic_time,
            amp_increment_rate,
            pulse_width_100_to_255,
            pulse_width_to_duty,
            cutoff_attenuation,
            cutoff_slope_factor,
            resonance_to_amp,
            env_time_to_samples,
            env_delta_max_time,
            lfo_rate_to_phase_inc,
        }
    }

    #[inline]
    pub fn freq(&self, pitch: u16) -> f32 {
        self.pitch_to_freq[pitch as usize]
    }
}

impl std::fmt::Debug for Tables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables")
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

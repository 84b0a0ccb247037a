#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::MAX_PARTIALS;

/// Native output rate of the emulated hardware.
pub const DEFAULT_SAMPLE_RATE: f32 = 32_000.0;

const MIN_SAMPLE_RATE: f32 = 8_000.0;
const MAX_SAMPLE_RATE: f32 = 192_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: f32,
    pub partial_count: usize,
}

impl SynthConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite()
            || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate)
        {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.partial_count == 0 || self.partial_count > MAX_PARTIALS {
            return Err(Error::InvalidPartialCount(self.partial_count));
        }
        Ok(())
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            partial_count: MAX_PARTIALS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SynthConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_sample_rates() {
        for rate in [0.0, -1.0, f32::NAN, f32::INFINITY, 500_000.0] {
            let config = SynthConfig::with_sample_rate(rate);
            assert!(
                matches!(config.validate(), Err(Error::InvalidSampleRate(_))),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_partial_counts() {
        for count in [0, MAX_PARTIALS + 1] {
            let config = SynthConfig {
                partial_count: count,
                ..SynthConfig::default()
            };
            assert_eq!(config.validate(), Err(Error::InvalidPartialCount(count)));
        }
    }
}

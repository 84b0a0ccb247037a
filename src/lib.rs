pub mod config;
pub mod dsp; // Fast math, ramp register, oscillators, mixdown
pub mod error;
pub mod patch;
pub mod rom;
pub mod synth; // Envelopes, partials and the partial pool
pub mod tables;

pub use config::SynthConfig;
pub use error::{Error, Result};

/// Largest number of frames a partial renders per call.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Upper bound on the partial pool.
pub const MAX_PARTIALS: usize = 32;

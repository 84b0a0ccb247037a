//! Low-level DSP primitives the partials are built from.
//!
//! Everything here is allocation-free and realtime-safe. The modules only know
//! about numbers and lookup tables; note state lives in `synth`.

/// Polynomial approximations of exp2 / sin / cos.
pub mod fmath;
/// Mono-to-stereo mixdown and ring modulation.
pub mod mix;
/// PCM read head with linear interpolation.
pub mod pcm;
/// LA32 target/increment ramp register.
pub mod ramp;
/// Cosine-segment pulse/sawtooth oscillator with resonance.
pub mod wave;

pub use pcm::PcmPlayer;
pub use ramp::Ramp;
pub use wave::SynthWave;

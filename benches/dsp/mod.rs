//! Benchmarks for per-sample primitives.

mod envelopes;
mod fmath;
mod wave;

pub use envelopes::bench_envelopes;
pub use fmath::bench_fmath;
pub use wave::bench_wave;

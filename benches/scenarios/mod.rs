//! Whole-engine scenario benchmarks.
//!
//! These render the partial pool the way a host would, one interleaved
//! block per call, with realistic partial counts and structures.

mod pool;

pub use pool::bench_pool;

use thiserror::Error;

/// Construction-time failures. Rendering itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("sample rate {0} Hz is outside the supported range")]
    InvalidSampleRate(f32),

    #[error("partial count {0} must be between 1 and {max}", max = crate::MAX_PARTIALS)]
    InvalidPartialCount(usize),

    #[error("PCM wave {index} ({addr}+{len}) runs past the end of a {rom_len}-sample ROM")]
    WaveOutOfBounds {
        index: usize,
        addr: usize,
        len: usize,
        rom_len: usize,
    },

    #[error("PCM wave {index} has zero length")]
    EmptyWave { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

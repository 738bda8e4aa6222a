use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("Invalid random bits length {bits}, expected {min}..={max}")]
    InvalidRandomBitsLength { bits: u64, min: u64, max: u64 },

    #[error("Secure random source failed: {0}")]
    RandomSource(String),
}

impl CommonError {
    pub fn invalid_random_bits_length(bits: u64, range: RangeInclusive<u64>) -> CommonError {
        CommonError::InvalidRandomBitsLength {
            bits,
            min: *range.start(),
            max: *range.end(),
        }
    }

    pub fn random_source(src: rand::Error) -> CommonError {
        CommonError::RandomSource(src.to_string())
    }
}

impl From<rand::Error> for CommonError {
    fn from(src: rand::Error) -> Self {
        Self::random_source(src)
    }
}

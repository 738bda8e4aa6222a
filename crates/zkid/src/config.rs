use crate::protocol::MAX_CHALLENGE_WIDTH;
use crate::{Result, ZkidError};
use common::miller_rabin::DEFAULT_REPS;
use common::random::RANDOM_BITS_RANGE;

/// Parameters of one identification session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bit length of the public modulus n. The factorization only has to
    /// resist attack for the lifetime of the proof; 1024 or more is
    /// recommended.
    pub modulus_bits: u64,
    /// Number of secrets k, which is also the width of every challenge. A
    /// forger survives one round with probability 2^-k.
    pub challenge_width: usize,
    /// Number of rounds t. The forgery bound for the session is 2^-(k*t).
    pub rounds: usize,
    /// Smallest accepted k*t. The session fails with
    /// `InsufficientConfidence` below it.
    pub min_confidence_bits: u64,
    /// Miller-Rabin witnesses per prime candidate, bounding false positives
    /// at 4^-reps.
    pub primality_rounds: usize,
}

impl SessionConfig {
    /// Below this, both factors would be caught by the small-factor filter.
    pub const MIN_MODULUS_BITS: u64 = 32;
    /// Commitment secrets are drawn at the full modulus width.
    pub const MAX_MODULUS_BITS: u64 = *RANDOM_BITS_RANGE.end();

    pub fn validate(&self) -> Result<()> {
        if self.modulus_bits < Self::MIN_MODULUS_BITS {
            return Err(ZkidError::InvalidConfig(format!(
                "modulus must have at least {} bits, got {}",
                Self::MIN_MODULUS_BITS,
                self.modulus_bits
            )));
        }
        if self.modulus_bits > Self::MAX_MODULUS_BITS {
            return Err(ZkidError::InvalidConfig(format!(
                "modulus must have at most {} bits, got {}",
                Self::MAX_MODULUS_BITS,
                self.modulus_bits
            )));
        }
        if self.challenge_width == 0 || self.challenge_width > MAX_CHALLENGE_WIDTH {
            return Err(ZkidError::InvalidConfig(format!(
                "challenge width must be within 1..={MAX_CHALLENGE_WIDTH}, got {}",
                self.challenge_width
            )));
        }
        if self.rounds == 0 {
            return Err(ZkidError::invalid_config("at least one round is required"));
        }
        if self.primality_rounds == 0 {
            return Err(ZkidError::invalid_config(
                "at least one primality witness is required",
            ));
        }
        Ok(())
    }

    /// Exponent reached when every round is accepted.
    pub fn target_confidence_bits(&self) -> u64 {
        (self.challenge_width as u64) * (self.rounds as u64)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            modulus_bits: 1024,
            challenge_width: 16,
            rounds: 4,
            min_confidence_bits: 20,
            primality_rounds: DEFAULT_REPS,
        }
    }
}

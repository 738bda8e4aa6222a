use common::CommonError;
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZkidError {
    #[error("Random source error: {0}")]
    RandomSource(CommonError),

    #[error("Invalid random bits length {bits}, expected {min}..={max}")]
    InvalidRandomBitsLength { bits: u64, min: u64, max: u64 },

    #[error("Protocol rejection in round {round}: commitment {commitment}, verifier computed {expected}")]
    ProtocolRejection {
        round: usize,
        commitment: BigUint,
        expected: BigUint,
    },

    #[error("Insufficient confidence: 2^{exponent} is below the required 2^{threshold}")]
    InsufficientConfidence { exponent: u64, threshold: u64 },

    #[error("Impossible inverse: {value} has no inverse modulo the public modulus")]
    ImpossibleInverse { value: BigUint },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ZkidError {
    pub fn invalid_config(reason: &str) -> ZkidError {
        ZkidError::InvalidConfig(reason.to_owned())
    }

    /// Short name of the error kind, used in process exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ZkidError::RandomSource(_) => "RandomSourceError",
            ZkidError::InvalidRandomBitsLength { .. } => "InvalidRandomBitsLength",
            ZkidError::ProtocolRejection { .. } => "ProtocolRejection",
            ZkidError::InsufficientConfidence { .. } => "InsufficientConfidence",
            ZkidError::ImpossibleInverse { .. } => "ImpossibleInverseError",
            ZkidError::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

impl From<CommonError> for ZkidError {
    fn from(src: CommonError) -> Self {
        match src {
            CommonError::InvalidRandomBitsLength { bits, min, max } => {
                ZkidError::InvalidRandomBitsLength { bits, min, max }
            }
            other => ZkidError::RandomSource(other),
        }
    }
}

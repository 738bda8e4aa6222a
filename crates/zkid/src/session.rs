use crate::config::SessionConfig;
use crate::key::KeyPair;
use crate::modulus::BlumModulus;
use crate::protocol::{execute_round, Prover, Verdict, Verifier};
use crate::{Result, ZkidError};
use common::random::SecureRandom;
use common::time::time;
use num_bigint::BigUint;
use num_traits::One;
use slog::{debug, info, o, warn, Logger};

/// Security exponent gathered so far: a forger survives with probability
/// `2^-bits`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Confidence(u64);

impl Confidence {
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// `2^bits`, the "1 in N" form of the forgery bound.
    pub fn denominator(&self) -> BigUint {
        BigUint::one() << self.0
    }

    fn accept_round(&mut self, width: usize) {
        self.0 += width as u64;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub rounds: usize,
    pub confidence: Confidence,
}

/// Runs complete identification sessions with one fixed configuration.
pub struct Orchestrator {
    config: SessionConfig,
    logger: Logger,
}

impl Orchestrator {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: Logger::root(slog::Discard, o!()),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Generates a fresh modulus and a key pair of `challenge_width` secrets.
    pub fn generate_identity<R: SecureRandom + ?Sized>(&self, rng: &mut R) -> Result<KeyPair> {
        let bits = self.config.modulus_bits;
        let reps = Some(self.config.primality_rounds);
        debug!(self.logger, "generating modulus"; "bits" => bits);
        let (modulus, dur) = time(|| BlumModulus::generate(rng, bits, reps));
        let modulus = modulus?;
        info!(self.logger, "modulus generated";
            "bits" => modulus.bits(), "elapsed_ms" => dur.as_millis() as u64);

        let key_pair = KeyPair::generate(rng, modulus, self.config.challenge_width)?;
        info!(self.logger, "key pair generated"; "secrets" => key_pair.public_key().len());
        Ok(key_pair)
    }

    /// Runs an honest session for `key_pair`.
    pub fn run<R: SecureRandom + ?Sized>(
        &self,
        rng: &mut R,
        key_pair: &KeyPair,
    ) -> Result<SessionReport> {
        let prover = Prover::new(key_pair.private_key(), key_pair.n(), self.config.modulus_bits);
        let verifier = Verifier::new(key_pair.public_key(), key_pair.n());
        self.run_with(rng, &prover, &verifier)
    }

    /// Runs `rounds` rounds between `prover` and `verifier`. The first
    /// rejected round ends the session.
    pub fn run_with<R: SecureRandom + ?Sized>(
        &self,
        rng: &mut R,
        prover: &Prover,
        verifier: &Verifier,
    ) -> Result<SessionReport> {
        let width = self.config.challenge_width;
        if verifier.width() != width {
            return Err(ZkidError::InvalidConfig(format!(
                "public key has {} entries, challenge width is {width}",
                verifier.width()
            )));
        }

        let mut confidence = Confidence::default();
        for round in 0..self.config.rounds {
            let logger = self.logger.new(o!("round" => round));
            let transcript = execute_round(prover, verifier, rng, &logger)?;
            if transcript.verdict == Verdict::Rejected {
                warn!(logger, "round rejected");
                return Err(ZkidError::ProtocolRejection {
                    round,
                    commitment: transcript.commitment.value().clone(),
                    expected: transcript.expected,
                });
            }
            confidence.accept_round(width);
            info!(logger, "round accepted"; "confidence_bits" => confidence.bits());
        }

        let threshold = self.config.min_confidence_bits;
        if confidence.bits() < threshold {
            warn!(self.logger, "confidence below threshold";
                "confidence_bits" => confidence.bits(), "threshold_bits" => threshold);
            return Err(ZkidError::InsufficientConfidence {
                exponent: confidence.bits(),
                threshold,
            });
        }

        info!(self.logger, "session accepted"; "confidence_bits" => confidence.bits());
        Ok(SessionReport {
            rounds: self.config.rounds,
            confidence,
        })
    }
}

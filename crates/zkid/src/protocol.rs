use crate::key::{PrivateKey, PublicKey};
use crate::Result;
use common::mod_int::ModInt;
use common::random::{get_random_int, SecureRandom};
use num_bigint::BigUint;
use slog::{debug, Logger};
use std::fmt;

/// A challenge is a bit vector packed into a `u64`.
pub const MAX_CHALLENGE_WIDTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Committed,
    Challenged,
    Responded,
    Verified,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Committed => "committed",
            RoundPhase::Challenged => "challenged",
            RoundPhase::Responded => "responded",
            RoundPhase::Verified => "verified",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// `X = R^2 mod n`, sent by the prover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment(BigUint);

/// `Y`, the prover's answer to a challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response(BigUint);

macro_rules! biguint_message {
    ($name:ident) => {
        impl $name {
            pub fn value(&self) -> &BigUint {
                &self.0
            }
        }

        impl From<BigUint> for $name {
            fn from(v: BigUint) -> Self {
                Self(v)
            }
        }
    };
}
biguint_message!(Commitment);
biguint_message!(Response);

/// The verifier's `k` bit challenge. Bit `i` selects key position `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Challenge {
    bits: u64,
    width: usize,
}

impl Challenge {
    /// Widths above [`MAX_CHALLENGE_WIDTH`] are clamped to it.
    pub fn new(bits: u64, width: usize) -> Self {
        let width = width.min(MAX_CHALLENGE_WIDTH);
        let bits = if width == MAX_CHALLENGE_WIDTH {
            bits
        } else {
            bits & ((1_u64 << width) - 1)
        };
        Self { bits, width }
    }

    /// Uniform over `[0, 2^width)`.
    pub fn random<R: SecureRandom + ?Sized>(rng: &mut R, width: usize) -> Result<Self> {
        let width = width.min(MAX_CHALLENGE_WIDTH);
        if width == 0 {
            return Ok(Self::new(0, 0));
        }
        let v = rng.secure_random(width as u64 - 1)?;
        let bits = v.iter_u64_digits().next().unwrap_or(0);
        Ok(Self::new(bits, width))
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_set(&self, i: usize) -> bool {
        i < self.width
            && u32::try_from(i)
                .ok()
                .and_then(|i| self.bits.checked_shr(i))
                .map_or(false, |b| b & 1 == 1)
    }

    /// Entries of `values` whose position is selected by this challenge.
    fn select<'a>(&'a self, values: &'a [BigUint]) -> impl Iterator<Item = &'a BigUint> + 'a {
        values
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.is_set(*i))
            .map(|(_, v)| v)
    }
}

pub struct Prover<'a> {
    private_key: &'a PrivateKey,
    mod_n: ModInt,
    bits: u64,
}

/// Prover state between commit and respond. It owns `R` and is consumed by
/// [`PendingRound::respond`], so a commitment secret answers one challenge
/// only.
pub struct PendingRound {
    secret: BigUint,
    commitment: Commitment,
}

impl<'a> Prover<'a> {
    /// `bits` is the width of each commitment secret `R`.
    pub fn new(private_key: &'a PrivateKey, n: &BigUint, bits: u64) -> Self {
        Self {
            private_key,
            mod_n: ModInt::new(n),
            bits,
        }
    }

    pub fn commit<R: SecureRandom + ?Sized>(&self, rng: &mut R) -> Result<PendingRound> {
        let secret = get_random_int(rng, self.bits)?;
        let commitment = Commitment(self.mod_n.square(&secret));
        Ok(PendingRound { secret, commitment })
    }

    /// `Y = R * prod(s_i for each set bit i of c) mod n`.
    pub fn witness(&self, r: &BigUint, challenge: &Challenge) -> BigUint {
        let selected = self.mod_n.product(challenge.select(self.private_key.values()));
        self.mod_n.mul(r, &selected)
    }
}

impl PendingRound {
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn respond(self, prover: &Prover, challenge: &Challenge) -> Response {
        Response(prover.witness(&self.secret, challenge))
    }
}

pub struct Verifier<'a> {
    public_key: &'a PublicKey,
    mod_n: ModInt,
    width: usize,
}

impl<'a> Verifier<'a> {
    pub fn new(public_key: &'a PublicKey, n: &BigUint) -> Self {
        Self {
            public_key,
            mod_n: ModInt::new(n),
            width: public_key.len(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// A fresh challenge, issued only once a commitment has been received.
    pub fn challenge<R: SecureRandom + ?Sized>(
        &self,
        rng: &mut R,
        _commitment: &Commitment,
    ) -> Result<Challenge> {
        Challenge::random(rng, self.width)
    }

    /// `Y^2 * prod(v_i for each set bit i of c) mod n`.
    pub fn expected(&self, response: &Response, challenge: &Challenge) -> BigUint {
        let selected = self.mod_n.product(challenge.select(self.public_key.values()));
        self.mod_n.mul(&self.mod_n.square(&response.0), &selected)
    }

    pub fn verify(
        &self,
        commitment: &Commitment,
        challenge: &Challenge,
        response: &Response,
    ) -> Verdict {
        Self::judge(commitment, &self.expected(response, challenge))
    }

    /// Accepts iff the recomputed value matches the commitment.
    pub fn judge(commitment: &Commitment, expected: &BigUint) -> Verdict {
        if expected == &commitment.0 {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

/// Everything exchanged in one round plus the verifier's view of it.
#[derive(Clone, Debug)]
pub struct Transcript {
    pub commitment: Commitment,
    pub challenge: Challenge,
    pub response: Response,
    pub expected: BigUint,
    pub verdict: Verdict,
}

/// Drives one round from `Idle` to `Verified`.
pub fn execute_round<R: SecureRandom + ?Sized>(
    prover: &Prover,
    verifier: &Verifier,
    rng: &mut R,
    logger: &Logger,
) -> Result<Transcript> {
    debug!(logger, "round started"; "phase" => %RoundPhase::Idle);

    let pending = prover.commit(rng)?;
    let commitment = pending.commitment().clone();
    debug!(logger, "commitment sent"; "phase" => %RoundPhase::Committed);

    let challenge = verifier.challenge(rng, &commitment)?;
    debug!(logger, "challenge sent";
        "phase" => %RoundPhase::Challenged, "challenge" => challenge.bits());

    let response = pending.respond(prover, &challenge);
    debug!(logger, "response sent"; "phase" => %RoundPhase::Responded);

    let expected = verifier.expected(&response, &challenge);
    let verdict = Verifier::judge(&commitment, &expected);
    debug!(logger, "round verified";
        "phase" => %RoundPhase::Verified, "verdict" => ?verdict);

    Ok(Transcript {
        commitment,
        challenge,
        response,
        expected,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;
    use crate::modulus::BlumModulus;
    use num_bigint::RandBigInt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rayon::prelude::{IntoParallelIterator, ParallelIterator};

    const BIT_LEN: u64 = 256;

    fn key_pair(rng: &mut StdRng, k: usize) -> KeyPair {
        let m = BlumModulus::generate(rng, BIT_LEN, None).unwrap();
        KeyPair::generate(rng, m, k).unwrap()
    }

    fn discard() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    #[test]
    fn challenge_bits() {
        let c = Challenge::new(0b1011, 3);
        assert_eq!(c.bits(), 0b011);
        assert!(c.is_set(0));
        assert!(c.is_set(1));
        assert!(!c.is_set(2));
        assert!(!c.is_set(3));

        let full = Challenge::new(u64::MAX, 64);
        assert!((0..64).all(|i| full.is_set(i)));
    }

    #[test]
    fn challenge_width_clamped() {
        let c = Challenge::new(1, MAX_CHALLENGE_WIDTH + 1);
        assert_eq!(c.width(), MAX_CHALLENGE_WIDTH);
        assert!(c.is_set(0));
        assert!(!c.is_set(64));
        assert!(!c.is_set(usize::MAX));

        let mut rng = StdRng::seed_from_u64(24);
        let c = Challenge::random(&mut rng, 100).unwrap();
        assert_eq!(c.width(), MAX_CHALLENGE_WIDTH);
    }

    #[test]
    fn judge_matches_verify() {
        let mut rng = StdRng::seed_from_u64(26);
        let kp = key_pair(&mut rng, 8);
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        let t = execute_round(&prover, &verifier, &mut rng, &discard()).unwrap();
        assert_eq!(
            verifier.verify(&t.commitment, &t.challenge, &t.response),
            Verifier::judge(&t.commitment, &t.expected)
        );
        let off_by_one = &t.expected + 1_u8;
        assert_eq!(
            Verifier::judge(&t.commitment, &off_by_one),
            Verdict::Rejected
        );
    }

    #[test]
    fn challenge_random_in_range() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut seen = [false; 8];
        for _ in 0..500 {
            let c = Challenge::random(&mut rng, 3).unwrap();
            assert!(c.bits() < 8);
            seen[c.bits() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));

        for _ in 0..100 {
            assert!(Challenge::random(&mut rng, 1).unwrap().bits() < 2);
            Challenge::random(&mut rng, 64).unwrap();
        }
    }

    #[test]
    fn commitment_is_square_of_secret() {
        let mut rng = StdRng::seed_from_u64(29);
        let kp = key_pair(&mut rng, 8);
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        let pending = prover.commit(&mut rng).unwrap();
        assert_eq!(pending.secret.bits(), BIT_LEN);
        assert_eq!(
            pending.commitment().value(),
            &(&pending.secret * &pending.secret % kp.n())
        );
    }

    #[test]
    fn oversized_commitment_secret() {
        let mut rng = StdRng::seed_from_u64(30);
        let kp = key_pair(&mut rng, 8);
        let prover = Prover::new(kp.private_key(), kp.n(), 20000);
        let err = prover.commit(&mut rng).err().unwrap();
        assert_eq!(err.kind(), "InvalidRandomBitsLength");
    }

    #[test]
    fn key_wider_than_challenge_never_reaches_a_round() {
        let mut rng = StdRng::seed_from_u64(32);
        let m = BlumModulus::generate(&mut rng, BIT_LEN, None).unwrap();
        let err = KeyPair::generate(&mut rng, m, MAX_CHALLENGE_WIDTH + 1).unwrap_err();
        assert_eq!(err.kind(), "InvalidConfig");

        let kp = key_pair(&mut rng, MAX_CHALLENGE_WIDTH);
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        let t = execute_round(&prover, &verifier, &mut rng, &discard()).unwrap();
        assert_eq!(t.verdict, Verdict::Accepted);
    }

    #[test]
    fn completeness_for_every_challenge() {
        const K: usize = 16;
        let mut rng = StdRng::seed_from_u64(31);
        let kp = key_pair(&mut rng, K);
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        let pending = prover.commit(&mut rng).unwrap();
        let x = pending.commitment().clone();
        let r = pending.secret;

        let failures = (0..(1_u64 << K))
            .into_par_iter()
            .filter(|c| {
                let challenge = Challenge::new(*c, K);
                let y = Response(prover.witness(&r, &challenge));
                verifier.verify(&x, &challenge, &y) != Verdict::Accepted
            })
            .count();
        assert_eq!(failures, 0);
    }

    #[test]
    fn honest_rounds_accepted() {
        let mut rng = StdRng::seed_from_u64(37);
        let kp = key_pair(&mut rng, 16);
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        for _ in 0..50 {
            let t = execute_round(&prover, &verifier, &mut rng, &discard()).unwrap();
            assert_eq!(t.verdict, Verdict::Accepted);
            assert_eq!(&t.expected, t.commitment.value());
        }
    }

    #[test]
    fn wrong_key_passes_only_empty_challenge() {
        const K: usize = 4;
        let mut rng = StdRng::seed_from_u64(41);
        let kp = key_pair(&mut rng, K);
        let other = KeyPair::generate(&mut rng, kp.modulus().clone(), K).unwrap();
        let prover = Prover::new(other.private_key(), kp.n(), BIT_LEN);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        for _ in 0..200 {
            let t = execute_round(&prover, &verifier, &mut rng, &discard()).unwrap();
            let expected = if t.challenge.bits() == 0 {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            };
            assert_eq!(t.verdict, expected);
        }
    }

    #[test]
    fn random_response_rejected() {
        let mut rng = StdRng::seed_from_u64(43);
        let kp = key_pair(&mut rng, 16);
        let verifier = Verifier::new(kp.public_key(), kp.n());
        let prover = Prover::new(kp.private_key(), kp.n(), BIT_LEN);
        for _ in 0..200 {
            let pending = prover.commit(&mut rng).unwrap();
            let challenge = verifier.challenge(&mut rng, pending.commitment()).unwrap();
            let y = Response(rng.gen_biguint_below(kp.n()));
            assert_eq!(
                verifier.verify(pending.commitment(), &challenge, &y),
                Verdict::Rejected
            );
        }
    }

    #[test]
    fn guessing_forger_succeeds_at_two_to_minus_k() {
        const K: usize = 4;
        const TRIALS: usize = 4000;
        let mut rng = StdRng::seed_from_u64(47);
        let kp = key_pair(&mut rng, K);
        let verifier = Verifier::new(kp.public_key(), kp.n());

        // The forger bets on a challenge and builds X from a random Y so
        // that the bet, and only the bet, verifies.
        let mut accepted = 0;
        for _ in 0..TRIALS {
            let guess = Challenge::random(&mut rng, K).unwrap();
            let y = Response(rng.gen_biguint_below(kp.n()));
            let x = Commitment(verifier.expected(&y, &guess));
            let challenge = verifier.challenge(&mut rng, &x).unwrap();
            if verifier.verify(&x, &challenge, &y) == Verdict::Accepted {
                accepted += 1;
            }
        }

        // mean 250, standard deviation about 15
        let mean = TRIALS >> K;
        assert!(accepted > mean - 90, "{accepted}");
        assert!(accepted < mean + 90, "{accepted}");
    }
}

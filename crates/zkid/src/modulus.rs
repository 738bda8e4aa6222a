use crate::Result;
use common::prime::choose_blum_prime;
use common::prime::small_factor::easy_to_factor;
use common::random::SecureRandom;
use num_bigint::BigUint;

/// A Blum integer `n = p * q` together with its factors.
///
/// Only `n` is public. The factors stay inside this value and are reachable
/// through [`BlumModulus::factors`] for the owner of the identity.
#[derive(Clone, PartialEq, Eq)]
pub struct BlumModulus {
    n: BigUint,
    p: BigUint,
    q: BigUint,
}

impl std::fmt::Debug for BlumModulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlumModulus").field("n", &self.n).finish_non_exhaustive()
    }
}

impl BlumModulus {
    /// Picks two `bits / 2` wide Blum primes until their product is not
    /// easy to factor, they differ, and `|p - q|` has at least `bits / 4`
    /// bits, which keeps Fermat factorization out of reach.
    pub fn generate<R: SecureRandom + ?Sized>(
        rng: &mut R,
        bits: u64,
        reps: Option<usize>,
    ) -> Result<Self> {
        let min_gap = bits / 4;
        loop {
            let p = choose_blum_prime(rng, bits / 2, reps)?;
            let q = choose_blum_prime(rng, bits / 2, reps)?;
            let n = &p * &q;
            if Self::is_acceptable(&n, &p, &q, min_gap) {
                return Ok(Self { n, p, q });
            }
        }
    }

    fn is_acceptable(n: &BigUint, p: &BigUint, q: &BigUint, min_gap: u64) -> bool {
        if p == q || easy_to_factor(n) {
            return false;
        }
        let gap = if p > q { p - q } else { q - p };
        gap.bits() >= min_gap
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn factors(&self) -> (&BigUint, &BigUint) {
        (&self.p, &self.q)
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}

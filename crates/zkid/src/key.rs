use crate::modulus::BlumModulus;
use crate::protocol::MAX_CHALLENGE_WIDTH;
use crate::{Result, ZkidError};
use common::mod_int::ModInt;
use common::random::{get_random_int, SecureRandom};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::collections::HashSet;

/// Samples `x^2 mod n` for an `x` of exactly `bits` bits.
///
/// Zero and values sharing a factor with `n` are redrawn, so every result is
/// invertible modulo `n`.
pub fn choose_quadratic_residue<R: SecureRandom + ?Sized>(
    rng: &mut R,
    n: &BigUint,
    bits: u64,
) -> Result<BigUint> {
    let mod_n = ModInt::new(n);
    loop {
        let x = get_random_int(rng, bits)?;
        let r = mod_n.square(&x);
        if !r.is_zero() && mod_n.is_coprime(&r) {
            return Ok(r);
        }
    }
}

/// The prover's secrets: `k` distinct quadratic residues modulo `n`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Vec<BigUint>);

/// Inverse squares of the private values, in the same order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Vec<BigUint>);

// Keeps secrets out of logs and panic messages.
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey(<{} secrets>)", self.0.len())
    }
}

impl PrivateKey {
    /// Consecutive repeated residues tolerated before giving up on `n`.
    const MAX_DUPLICATE_DRAWS: usize = 1000;

    /// `k` distinct residues, at most one per challenge bit.
    ///
    /// A modulus with fewer than `k` invertible squares cannot satisfy the
    /// request; that is reported as `InvalidConfig` once too many draws in a
    /// row repeat an existing value.
    pub fn generate<R: SecureRandom + ?Sized>(
        rng: &mut R,
        k: usize,
        bits: u64,
        n: &BigUint,
    ) -> Result<Self> {
        if k > MAX_CHALLENGE_WIDTH {
            return Err(ZkidError::InvalidConfig(format!(
                "a key holds at most {MAX_CHALLENGE_WIDTH} secrets, got {k}"
            )));
        }

        let mut seen = HashSet::with_capacity(k);
        let mut values = Vec::with_capacity(k);
        let mut duplicates = 0;
        while values.len() < k {
            let r = choose_quadratic_residue(rng, n, bits)?;
            if seen.insert(r.clone()) {
                values.push(r);
                duplicates = 0;
            } else {
                duplicates += 1;
                if duplicates >= Self::MAX_DUPLICATE_DRAWS {
                    return Err(ZkidError::InvalidConfig(format!(
                        "modulus {n} has fewer than {k} distinct invertible residues"
                    )));
                }
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[BigUint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(s^2)^-1 mod n` for every secret `s`.
    pub fn public_key(&self, n: &BigUint) -> Result<PublicKey> {
        let mod_n = ModInt::new(n);
        let values = self
            .0
            .iter()
            .map(|s| {
                let s2 = mod_n.square(s);
                mod_n
                    .mod_inverse(&s2)
                    .ok_or_else(|| ZkidError::ImpossibleInverse { value: s.clone() })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PublicKey(values))
    }
}

impl PublicKey {
    pub fn values(&self) -> &[BigUint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks `v * s^2 = 1 (mod n)` position by position.
    pub fn is_consistent_with(&self, private_key: &PrivateKey, n: &BigUint) -> bool {
        let mod_n = ModInt::new(n);
        self.len() == private_key.len()
            && self
                .0
                .iter()
                .zip(private_key.values())
                .all(|(v, s)| mod_n.mul(v, &mod_n.square(s)).is_one())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Everything one identity owns: the modulus with its factors and both keys.
#[derive(Clone, Debug)]
pub struct KeyPair {
    modulus: BlumModulus,
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn generate<R: SecureRandom + ?Sized>(
        rng: &mut R,
        modulus: BlumModulus,
        k: usize,
    ) -> Result<Self> {
        let bits = modulus.bits();
        let private_key = PrivateKey::generate(rng, k, bits, modulus.n())?;
        let public_key = private_key.public_key(modulus.n())?;
        Ok(Self {
            modulus,
            private_key,
            public_key,
        })
    }

    pub fn n(&self) -> &BigUint {
        self.modulus.n()
    }

    pub fn modulus(&self) -> &BlumModulus {
        &self.modulus
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

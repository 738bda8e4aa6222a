use crate::miller_rabin;
use crate::random::{get_random_int, SecureRandom};
use crate::Result;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// A prime congruent to 3 modulo 4.
pub fn is_blum_prime(n: &BigUint, reps: Option<usize>) -> bool {
    is_three_mod_four(n) && miller_rabin::is_prime(n, reps)
}

fn is_three_mod_four(n: &BigUint) -> bool {
    (n % 4_u8).to_u8() == Some(3)
}

/// Draws `bits` wide candidates until one is a Blum prime.
pub fn choose_blum_prime<R: SecureRandom + ?Sized>(
    rng: &mut R,
    bits: u64,
    reps: Option<usize>,
) -> Result<BigUint> {
    loop {
        let r = get_random_int(rng, bits)?;
        if is_blum_prime(&r, reps) {
            return Ok(r);
        }
    }
}

pub mod small_factor {
    use num_bigint::BigUint;
    use num_integer::Integer;
    use num_traits::Zero;
    use once_cell::sync::Lazy;

    pub const DIVISOR_BOUND: u32 = 255;

    static ODD_DIVISORS: Lazy<Vec<u32>> =
        Lazy::new(|| (3..=DIVISOR_BOUND).step_by(2).collect());

    /// True if `m` has a divisor among 2 and the odd integers up to 255.
    ///
    /// This screens a composed modulus for accidental small factors; it is
    /// not a primality test.
    pub fn easy_to_factor(m: &BigUint) -> bool {
        if m.is_even() {
            return true;
        }
        ODD_DIVISORS.iter().any(|d| (m % *d).is_zero())
    }
}

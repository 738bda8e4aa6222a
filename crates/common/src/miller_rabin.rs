use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// Witness count giving a false-positive bound of `4^-20` per candidate.
pub const DEFAULT_REPS: usize = 20;

/// Probabilistic Miller-Rabin test with `reps` witnesses.
///
/// The last witness is always 2, the rest are drawn uniformly from
/// `[2, n - 2]`. Witnesses are public values, so they come from the thread
/// local generator rather than the caller's secure source.
pub fn is_prime(n: &BigUint, reps: Option<usize>) -> bool {
    if n.bits() <= 3 {
        let v = n.to_u8().unwrap_or(0);
        return [2, 3, 5, 7].contains(&v);
    }
    if n.is_even() {
        return false;
    }

    let reps = reps.unwrap_or(DEFAULT_REPS).max(1);
    let nm1 = n - 1_u8;
    let k = nm1.trailing_zeros().unwrap_or(0);
    let q = &nm1 >> k;
    let two = BigUint::from(2_u8);

    let mut rng = rand::thread_rng();
    let samples: Vec<_> = (1..=reps)
        .map(|idx| {
            if idx == reps {
                two.clone()
            } else {
                rng.gen_biguint_range(&two, &nm1)
            }
        })
        .collect();

    samples.par_iter().all(|x| {
        let mut y = x.modpow(&q, n);
        if y.is_one() || y == nm1 {
            return true;
        }

        for _ in 1..k {
            y = y.modpow(&two, n);
            if y == nm1 {
                return true;
            }
            if y.is_one() {
                return false;
            }
        }
        false
    })
}

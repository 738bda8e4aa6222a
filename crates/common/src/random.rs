use crate::{CommonError, Result};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use std::ops::RangeInclusive;

pub const RANDOM_BITS_RANGE: RangeInclusive<u64> = 1..=16384;

/// A cryptographically secure source of integers.
///
/// `secure_random(bits)` returns a uniformly distributed integer in
/// `[0, 2^(bits + 1))`. Every other random value in the workspace (prime
/// candidates, commitments, challenges) is derived from this one primitive,
/// so a seeded generator can stand in for the operating system in tests.
pub trait SecureRandom {
    fn secure_random(&mut self, bits: u64) -> Result<BigUint>;
}

impl<R: RngCore + CryptoRng + ?Sized> SecureRandom for R {
    fn secure_random(&mut self, bits: u64) -> Result<BigUint> {
        let width = bits + 1;
        let bs_len = (width + 7) / 8;
        let mut buf = vec![0_u8; bs_len as usize];
        self.try_fill_bytes(buf.as_mut_slice())?;
        let mut r = BigUint::from_bytes_be(&buf);
        for bit_pos in width..(bs_len * 8) {
            r.set_bit(bit_pos, false);
        }
        Ok(r)
    }
}

/// Random odd integer whose bit length is exactly `bits`.
pub fn get_random_int<R: SecureRandom + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if !RANDOM_BITS_RANGE.contains(&bits) {
        return Err(CommonError::invalid_random_bits_length(
            bits,
            RANDOM_BITS_RANGE,
        ));
    }

    loop {
        let mut r = rng.secure_random(bits)?;
        r.set_bit(bits - 1, true);
        r.set_bit(0, true);
        // the draw is one bit wider than requested
        if r.bits() == bits {
            return Ok(r);
        }
    }
}

use num_bigint::BigUint;
use num_integer::Integer;
use num_modular::{ModularCoreOps, ModularPow, ModularUnaryOps};
use num_traits::One;

/// Arithmetic in the ring of integers modulo a fixed modulus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModInt(BigUint);

impl ModInt {
    pub fn new(m: &BigUint) -> Self {
        Self(m.clone())
    }

    pub fn module(&self) -> &BigUint {
        &self.0
    }

    pub fn reduce(&self, x: &BigUint) -> BigUint {
        x.mod_floor(&self.0)
    }

    pub fn mul(&self, x: &BigUint, y: &BigUint) -> BigUint {
        x.mulm(y, &self.0)
    }

    pub fn pow(&self, x: &BigUint, y: &BigUint) -> BigUint {
        x.powm(y, &self.0)
    }

    pub fn square(&self, x: &BigUint) -> BigUint {
        x.sqm(&self.0)
    }

    /// Product of every value in `xs`, reduced; the empty product is one.
    pub fn product<'a, I>(&self, xs: I) -> BigUint
    where
        I: IntoIterator<Item = &'a BigUint>,
    {
        xs.into_iter()
            .fold(self.reduce(&BigUint::one()), |acc, x| self.mul(&acc, x))
    }

    /// `y` such that `x * y = 1`, present only when `x` is coprime to the modulus.
    pub fn mod_inverse(&self, x: &BigUint) -> Option<BigUint> {
        x.invm(&self.0)
    }

    pub fn is_coprime(&self, x: &BigUint) -> bool {
        x.gcd(&self.0).is_one()
    }
}

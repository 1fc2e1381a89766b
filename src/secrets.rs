//! Key material of an account owner and the openings of committed values.

use k256::{elliptic_curve::ops::Reduce, FieldBytes, U256};
use sha2::{Digest, Sha256};

use std::{fmt, ops};

use crate::crypto::{random_scalar, scalar_bit_len, Address, Generator, Point, Scalar, G};
use crate::error::Error;
use crate::proofs::Signature;
use crate::slots::{AnonymousBase, Base, ContractKind, SecretBase, SlotMode, Value};
use crate::{Config, CONFIG};

/// Largest amount that fits into a short range proof.
pub const MAX_SHORT_VALUE: u64 = (1 << 20) - 1;

/// Private key of an account.
///
/// # Usage
///
/// The key derives the bases under which the account receives values (see
/// [`secret_base()`], [`plaintext_base()`] and [`anonymous_base()`]), signs plaintext
/// spends, and recovers the amounts of solvable values sent to it with [`solve()`].
///
/// [`secret_base()`]: #method.secret_base
/// [`plaintext_base()`]: #method.plaintext_base
/// [`anonymous_base()`]: #method.anonymous_base
/// [`solve()`]: #method.solve
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    inner: Scalar,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("PrivateKey")
            .field("address", &self.plaintext_base())
            .finish()
    }
}

impl PrivateKey {
    /// Generates a random key.
    pub fn random() -> Result<Self, Error> {
        random_scalar().map(|inner| PrivateKey { inner })
    }

    /// Derives a key deterministically from `parts`.
    ///
    /// The key is the SHA-256 digest of the concatenated parts reduced modulo the group
    /// order. With no parts, a random key is generated instead.
    pub fn from_hash(parts: &[&[u8]]) -> Result<Self, Error> {
        if parts.is_empty() {
            return Self::random();
        }
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        let digest = FieldBytes::clone_from_slice(&hasher.finalize());
        Ok(PrivateKey {
            inner: <Scalar as Reduce<U256>>::reduce_bytes(&digest),
        })
    }

    /// Generator `h = sk·G` of the secret account.
    pub fn secret_base(&self) -> SecretBase {
        SecretBase {
            h: Point::from_scalar(&self.inner),
        }
    }

    /// Address of the plaintext account.
    pub fn plaintext_base(&self) -> Address {
        self.secret_base().h.address()
    }

    /// Draws a fresh anonymous base `(r·G, r·h)`.
    ///
    /// Every call returns an unlinkable base; all of them are solvable with this key.
    pub fn anonymous_base(&self) -> Result<AnonymousBase, Error> {
        let r = random_scalar()?;
        let h = self.secret_base().h;
        Ok(AnonymousBase {
            g: Point::from_scalar(&r),
            h: h * r,
        })
    }

    pub fn sign(&self, e: &Scalar) -> Result<Signature, Error> {
        Signature::sign(&self.inner, e)
    }

    /// Recovers the amount of `value` held under `base`, searching below
    /// `CONFIG.solve_bound`.
    pub fn solve(&self, value: &Value, base: &Base) -> Result<u64, Error> {
        self.solve_with(value, base, &CONFIG)
    }

    /// Same as [`solve()`](PrivateKey::solve()), with limits taken from `config`.
    pub fn solve_with(&self, value: &Value, base: &Base, config: &Config) -> Result<u64, Error> {
        self.solve_within(value, base, config.solve_bound)
    }

    /// Signs digest `e`, with signing limits taken from `config`.
    pub fn sign_with(&self, e: &Scalar, config: &Config) -> Result<Signature, Error> {
        Signature::sign_with(&self.inner, e, config)
    }

    /// Recovers the amount of `value` held under `base`, searching `[0, bound)`.
    ///
    /// # Errors
    ///
    /// - `SlotModeMismatch` if the tiers of `value` and `base` differ
    /// - `NotSolvable` if the value has no decryption component
    /// - `ValueNotFound` if the amount is not below `bound`
    pub fn solve_within(&self, value: &Value, base: &Base, bound: u64) -> Result<u64, Error> {
        let (generator, value) = match (base, value) {
            (Base::Plaintext(_), Value::Plaintext(value)) => {
                let bits = scalar_bit_len(&value.value);
                if bits > 64 {
                    return Err(Error::RangeExceeded { bits, max: 64 });
                }
                let bytes = value.value.to_bytes();
                let mut low = [0_u8; 8];
                low.copy_from_slice(&bytes[24..]);
                return Ok(u64::from_be_bytes(low));
            }
            (Base::Secret(_), Value::Secret(value)) => (*G, value),
            (Base::Anonymous(base), Value::Anonymous(value)) => (base.g, value),
            _ => {
                let mode = SlotMode::new(
                    value.privacy(),
                    ContractKind::None,
                    false,
                    value.is_solvable(),
                );
                return Err(mode.mismatch("value and base belong to different tiers"));
            }
        };
        let decryption = value.decryption.ok_or(Error::NotSolvable)?;
        let target = value.commitment - decryption * self.inner;
        search(&generator, &target, bound)
    }
}

/// Finds `i < bound` with `i·generator == target`.
fn search(generator: &Generator, target: &Point, bound: u64) -> Result<u64, Error> {
    let mut acc = Point::identity();
    for i in 0..bound {
        if acc == *target {
            return Ok(i);
        }
        acc += *generator;
    }
    Err(Error::ValueNotFound { bound })
}

/// Prover's knowledge of a committed amount: the amount and the blinding factor.
#[derive(Clone, PartialEq, Eq)]
pub struct Opening {
    value: Scalar,
    blinding: Scalar,
}

impl fmt::Debug for Opening {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.debug_struct("Opening").finish()
    }
}

impl Opening {
    /// Opening of `value` with a random blinding.
    pub fn new(value: u64) -> Result<Self, Error> {
        Ok(Opening {
            value: Scalar::from(value),
            blinding: random_scalar()?,
        })
    }

    pub fn with_blinding(value: Scalar, blinding: Scalar) -> Self {
        Opening { value, blinding }
    }

    /// Opening with zero blinding, as used for plaintext amounts.
    pub fn plain(value: u64) -> Self {
        Opening::with_blinding(Scalar::from(value), Scalar::ZERO)
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }

    pub fn blinding(&self) -> &Scalar {
        &self.blinding
    }

    /// Checks that `commitment = value·g + blinding·h`.
    pub fn opens(&self, commitment: &Point, g: &Generator, h: &Generator) -> bool {
        *commitment == Point::commit(g, h, &self.value, &self.blinding)
    }
}

impl<'a> ops::Add<&'a Opening> for &'a Opening {
    type Output = Opening;

    fn add(self, rhs: &'a Opening) -> Opening {
        Opening {
            value: self.value + rhs.value,
            blinding: self.blinding + rhs.blinding,
        }
    }
}

impl ops::AddAssign for Opening {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
        self.blinding += rhs.blinding;
    }
}

impl<'a> ops::Sub<&'a Opening> for &'a Opening {
    type Output = Opening;

    fn sub(self, rhs: &'a Opening) -> Opening {
        Opening {
            value: self.value - rhs.value,
            blinding: self.blinding - rhs.blinding,
        }
    }
}

impl ops::SubAssign for Opening {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
        self.blinding -= rhs.blinding;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{ConfidentialValue, PlaintextValue};

    fn solvable_value(g: &Point, h: &Point, opening: &Opening) -> ConfidentialValue {
        ConfidentialValue {
            commitment: Point::commit(g, h, opening.value(), opening.blinding()),
            decryption: Some(*g * opening.blinding()),
        }
    }

    #[test]
    fn hash_keys_are_deterministic() {
        let first = PrivateKey::from_hash(&[&b"alice"[..], &b"0"[..]]).unwrap();
        let second = PrivateKey::from_hash(&[&b"alice"[..], &b"0"[..]]).unwrap();
        let other = PrivateKey::from_hash(&[&b"alice"[..], &b"1"[..]]).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.plaintext_base(), second.plaintext_base());

        let random = PrivateKey::from_hash(&[]).unwrap();
        assert_ne!(random, PrivateKey::from_hash(&[]).unwrap());
    }

    #[test]
    fn bases_are_related_through_key() {
        let key = PrivateKey::random().unwrap();
        let secret = key.secret_base();
        assert_eq!(key.plaintext_base(), secret.h.address());

        let first = key.anonymous_base().unwrap();
        let second = key.anonymous_base().unwrap();
        assert_ne!(first, second);
        assert_ne!(first.h, secret.h);
    }

    #[test]
    fn solve_recovers_short_values() {
        let key = PrivateKey::random().unwrap();
        let secret = Base::Secret(key.secret_base());
        let anonymous = key.anonymous_base().unwrap();

        for &amount in &[0, 1, 1_000, 114_514] {
            let opening = Opening::new(amount).unwrap();
            let value = Value::Secret(solvable_value(&G, &key.secret_base().h, &opening));
            assert_eq!(key.solve(&value, &secret).unwrap(), amount);

            let value = Value::Anonymous(solvable_value(&anonymous.g, &anonymous.h, &opening));
            assert_eq!(
                key.solve(&value, &Base::Anonymous(anonymous)).unwrap(),
                amount
            );
        }
    }

    #[test]
    fn solve_bound() {
        let key = PrivateKey::random().unwrap();
        let base = Base::Secret(key.secret_base());
        let value_of = |amount: u64| {
            let opening = Opening::new(amount).unwrap();
            Value::Secret(solvable_value(&G, &key.secret_base().h, &opening))
        };

        assert_eq!(key.solve_within(&value_of(99), &base, 100).unwrap(), 99);
        assert_eq!(
            key.solve_within(&value_of(100), &base, 100).unwrap_err(),
            Error::ValueNotFound { bound: 100 }
        );
        assert_eq!(CONFIG.solve_bound, MAX_SHORT_VALUE);

        let config = Config {
            solve_bound: 10,
            ..Config::default()
        };
        assert_eq!(key.solve_with(&value_of(9), &base, &config).unwrap(), 9);
        assert_eq!(
            key.solve_with(&value_of(10), &base, &config).unwrap_err(),
            Error::ValueNotFound { bound: 10 }
        );
    }

    #[test]
    fn solve_needs_matching_key_and_form() {
        let key = PrivateKey::random().unwrap();
        let stranger = PrivateKey::random().unwrap();
        let base = Base::Secret(key.secret_base());
        let opening = Opening::new(5).unwrap();
        let mut value = solvable_value(&G, &key.secret_base().h, &opening);
        assert!(stranger
            .solve_within(&Value::Secret(value), &base, 1_000)
            .is_err());

        value.decryption = None;
        assert_eq!(
            key.solve(&Value::Secret(value), &base).unwrap_err(),
            Error::NotSolvable
        );

        let plain = Value::Plaintext(PlaintextValue::new(Scalar::from(77_u64)));
        assert_eq!(
            key.solve(&plain, &Base::Plaintext(key.plaintext_base())).unwrap(),
            77
        );
        assert!(key.solve(&plain, &base).is_err());
    }

    #[test]
    fn openings_are_homomorphic() {
        let h = key_point();
        let first = Opening::new(100).unwrap();
        let second = Opening::new(200).unwrap();
        let c1 = Point::commit(&G, &h, first.value(), first.blinding());
        let c2 = Point::commit(&G, &h, second.value(), second.blinding());
        assert!((&first + &second).opens(&(c1 + c2), &G, &h));
        assert!((&second - &first).opens(&(c2 - c1), &G, &h));

        let mut sum = first.clone();
        sum += second.clone();
        sum -= second;
        assert_eq!(sum, first);
    }

    fn key_point() -> Point {
        PrivateKey::random().unwrap().secret_base().h
    }
}

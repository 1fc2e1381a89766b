// Copyright 2018 The Exonum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Elliptic-curve primitives used by the proof protocols and the slot codec.
//!
//! # Points and scalars
//!
//! All arithmetic happens in the prime-order group of secp256k1. A [`Point`] is used
//! both as a *generator* (a base a value is committed against) and as a *commitment*
//! (`v·g + r·h`); the [`Generator`] and [`Commitment`] aliases only document intent.
//! Points are immutable values: every operation produces a new point.
//!
//! Canonical encodings are fixed-width and big-endian: a scalar takes
//! [`SCALAR_LEN`] bytes, a point takes [`POINT_LEN`] bytes (a parity tag for `y`
//! followed by the `x` coordinate).
//!
//! # Hashing
//!
//! [`Transcript`] turns prover messages into Fiat-Shamir challenges, and
//! [`Address`] is the 20-byte digest identifying a plaintext account.
//!
//! [`Point`]: crate::crypto::Point
//! [`Generator`]: crate::crypto::Generator
//! [`Commitment`]: crate::crypto::Commitment
//! [`Transcript`]: crate::crypto::Transcript
//! [`Address`]: crate::crypto::Address

#[macro_use]
mod serialization;
mod transcript;

pub use self::transcript::{Address, Transcript};
pub use k256::Scalar;

use k256::{
    elliptic_curve::{
        group::{Group, GroupEncoding},
        ops::Reduce,
        point::AffineCoordinates,
        PrimeField,
    },
    CompressedPoint, FieldBytes, ProjectivePoint, U256,
};
use rand::{rngs::OsRng, RngCore};

use std::{iter, ops};

use crate::error::Error;

/// Size of a canonical scalar encoding.
pub const SCALAR_LEN: usize = 32;
/// Size of a canonical point encoding.
pub const POINT_LEN: usize = 33;

lazy_static! {
    /// Process-wide base generator `G = 1·B`.
    pub static ref G: Point = Point::from_scalar(&Scalar::ONE);
}

/// Element of the secp256k1 group.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point {
    inner: ProjectivePoint,
}

/// A point used as a base for commitments.
pub type Generator = Point;
/// A point holding a Pedersen commitment.
pub type Commitment = Point;

impl Point {
    /// Size of the byte representation of the point.
    pub const BYTE_LEN: usize = POINT_LEN;

    pub fn identity() -> Self {
        Point {
            inner: ProjectivePoint::IDENTITY,
        }
    }

    /// Returns `k·G`.
    pub fn from_scalar(k: &Scalar) -> Self {
        Point {
            inner: ProjectivePoint::GENERATOR * k,
        }
    }

    /// Returns the Pedersen commitment `v·g + r·h`.
    pub fn commit(g: &Point, h: &Point, v: &Scalar, r: &Scalar) -> Self {
        Point {
            inner: g.inner * v + h.inner * r,
        }
    }

    /// Returns `Σ exps[i]·gens[i]`.
    pub fn multi_commit(gens: &[Point], exps: &[Scalar]) -> Result<Self, Error> {
        if gens.len() != exps.len() {
            return Err(Error::LengthMismatch(gens.len(), exps.len()));
        }
        Ok(gens.iter().zip(exps).map(|(g, k)| *g * k).sum())
    }

    pub fn is_identity(&self) -> bool {
        self.inner.is_identity().into()
    }

    /// Attempts to deserialize a point from its canonical encoding.
    ///
    /// The 33 zero bytes stand for the identity; any other input must carry a parity tag
    /// and an `x` coordinate of a curve point.
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() != Self::BYTE_LEN {
            return Err(Error::wrong_length("point", Self::BYTE_LEN, slice.len()));
        }
        if slice.iter().all(|&byte| byte == 0) {
            return Ok(Self::identity());
        }
        if slice[0] != 0x02 && slice[0] != 0x03 {
            return Err(Error::decode(
                "point",
                format!("unknown parity tag {:#04x}", slice[0]),
            ));
        }

        let repr = CompressedPoint::clone_from_slice(slice);
        let inner: Option<ProjectivePoint> = ProjectivePoint::from_bytes(&repr).into();
        inner
            .map(|inner| Point { inner })
            .ok_or_else(|| Error::decode("point", "no curve point has this x coordinate"))
    }

    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        let mut bytes = [0_u8; POINT_LEN];
        if !self.is_identity() {
            bytes.copy_from_slice(&self.inner.to_affine().to_bytes());
        }
        bytes
    }

    /// Affine `x` coordinate reduced modulo the group order.
    pub(crate) fn x_scalar(&self) -> Scalar {
        let x: FieldBytes = self.inner.to_affine().x();
        <Scalar as Reduce<U256>>::reduce_bytes(&x)
    }

    /// Derives the plaintext address of this point.
    pub fn address(&self) -> Address {
        Address::from_point(self)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::identity()
    }
}

impl ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Point {
        Point {
            inner: self.inner + rhs.inner,
        }
    }
}

impl<'a> ops::Add<&'a Point> for Point {
    type Output = Point;

    fn add(self, rhs: &'a Point) -> Point {
        Point {
            inner: self.inner + rhs.inner,
        }
    }
}

impl ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.inner += rhs.inner;
    }
}

impl ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Point {
        Point {
            inner: self.inner - rhs.inner,
        }
    }
}

impl<'a> ops::Sub<&'a Point> for Point {
    type Output = Point;

    fn sub(self, rhs: &'a Point) -> Point {
        Point {
            inner: self.inner - rhs.inner,
        }
    }
}

impl ops::SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.inner -= rhs.inner;
    }
}

impl ops::Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point { inner: -self.inner }
    }
}

impl ops::Mul<Scalar> for Point {
    type Output = Point;

    fn mul(self, k: Scalar) -> Point {
        Point {
            inner: self.inner * k,
        }
    }
}

impl<'a> ops::Mul<&'a Scalar> for Point {
    type Output = Point;

    fn mul(self, k: &'a Scalar) -> Point {
        Point {
            inner: self.inner * k,
        }
    }
}

impl iter::Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Point {
        iter.fold(Point::identity(), |acc, p| acc + p)
    }
}

impl<'a> iter::Sum<&'a Point> for Point {
    fn sum<I: Iterator<Item = &'a Point>>(iter: I) -> Point {
        iter.fold(Point::identity(), |acc, p| acc + p)
    }
}

/// Draws a scalar uniformly from `[2, order - 4]`.
///
/// The excluded values are the degenerate small and "small negative" scalars. Failure of
/// the OS entropy source is reported, never retried.
pub fn random_scalar() -> Result<Scalar, Error> {
    let mut rng = OsRng;
    loop {
        let mut bytes = FieldBytes::default();
        rng.try_fill_bytes(bytes.as_mut_slice())
            .map_err(|e| Error::RandomnessUnavailable(e.to_string()))?;

        let candidate: Option<Scalar> = Scalar::from_repr(bytes).into();
        match candidate {
            Some(k) if is_usable(&k) => return Ok(k),
            _ => continue,
        }
    }
}

/// Draws `n` independent scalars from `[2, order - 4]`.
pub fn random_scalars(n: usize) -> Result<Vec<Scalar>, Error> {
    (0..n).map(|_| random_scalar()).collect()
}

fn is_usable(k: &Scalar) -> bool {
    let neg = -*k;
    let two = Scalar::from(2_u64);
    let three = Scalar::from(3_u64);
    !(*k == Scalar::ZERO || *k == Scalar::ONE || neg == Scalar::ONE || neg == two || neg == three)
}

/// Decodes a canonical big-endian scalar.
pub fn scalar_from_slice(slice: &[u8]) -> Result<Scalar, Error> {
    if slice.len() != SCALAR_LEN {
        return Err(Error::wrong_length("scalar", SCALAR_LEN, slice.len()));
    }
    let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(slice)).into();
    scalar.ok_or_else(|| Error::decode("scalar", "not reduced modulo the group order"))
}

pub fn scalar_to_bytes(k: &Scalar) -> [u8; SCALAR_LEN] {
    let mut bytes = [0_u8; SCALAR_LEN];
    bytes.copy_from_slice(&k.to_bytes());
    bytes
}

/// Number of significant bits in the integer representative of `k`.
pub fn scalar_bit_len(k: &Scalar) -> usize {
    let bytes = k.to_bytes();
    bytes
        .iter()
        .position(|&byte| byte != 0)
        .map(|i| (SCALAR_LEN - i) * 8 - bytes[i].leading_zeros() as usize)
        .unwrap_or(0)
}

/// Bit `i` (little-endian order) of the integer representative of `k`.
pub(crate) fn scalar_bit(k: &Scalar, i: usize) -> bool {
    let bytes = k.to_bytes();
    if i >= SCALAR_LEN * 8 {
        return false;
    }
    (bytes[SCALAR_LEN - 1 - i / 8] >> (i % 8)) & 1 == 1
}

/// Multiplicative inverse, `None` for zero.
pub(crate) fn invert(k: &Scalar) -> Option<Scalar> {
    k.invert().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_roundtrip() {
        let k = random_scalar().expect("random");
        let point = Point::from_scalar(&k);
        let bytes = point.to_bytes();
        assert_eq!(bytes.len(), POINT_LEN);
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
        assert_eq!(Point::from_slice(&bytes).expect("decode"), point);
    }

    #[test]
    fn identity_encodes_as_zeros() {
        let bytes = Point::identity().to_bytes();
        assert_eq!(bytes, [0_u8; POINT_LEN]);
        assert!(Point::from_slice(&bytes).expect("decode").is_identity());
    }

    #[test]
    fn malformed_points_are_rejected() {
        let bytes = G.to_bytes();
        assert!(Point::from_slice(&bytes[1..]).is_err());

        let mut wrong_tag = bytes;
        wrong_tag[0] = 0x04;
        assert!(Point::from_slice(&wrong_tag).is_err());

        // x exceeds the field modulus.
        let mut off_curve = [0xff_u8; POINT_LEN];
        off_curve[0] = 0x02;
        assert!(Point::from_slice(&off_curve).is_err());
    }

    #[test]
    fn point_arithmetic() {
        let a = Scalar::from(7_u64);
        let b = Scalar::from(11_u64);
        let pa = Point::from_scalar(&a);
        let pb = Point::from_scalar(&b);
        assert_eq!(pa + pb, Point::from_scalar(&(a + b)));
        assert_eq!(pa - pb, Point::from_scalar(&(a - b)));
        assert_eq!(-pa, Point::from_scalar(&-a));
        assert_eq!(*G * a, pa);

        let h = Point::from_scalar(&b);
        let commitment = Point::commit(&G, &h, &a, &b);
        assert_eq!(
            Point::multi_commit(&[*G, h], &[a, b]).expect("commit"),
            commitment
        );
        assert_eq!(
            Point::multi_commit(&[*G], &[a, b]),
            Err(Error::LengthMismatch(1, 2))
        );
    }

    #[test]
    fn random_scalars_avoid_degenerate_values() {
        for k in random_scalars(32).expect("random") {
            assert!(is_usable(&k));
        }
        assert!(!is_usable(&Scalar::ZERO));
        assert!(!is_usable(&Scalar::ONE));
        assert!(!is_usable(&-Scalar::from(3_u64)));
        assert!(is_usable(&Scalar::from(2_u64)));
        assert!(is_usable(&-Scalar::from(4_u64)));
    }

    #[test]
    fn scalar_bits() {
        assert_eq!(scalar_bit_len(&Scalar::ZERO), 0);
        assert_eq!(scalar_bit_len(&Scalar::ONE), 1);
        assert_eq!(scalar_bit_len(&Scalar::from((1_u64 << 20) - 1)), 20);
        assert_eq!(scalar_bit_len(&Scalar::from(1_u64 << 20)), 21);
        assert_eq!(scalar_bit_len(&-Scalar::ONE), 256);

        let k = Scalar::from(0b1011_u64);
        let bits: Vec<_> = (0..5).map(|i| scalar_bit(&k, i)).collect();
        assert_eq!(bits, vec![true, true, false, true, false]);
    }

    #[test]
    fn non_canonical_scalars_are_rejected() {
        assert!(scalar_from_slice(&[0xff; SCALAR_LEN]).is_err());
        assert!(scalar_from_slice(&[0; 31]).is_err());
        let k = Scalar::from(114_514_u64);
        assert_eq!(scalar_from_slice(&scalar_to_bytes(&k)).expect("decode"), k);
    }
}

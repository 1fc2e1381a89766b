//! SHA-256 based challenge derivation and address hashing.

use k256::{elliptic_curve::ops::Reduce, FieldBytes, U256};
use sha2::{Digest, Sha256};

use super::{scalar_to_bytes, Point, Scalar};
use crate::error::Error;

/// Running hash over the public messages of a proof.
///
/// Points are absorbed in their 33-byte canonical encoding and scalars in their
/// fixed 32-byte big-endian encoding, so the challenge does not depend on the
/// magnitude of absorbed scalars.
#[derive(Clone, Default)]
pub struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_point(&mut self, point: &Point) -> &mut Self {
        self.hasher.update(&point.to_bytes()[..]);
        self
    }

    pub fn append_points<'a, I>(&mut self, points: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        for point in points {
            self.append_point(point);
        }
        self
    }

    pub fn append_scalar(&mut self, k: &Scalar) -> &mut Self {
        self.hasher.update(&scalar_to_bytes(k)[..]);
        self
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self
    }

    /// Raw digest of everything absorbed so far.
    pub fn digest(&self) -> [u8; 32] {
        let mut out = [0_u8; 32];
        out.copy_from_slice(&self.hasher.clone().finalize());
        out
    }

    /// Digest interpreted as a big-endian integer and reduced modulo the group order.
    pub fn challenge(&self) -> Scalar {
        let digest = FieldBytes::clone_from_slice(&self.digest());
        <Scalar as Reduce<U256>>::reduce_bytes(&digest)
    }
}

/// Identifier of a plaintext account: the low 20 bytes of `SHA-256(point)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; Address::BYTE_LEN]);

impl Address {
    pub const BYTE_LEN: usize = 20;

    pub fn from_point(point: &Point) -> Self {
        let digest = Sha256::digest(&point.to_bytes()[..]);
        let mut bytes = [0_u8; Self::BYTE_LEN];
        bytes.copy_from_slice(&digest[32 - Self::BYTE_LEN..]);
        Address(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() != Self::BYTE_LEN {
            return Err(Error::wrong_length("address", Self::BYTE_LEN, slice.len()));
        }
        let mut bytes = [0_u8; Self::BYTE_LEN];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; Self::BYTE_LEN] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        self.0
    }
}

impl From<[u8; Address::BYTE_LEN]> for Address {
    fn from(bytes: [u8; Address::BYTE_LEN]) -> Self {
        Address(bytes)
    }
}

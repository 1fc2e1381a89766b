//! Proof that a solvable commitment pair is well-formed.

use crate::crypto::{
    random_scalar, scalar_from_slice, scalar_to_bytes, Commitment, Generator, Point, Scalar,
    Transcript, SCALAR_LEN,
};
use crate::error::Error;

/// Public inputs of a format proof: `c1 = v·g + r·h` and `c2 = r·g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatStatement {
    pub g: Generator,
    pub h: Generator,
    pub c1: Commitment,
    pub c2: Commitment,
}

/// Schnorr-style proof of knowledge of the opening `(v, r)` of a [`FormatStatement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProof {
    challenge: Scalar,
    z1: Scalar,
    z2: Scalar,
}

impl FormatStatement {
    fn challenge(t1: &Point, t2: &Point) -> Scalar {
        Transcript::new().append_point(t1).append_point(t2).challenge()
    }
}

impl FormatProof {
    pub const BYTE_LEN: usize = 3 * SCALAR_LEN;

    /// Proves knowledge of `(v, r)`.
    ///
    /// The witness is not checked against the statement; a wrong witness yields a proof
    /// that fails verification.
    pub fn prove(statement: &FormatStatement, v: &Scalar, r: &Scalar) -> Result<Self, Error> {
        let a = random_scalar()?;
        let b = random_scalar()?;
        let t1 = Point::commit(&statement.g, &statement.h, &a, &b);
        let t2 = statement.g * b;

        let challenge = FormatStatement::challenge(&t1, &t2);
        Ok(FormatProof {
            challenge,
            z1: a - challenge * v,
            z2: b - challenge * r,
        })
    }

    pub fn verify(&self, statement: &FormatStatement) -> bool {
        let t1 = statement.c1 * self.challenge
            + Point::commit(&statement.g, &statement.h, &self.z1, &self.z2);
        let t2 = statement.c2 * self.challenge + statement.g * self.z2;

        let ok = FormatStatement::challenge(&t1, &t2) == self.challenge;
        if !ok {
            debug!("format proof rejected: challenge mismatch");
        }
        ok
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() != Self::BYTE_LEN {
            return Err(Error::wrong_length("format proof", Self::BYTE_LEN, slice.len()));
        }
        Ok(FormatProof {
            challenge: scalar_from_slice(&slice[..SCALAR_LEN])?,
            z1: scalar_from_slice(&slice[SCALAR_LEN..2 * SCALAR_LEN])?,
            z2: scalar_from_slice(&slice[2 * SCALAR_LEN..])?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::BYTE_LEN);
        bytes.extend_from_slice(&scalar_to_bytes(&self.challenge));
        bytes.extend_from_slice(&scalar_to_bytes(&self.z1));
        bytes.extend_from_slice(&scalar_to_bytes(&self.z2));
        bytes
    }
}

impl_hex_codec!(FormatProof, "format proof");

//! Range proof for Pedersen commitments.
//!
//! The prover shows that `value = v·g + r·h` commits to `v ∈ [0, 2^n)` by committing to
//! the bit decomposition of `v` against two vectors of auxiliary generators and
//! revealing the blinded evaluations `l(x)`, `r(x)` of the bit polynomials at a
//! Fiat-Shamir point `x`. The vectors are sent in full (no inner-product compression),
//! so a proof takes `4·33 + (2n + 2)·32` bytes.

use byteorder::{BigEndian, ByteOrder};

use crate::crypto::{
    invert, random_scalar, random_scalars, scalar_bit, scalar_bit_len, scalar_from_slice,
    scalar_to_bytes, Commitment, Generator, Point, Scalar, Transcript, POINT_LEN, SCALAR_LEN,
};
use crate::error::Error;

use super::{inner_product, powers, scalars_from_slice};

/// Largest bit width a range proof can cover.
pub const MAX_RANGE_BITS: usize = 64;

lazy_static! {
    /// Auxiliary generator vectors shared by all range proofs.
    pub static ref RANGE_GENS: RangeGens = RangeGens::new(MAX_RANGE_BITS);
}

/// Vectors `g_[n]`, `h_[n]` of generators with unknown discrete logarithms.
#[derive(Debug, Clone)]
pub struct RangeGens {
    g: Vec<Generator>,
    h: Vec<Generator>,
}

impl RangeGens {
    const DOMAIN_SEPARATOR: &'static [u8] = b"private-ledger/range";

    /// Derives generators for ranges of up to `capacity` bits.
    ///
    /// Generator `i` hashes the index with an increasing counter until the digest is the
    /// `x` coordinate of a curve point; `g_i` uses indices `0..capacity` and `h_i` uses
    /// `capacity..2·capacity`.
    pub fn new(capacity: usize) -> Self {
        let g = (0..capacity).map(|i| Self::hash_to_point(i as u32)).collect();
        let h = (capacity..2 * capacity)
            .map(|i| Self::hash_to_point(i as u32))
            .collect();
        RangeGens { g, h }
    }

    pub fn capacity(&self) -> usize {
        self.g.len()
    }

    fn hash_to_point(index: u32) -> Point {
        let mut index_bytes = [0_u8; 4];
        BigEndian::write_u32(&mut index_bytes, index);

        let mut counter = 0_u32;
        loop {
            let mut counter_bytes = [0_u8; 4];
            BigEndian::write_u32(&mut counter_bytes, counter);
            let digest = Transcript::new()
                .append_bytes(Self::DOMAIN_SEPARATOR)
                .append_bytes(&index_bytes)
                .append_bytes(&counter_bytes)
                .digest();

            let mut encoded = [0x02_u8; POINT_LEN];
            encoded[1..].copy_from_slice(&digest);
            if let Ok(point) = Point::from_slice(&encoded) {
                return point;
            }
            counter += 1;
        }
    }
}

/// Public inputs of a range proof.
#[derive(Debug, Clone)]
pub struct RangeStatement<'a> {
    value: Commitment,
    g: Generator,
    h: Generator,
    gens: &'a RangeGens,
    bits: usize,
}

impl<'a> RangeStatement<'a> {
    /// Creates a statement that `value` commits to a `bits`-bit integer.
    ///
    /// # Errors
    ///
    /// Fails with `BitWidthExceeded` if `gens` holds fewer than `bits` generators.
    pub fn new(
        value: Commitment,
        g: Generator,
        h: Generator,
        gens: &'a RangeGens,
        bits: usize,
    ) -> Result<Self, Error> {
        if bits > gens.capacity() {
            return Err(Error::BitWidthExceeded {
                bits,
                max: gens.capacity(),
            });
        }
        Ok(RangeStatement {
            value,
            g,
            h,
            gens,
            bits,
        })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    fn g_vec(&self) -> &[Generator] {
        &self.gens.g[..self.bits]
    }

    fn h_vec(&self) -> &[Generator] {
        &self.gens.h[..self.bits]
    }
}

impl RangeStatement<'static> {
    /// Statement over the shared [`RANGE_GENS`] table.
    pub fn with_shared_gens(
        value: Commitment,
        g: Generator,
        h: Generator,
        bits: usize,
    ) -> Result<Self, Error> {
        RangeStatement::new(value, g, h, &*RANGE_GENS, bits)
    }
}

struct Challenges {
    y: Scalar,
    z: Scalar,
    x: Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProof {
    a: Point,
    s: Point,
    t1: Point,
    t2: Point,
    l: Vec<Scalar>,
    r: Vec<Scalar>,
    tau: Scalar,
    mu: Scalar,
}

impl RangeProof {
    const FIXED_LEN: usize = 4 * POINT_LEN + 2 * SCALAR_LEN;

    /// Proves that `v·g + blinding·h` commits to a value in `[0, 2^bits)`.
    ///
    /// # Errors
    ///
    /// Fails with `RangeExceeded` before drawing any randomness if `v` does not fit
    /// into `statement.bits()` bits.
    pub fn prove(statement: &RangeStatement, v: &Scalar, blinding: &Scalar) -> Result<Self, Error> {
        let n = statement.bits;
        let bits = scalar_bit_len(v);
        if bits > n {
            return Err(Error::RangeExceeded { bits, max: n });
        }

        let (g_vec, h_vec) = (statement.g_vec(), statement.h_vec());
        let a_l: Vec<Scalar> = (0..n)
            .map(|i| if scalar_bit(v, i) { Scalar::ONE } else { Scalar::ZERO })
            .collect();
        let a_r: Vec<Scalar> = a_l.iter().map(|bit| *bit - Scalar::ONE).collect();

        let alpha = random_scalar()?;
        let rho = random_scalar()?;
        let s_l = random_scalars(n)?;
        let s_r = random_scalars(n)?;

        let a = statement.h * alpha
            + Point::multi_commit(g_vec, &a_l)?
            + Point::multi_commit(h_vec, &a_r)?;
        let s = statement.h * rho
            + Point::multi_commit(g_vec, &s_l)?
            + Point::multi_commit(h_vec, &s_r)?;

        let (y, z) = Self::bit_challenges(&a, &s);
        let z2 = z * z;
        let y_pows = powers(&y, n);
        let two_pows = powers(&Scalar::from(2_u64), n);

        let l0: Vec<Scalar> = a_l.iter().map(|bit| *bit - z).collect();
        let r0: Vec<Scalar> = (0..n)
            .map(|i| y_pows[i] * (a_r[i] + z) + z2 * two_pows[i])
            .collect();
        let r1: Vec<Scalar> = (0..n).map(|i| y_pows[i] * s_r[i]).collect();

        let t1 = inner_product(&l0, &r1) + inner_product(&s_l, &r0);
        let t2 = inner_product(&s_l, &r1);
        let tau1 = random_scalar()?;
        let tau2 = random_scalar()?;
        let t1_commitment = Point::commit(&statement.g, &statement.h, &t1, &tau1);
        let t2_commitment = Point::commit(&statement.g, &statement.h, &t2, &tau2);

        let x = Self::poly_challenge(&a, &s, &t1_commitment, &t2_commitment, &y, &z);
        let l = l0.iter().zip(&s_l).map(|(l0, l1)| *l0 + x * l1).collect();
        let r = r0.iter().zip(&r1).map(|(r0, r1)| *r0 + x * r1).collect();

        Ok(RangeProof {
            a,
            s,
            t1: t1_commitment,
            t2: t2_commitment,
            l,
            r,
            tau: z2 * blinding + tau1 * x + tau2 * x * x,
            mu: alpha + rho * x,
        })
    }

    fn bit_challenges(a: &Point, s: &Point) -> (Scalar, Scalar) {
        let mut transcript = Transcript::new();
        transcript.append_point(a).append_point(s);
        let y = transcript.challenge();
        let z = transcript.append_scalar(&y).challenge();
        (y, z)
    }

    fn poly_challenge(
        a: &Point,
        s: &Point,
        t1: &Point,
        t2: &Point,
        y: &Scalar,
        z: &Scalar,
    ) -> Scalar {
        Transcript::new()
            .append_point(a)
            .append_point(s)
            .append_point(t1)
            .append_point(t2)
            .append_scalar(y)
            .append_scalar(z)
            .challenge()
    }

    fn challenges(&self) -> Challenges {
        let (y, z) = Self::bit_challenges(&self.a, &self.s);
        let x = Self::poly_challenge(&self.a, &self.s, &self.t1, &self.t2, &y, &z);
        Challenges { y, z, x }
    }

    /// Number of bits the proof covers.
    pub fn bits(&self) -> usize {
        self.l.len()
    }

    pub fn verify(&self, statement: &RangeStatement) -> bool {
        let n = statement.bits;
        if self.l.len() != n || self.r.len() != n {
            debug!(
                "range proof rejected: proof covers {} bits, statement {}",
                self.l.len(),
                n
            );
            return false;
        }

        let Challenges { y, z, x } = self.challenges();
        let z2 = z * z;
        let z3 = z2 * z;
        let y_pows = powers(&y, n);
        let two_pows = powers(&Scalar::from(2_u64), n);
        let sum_y: Scalar = y_pows.iter().fold(Scalar::ZERO, |acc, p| acc + p);
        let sum_two: Scalar = two_pows.iter().fold(Scalar::ZERO, |acc, p| acc + p);
        let delta = (z - z2) * sum_y - z3 * sum_two;

        let t = inner_product(&self.l, &self.r);
        let lhs = Point::commit(&statement.g, &statement.h, &t, &self.tau);
        let rhs = statement.value * z2 + statement.g * delta + self.t1 * x + self.t2 * (x * x);
        if lhs != rhs {
            debug!("range proof rejected: polynomial identity does not hold");
            return false;
        }

        let y_inv = match invert(&y) {
            Some(y_inv) => y_inv,
            None => return false,
        };
        let h_prime: Vec<Point> = statement
            .h_vec()
            .iter()
            .zip(powers(&y_inv, n))
            .map(|(h, k)| *h * k)
            .collect();
        let g_vec = statement.g_vec();

        let mut lhs = self.a + self.s * x;
        for i in 0..n {
            lhs += g_vec[i] * (-z) + h_prime[i] * (z * y_pows[i] + z2 * two_pows[i]);
        }
        let rhs = statement.h * self.mu
            + g_vec.iter().zip(&self.l).map(|(g, l)| *g * l).sum::<Point>()
            + h_prime.iter().zip(&self.r).map(|(h, r)| *h * r).sum::<Point>();
        if lhs != rhs {
            debug!("range proof rejected: vector identity does not hold");
            return false;
        }
        true
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        let len = slice.len();
        if len < Self::FIXED_LEN || (len - Self::FIXED_LEN) % (2 * SCALAR_LEN) != 0 {
            return Err(Error::decode("range proof", format!("invalid length {}", len)));
        }
        let n = (len - Self::FIXED_LEN) / (2 * SCALAR_LEN);

        let point = |i: usize| Point::from_slice(&slice[i * POINT_LEN..(i + 1) * POINT_LEN]);
        let vectors = &slice[4 * POINT_LEN..len - 2 * SCALAR_LEN];
        let tail = &slice[len - 2 * SCALAR_LEN..];
        Ok(RangeProof {
            a: point(0)?,
            s: point(1)?,
            t1: point(2)?,
            t2: point(3)?,
            l: scalars_from_slice(&vectors[..n * SCALAR_LEN])?,
            r: scalars_from_slice(&vectors[n * SCALAR_LEN..])?,
            tau: scalar_from_slice(&tail[..SCALAR_LEN])?,
            mu: scalar_from_slice(&tail[SCALAR_LEN..])?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::FIXED_LEN + 2 * SCALAR_LEN * self.l.len());
        for point in &[self.a, self.s, self.t1, self.t2] {
            bytes.extend_from_slice(&point.to_bytes());
        }
        for scalar in self.l.iter().chain(&self.r) {
            bytes.extend_from_slice(&scalar_to_bytes(scalar));
        }
        bytes.extend_from_slice(&scalar_to_bytes(&self.tau));
        bytes.extend_from_slice(&scalar_to_bytes(&self.mu));
        bytes
    }
}

impl_hex_codec!(RangeProof, "range proof");

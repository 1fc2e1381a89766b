//! Non-interactive zero-knowledge protocols over the secp256k1 group.
//!
//! Every protocol is made non-interactive with the Fiat-Shamir heuristic: verifier
//! challenges are [`Transcript`] digests of the prover's messages. Proof construction
//! returns a `Result` (it needs fresh randomness and a valid witness); verification is
//! total and returns `false` for any proof that does not check.
//!
//! | Protocol | Statement | Bytes |
//! |----------|-----------|-------|
//! | [`FormatProof`] | `c1 = v·g + r·h`, `c2 = r·g` | 96 |
//! | [`RangeProof`] | `value = v·g + r·h`, `0 ≤ v < 2^n` | `196 + 64·n` |
//! | [`Signature`] | knowledge of `sk` behind an [`Address`] | 65 |
//! | [`LinearProof`] | `Y = Σ x_i·G_i`, `Σ a_i·x_i = b` | `33 + 32·n` |
//!
//! [`Transcript`]: crate::crypto::Transcript
//! [`Address`]: crate::crypto::Address

mod format;
mod linear;
mod range;
mod signature;

pub use self::format::{FormatProof, FormatStatement};
pub use self::linear::{LinearProof, LinearStatement};
pub use self::range::{RangeGens, RangeProof, RangeStatement, MAX_RANGE_BITS, RANGE_GENS};
pub use self::signature::Signature;

use crate::crypto::{Scalar, POINT_LEN, SCALAR_LEN};

/// Bit width of the range proofs attached to slot values.
pub const SHORT_RANGE_BITS: usize = 20;

/// Size of an encoded format proof.
pub const FORMAT_PROOF_LEN: usize = 3 * SCALAR_LEN;
/// Size of an encoded range proof over [`SHORT_RANGE_BITS`] bits.
pub const RANGE_PROOF_SHORT_LEN: usize =
    4 * POINT_LEN + (2 + 2 * SHORT_RANGE_BITS) * SCALAR_LEN;
/// Size of an encoded signature.
pub const SIGNATURE_LEN: usize = POINT_LEN + SCALAR_LEN;

/// `[1, base, base², …, base^(n-1)]`.
fn powers(base: &Scalar, n: usize) -> Vec<Scalar> {
    let mut acc = Scalar::ONE;
    (0..n)
        .map(|_| {
            let current = acc;
            acc *= base;
            current
        })
        .collect()
}

fn inner_product(a: &[Scalar], b: &[Scalar]) -> Scalar {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(Scalar::ZERO, |acc, (x, y)| acc + *x * y)
}

/// Splits `slice` into consecutive 32-byte scalars.
fn scalars_from_slice(slice: &[u8]) -> Result<Vec<Scalar>, crate::error::Error> {
    slice
        .chunks(SCALAR_LEN)
        .map(crate::crypto::scalar_from_slice)
        .collect()
}

#[test]
fn derived_lengths() {
    assert_eq!(FORMAT_PROOF_LEN, 96);
    assert_eq!(RANGE_PROOF_SHORT_LEN, 1476);
    assert_eq!(SIGNATURE_LEN, 65);
}

#[test]
fn powers_and_inner_product() {
    let two = Scalar::from(2_u64);
    let pows = powers(&two, 4);
    assert_eq!(
        pows,
        vec![
            Scalar::ONE,
            two,
            Scalar::from(4_u64),
            Scalar::from(8_u64)
        ]
    );
    assert_eq!(inner_product(&pows, &pows), Scalar::from(85_u64));
    assert!(powers(&two, 0).is_empty());
}

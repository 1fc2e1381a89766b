//! Signatures authorizing spends from plaintext accounts.

use crate::crypto::{
    invert, random_scalar, scalar_from_slice, scalar_to_bytes, Address, Point, Scalar, G,
    POINT_LEN, SCALAR_LEN,
};
use crate::error::Error;
use crate::{Config, CONFIG};

/// Signature binding a plaintext [`Address`] to a scalar digest.
///
/// The public key is never transmitted: the verifier recovers it from the nonce point
/// and compares its address against the claimed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    nonce_point: Point,
    s: Scalar,
}

impl Signature {
    pub const BYTE_LEN: usize = POINT_LEN + SCALAR_LEN;

    /// Signs digest `e` with the secret scalar `sk` under the process-wide [`CONFIG`].
    ///
    /// [`CONFIG`]: crate::CONFIG
    pub fn sign(sk: &Scalar, e: &Scalar) -> Result<Self, Error> {
        Self::sign_with(sk, e, &CONFIG)
    }

    /// Signs digest `e` with the secret scalar `sk`.
    ///
    /// # Errors
    ///
    /// Fails with `SigningAttemptsExhausted` if no nonce among `config.signing_attempts`
    /// yields non-zero `r` and `s`.
    pub fn sign_with(sk: &Scalar, e: &Scalar, config: &Config) -> Result<Self, Error> {
        let attempts = config.signing_attempts;
        for attempt in 0..attempts {
            let k = random_scalar()?;
            let nonce_point = Point::from_scalar(&k);
            let r = nonce_point.x_scalar();
            if r == Scalar::ZERO {
                trace!("signature nonce #{} gives r = 0, retrying", attempt);
                continue;
            }

            let k_inv = match invert(&k) {
                Some(k_inv) => k_inv,
                None => continue,
            };
            let s = k_inv * (*e + r * sk);
            if s == Scalar::ZERO {
                trace!("signature nonce #{} gives s = 0, retrying", attempt);
                continue;
            }
            return Ok(Signature { nonce_point, s });
        }
        Err(Error::SigningAttemptsExhausted(attempts))
    }

    /// Checks that the signature over `e` was produced by the key behind `address`.
    pub fn verify(&self, address: &Address, e: &Scalar) -> bool {
        let r = self.nonce_point.x_scalar();
        let r_inv = match invert(&r) {
            Some(r_inv) => r_inv,
            None => {
                debug!("signature rejected: r = 0");
                return false;
            }
        };

        let u1 = -*e * r_inv;
        let u2 = self.s * r_inv;
        let public_point = *G * u1 + self.nonce_point * u2;
        let ok = public_point.address() == *address;
        if !ok {
            debug!("signature rejected: recovered address differs");
        }
        ok
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() != Self::BYTE_LEN {
            return Err(Error::wrong_length("signature", Self::BYTE_LEN, slice.len()));
        }
        Ok(Signature {
            nonce_point: Point::from_slice(&slice[..POINT_LEN])?,
            s: scalar_from_slice(&slice[POINT_LEN..])?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::BYTE_LEN);
        bytes.extend_from_slice(&self.nonce_point.to_bytes());
        bytes.extend_from_slice(&scalar_to_bytes(&self.s));
        bytes
    }
}

impl_hex_codec!(Signature, "signature");

#[test]
fn signature_verifies_against_owner_address() {
    let sk = random_scalar().unwrap();
    let address = Point::from_scalar(&sk).address();
    let e = Scalar::from(114_514_u64);

    let signature = Signature::sign(&sk, &e).unwrap();
    assert!(signature.verify(&address, &e));
    assert!(!signature.verify(&address, &(e + Scalar::ONE)));

    let stranger = Point::from_scalar(&random_scalar().unwrap()).address();
    assert!(!signature.verify(&stranger, &e));

    let bytes = signature.to_bytes();
    assert_eq!(bytes.len(), Signature::BYTE_LEN);
    let copy = Signature::from_slice(&bytes).unwrap();
    assert_eq!(copy, signature);
    assert!(copy.verify(&address, &e));
}

#[test]
fn every_corrupted_byte_is_rejected() {
    let sk = random_scalar().unwrap();
    let address = Point::from_scalar(&sk).address();
    let e = Scalar::from(42_u64);
    let bytes = Signature::sign(&sk, &e).unwrap().to_bytes();

    for offset in 0..Signature::BYTE_LEN {
        let mut corrupted = bytes.clone();
        corrupted[offset] ^= 0x01;
        if let Ok(signature) = Signature::from_slice(&corrupted) {
            assert!(!signature.verify(&address, &e), "byte {} went unnoticed", offset);
        }
    }
}

#[test]
fn signing_gives_up_after_configured_attempts() {
    let sk = random_scalar().unwrap();
    let config = Config {
        signing_attempts: 0,
        ..Config::default()
    };
    assert_eq!(
        Signature::sign_with(&sk, &Scalar::ONE, &config).unwrap_err(),
        Error::SigningAttemptsExhausted(0)
    );

    let config = Config {
        signing_attempts: 1,
        ..Config::default()
    };
    let address = Point::from_scalar(&sk).address();
    let signature = Signature::sign_with(&sk, &Scalar::ONE, &config).unwrap();
    assert!(signature.verify(&address, &Scalar::ONE));
}

#[test]
fn identity_nonce_is_rejected() {
    let sk = random_scalar().unwrap();
    let address = Point::from_scalar(&sk).address();
    let signature = Signature {
        nonce_point: Point::identity(),
        s: Scalar::ONE,
    };
    assert!(!signature.verify(&address, &Scalar::ONE));
}

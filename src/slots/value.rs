use crate::crypto::{
    scalar_from_slice, scalar_to_bytes, Address, Commitment, Point, Scalar, Transcript, POINT_LEN,
    SCALAR_LEN,
};
use crate::error::Error;

use super::Privacy;

/// Plaintext amount; input values also carry a nonce against signature replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaintextValue {
    pub nonce: Option<Scalar>,
    pub value: Scalar,
}

impl PlaintextValue {
    pub fn new(value: Scalar) -> Self {
        PlaintextValue { nonce: None, value }
    }

    pub fn with_nonce(nonce: Scalar, value: Scalar) -> Self {
        PlaintextValue {
            nonce: Some(nonce),
            value,
        }
    }

    /// Digest signed by the owner of `address` to spend this value.
    pub fn digest(&self, address: &Address) -> Scalar {
        Transcript::new()
            .append_bytes(address.as_bytes())
            .append_bytes(&self.to_bytes())
            .challenge()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 * SCALAR_LEN);
        if let Some(ref nonce) = self.nonce {
            bytes.extend_from_slice(&scalar_to_bytes(nonce));
        }
        bytes.extend_from_slice(&scalar_to_bytes(&self.value));
        bytes
    }
}

/// Committed amount `c = v·g + r·h`, with `d = r·g` if the value is solvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidentialValue {
    pub commitment: Commitment,
    pub decryption: Option<Commitment>,
}

impl ConfidentialValue {
    pub fn is_solvable(&self) -> bool {
        self.decryption.is_some()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.commitment.to_bytes().to_vec();
        if let Some(ref d) = self.decryption {
            bytes.extend_from_slice(&d.to_bytes());
        }
        bytes
    }

    fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        match slice.len() {
            POINT_LEN => Ok(ConfidentialValue {
                commitment: Point::from_slice(slice)?,
                decryption: None,
            }),
            len if len == 2 * POINT_LEN => Ok(ConfidentialValue {
                commitment: Point::from_slice(&slice[..POINT_LEN])?,
                decryption: Some(Point::from_slice(&slice[POINT_LEN..])?),
            }),
            len => Err(Error::decode(
                "confidential value",
                format!("invalid length {}", len),
            )),
        }
    }
}

/// Amount held by a slot, one variant per privacy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Plaintext(PlaintextValue),
    Secret(ConfidentialValue),
    Anonymous(ConfidentialValue),
}

impl Value {
    pub fn privacy(&self) -> Privacy {
        match self {
            Value::Plaintext(_) => Privacy::Plaintext,
            Value::Secret(_) => Privacy::Secret,
            Value::Anonymous(_) => Privacy::Anonymous,
        }
    }

    pub fn confidential(&self) -> Option<&ConfidentialValue> {
        match self {
            Value::Plaintext(_) => None,
            Value::Secret(value) | Value::Anonymous(value) => Some(value),
        }
    }

    /// Whether a key holder can recover the amount. Plaintext values always can.
    pub fn is_solvable(&self) -> bool {
        self.confidential().map_or(true, ConfidentialValue::is_solvable)
    }

    /// Encoded length of a value of the given tier.
    ///
    /// `extended` selects the longer form: a nonce for plaintext values, the
    /// decryption component for confidential ones.
    pub fn byte_len(privacy: Privacy, extended: bool) -> Result<usize, Error> {
        let factor = if extended { 2 } else { 1 };
        match privacy {
            Privacy::Plaintext => Ok(factor * SCALAR_LEN),
            Privacy::Secret | Privacy::Anonymous => Ok(factor * POINT_LEN),
            Privacy::Obscure => Err(Error::decode("value", "obscure privacy tier is reserved")),
        }
    }

    /// Decodes a value of the given tier; the form is inferred from the length.
    pub fn from_slice(privacy: Privacy, slice: &[u8]) -> Result<Self, Error> {
        match privacy {
            Privacy::Plaintext => match slice.len() {
                SCALAR_LEN => Ok(Value::Plaintext(PlaintextValue::new(scalar_from_slice(
                    slice,
                )?))),
                len if len == 2 * SCALAR_LEN => Ok(Value::Plaintext(PlaintextValue::with_nonce(
                    scalar_from_slice(&slice[..SCALAR_LEN])?,
                    scalar_from_slice(&slice[SCALAR_LEN..])?,
                ))),
                len => Err(Error::decode(
                    "plaintext value",
                    format!("invalid length {}", len),
                )),
            },
            Privacy::Secret => ConfidentialValue::from_slice(slice).map(Value::Secret),
            Privacy::Anonymous => ConfidentialValue::from_slice(slice).map(Value::Anonymous),
            Privacy::Obscure => Err(Error::decode("value", "obscure privacy tier is reserved")),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Plaintext(value) => value.to_bytes(),
            Value::Secret(value) | Value::Anonymous(value) => value.to_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{random_scalar, G};

    #[test]
    fn value_encoding() {
        let c = *G * random_scalar().unwrap();
        let d = *G * random_scalar().unwrap();
        let values = [
            Value::Plaintext(PlaintextValue::new(Scalar::from(7_u64))),
            Value::Plaintext(PlaintextValue::with_nonce(Scalar::ONE, Scalar::from(7_u64))),
            Value::Secret(ConfidentialValue {
                commitment: c,
                decryption: Some(d),
            }),
            Value::Anonymous(ConfidentialValue {
                commitment: c,
                decryption: None,
            }),
        ];
        let lens = [32, 64, 66, 33];
        for (value, &len) in values.iter().zip(&lens) {
            let bytes = value.to_bytes();
            assert_eq!(bytes.len(), len);
            assert_eq!(Value::from_slice(value.privacy(), &bytes).unwrap(), *value);
        }
        assert!(values[2].is_solvable());
        assert!(!values[3].is_solvable());
        assert!(Value::from_slice(Privacy::Secret, &[0; 34]).is_err());
        assert_eq!(Value::byte_len(Privacy::Anonymous, true).unwrap(), 66);
    }

    #[test]
    fn digest_binds_nonce_and_address() {
        let address = G.address();
        let other = (*G + *G).address();
        let value = PlaintextValue::with_nonce(Scalar::ONE, Scalar::from(10_u64));
        let replay = PlaintextValue::with_nonce(Scalar::from(2_u64), Scalar::from(10_u64));
        assert_ne!(value.digest(&address), replay.digest(&address));
        assert_ne!(value.digest(&address), value.digest(&other));
    }
}

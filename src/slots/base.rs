use crate::crypto::{Address, Generator, Point, G, POINT_LEN};
use crate::error::Error;

use super::Privacy;

/// Base of a secret account: values are committed as `v·G + r·h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretBase {
    pub h: Generator,
}

/// Base of an anonymous account: values are committed as `v·g + r·h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonymousBase {
    pub g: Generator,
    pub h: Generator,
}

/// Public generators that define how a value of a given tier is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Plaintext(Address),
    Secret(SecretBase),
    Anonymous(AnonymousBase),
}

impl Base {
    pub fn privacy(&self) -> Privacy {
        match self {
            Base::Plaintext(_) => Privacy::Plaintext,
            Base::Secret(_) => Privacy::Secret,
            Base::Anonymous(_) => Privacy::Anonymous,
        }
    }

    /// Value and blinding generators; `None` for plaintext bases.
    pub fn generators(&self) -> Option<(Generator, Generator)> {
        match self {
            Base::Plaintext(_) => None,
            Base::Secret(base) => Some((*G, base.h)),
            Base::Anonymous(base) => Some((base.g, base.h)),
        }
    }

    /// Encoded length of a base of the given tier.
    pub fn byte_len(privacy: Privacy) -> Result<usize, Error> {
        match privacy {
            Privacy::Plaintext => Ok(Address::BYTE_LEN),
            Privacy::Secret => Ok(POINT_LEN),
            Privacy::Anonymous => Ok(2 * POINT_LEN),
            Privacy::Obscure => Err(Error::decode("base", "obscure privacy tier is reserved")),
        }
    }

    pub fn from_slice(privacy: Privacy, slice: &[u8]) -> Result<Self, Error> {
        let expected = Self::byte_len(privacy)?;
        if slice.len() != expected {
            return Err(Error::wrong_length("base", expected, slice.len()));
        }
        Ok(match privacy {
            Privacy::Plaintext => Base::Plaintext(Address::from_slice(slice)?),
            Privacy::Secret => Base::Secret(SecretBase {
                h: Point::from_slice(slice)?,
            }),
            _ => Base::Anonymous(AnonymousBase {
                g: Point::from_slice(&slice[..POINT_LEN])?,
                h: Point::from_slice(&slice[POINT_LEN..])?,
            }),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Base::Plaintext(address) => address.as_bytes().to_vec(),
            Base::Secret(base) => base.h.to_bytes().to_vec(),
            Base::Anonymous(base) => {
                let mut bytes = base.g.to_bytes().to_vec();
                bytes.extend_from_slice(&base.h.to_bytes());
                bytes
            }
        }
    }
}

impl From<Address> for Base {
    fn from(address: Address) -> Self {
        Base::Plaintext(address)
    }
}

impl From<SecretBase> for Base {
    fn from(base: SecretBase) -> Self {
        Base::Secret(base)
    }
}

impl From<AnonymousBase> for Base {
    fn from(base: AnonymousBase) -> Self {
        Base::Anonymous(base)
    }
}

#[test]
fn base_encoding() {
    use crate::crypto::{random_scalar, Scalar};

    let h = Point::from_scalar(&random_scalar().unwrap());
    let g = Point::from_scalar(&Scalar::from(5_u64));
    let bases = [
        Base::Plaintext(h.address()),
        Base::Secret(SecretBase { h }),
        Base::Anonymous(AnonymousBase { g, h }),
    ];
    for (base, &len) in bases.iter().zip(&[20, 33, 66]) {
        let bytes = base.to_bytes();
        assert_eq!(bytes.len(), len);
        assert_eq!(Base::from_slice(base.privacy(), &bytes).unwrap(), *base);
        assert!(Base::from_slice(base.privacy(), &bytes[1..]).is_err());
    }
    assert_eq!(bases[1].generators(), Some((*G, h)));
    assert!(Base::byte_len(Privacy::Obscure).is_err());
}

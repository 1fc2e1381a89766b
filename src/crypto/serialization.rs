//! Supporting routines for serializing crypto types.
//!
//! Every wire type of the crate has a canonical byte form (`to_bytes` / `from_slice`).
//! Text formats (`Display`, `FromStr`, serde) reuse it as a lowercase hex string.

use std::fmt;

use super::{Address, Point};

/// Implements hex `Display` / `FromStr` and serde traits on top of the canonical
/// byte encoding of a type.
///
/// The type must provide `to_bytes()` (anything indexable into `[u8]`) and a decoder
/// `fn(&[u8]) -> Result<Self, Error>`, `from_slice` unless given explicitly.
macro_rules! impl_hex_codec {
    ($ty:ident, $what:expr) => {
        impl_hex_codec!($ty, $what, $ty::from_slice);
    };
    ($ty:ident, $what:expr, $decode:path) => {
        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(&::hex::encode(&self.to_bytes()[..]))
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = ::hex::decode(s)
                    .map_err(|e| $crate::error::Error::decode($what, e.to_string()))?;
                $decode(&bytes)
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                use serde::de::Error as _;

                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

impl_hex_codec!(Point, "point");
impl_hex_codec!(Address, "address");

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Point").field(&self.to_string()).finish()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[test]
fn point_roundtrip() {
    use super::{random_scalar, G};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Value {
        first: u32,
        second: Point,
        third: Address,
    }

    let point = Point::from_scalar(&random_scalar().expect("random"));
    let value = Value {
        first: 123,
        second: point,
        third: G.address(),
    };
    let value_json = serde_json::to_string(&value).expect("to_string");
    assert!(value_json.contains(&point.to_string()));
    let value_copy: Value = serde_json::from_str(&value_json).expect("from_str");
    assert_eq!(value, value_copy);
}

#[test]
fn malformed_hex_is_rejected() {
    assert!("zz".parse::<Point>().is_err());
    assert!("02".parse::<Point>().is_err());
    assert!(serde_json::from_str::<Address>("\"00ff\"").is_err());

    let hex = G_HEX.parse::<Point>().expect("parse");
    assert_eq!(hex, *super::G);
}

#[cfg(test)]
const G_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

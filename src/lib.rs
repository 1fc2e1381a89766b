//! Confidential-value transactions over secp256k1.
//!
//! Values move between *slots* of three privacy tiers:
//!
//! - **plaintext**: amounts are public and owned by an [`Address`]; spends are signed
//! - **secret**: amounts are hidden in Pedersen commitments under the owner's secret base
//! - **anonymous**: as secret, but under a fresh base pair unlinkable to the owner
//!
//! Confidential outputs carry a [format proof] (the commitment pair is well-formed, so the
//! owner can recover the amount with [`PrivateKey::solve()`]) and a [range proof] (the
//! amount is short and non-negative). A [`Transaction`] is valid if all slot proofs check
//! and its inputs add up to its outputs; sums across different bases are certified with a
//! [linear-equation proof] (see the [`conservation`] module).
//!
//! # Examples
//!
//! ```
//! # extern crate private_ledger;
//! use private_ledger::{slots::{Base, Privacy, Slot}, Opening, PrivateKey};
//!
//! # fn main() -> Result<(), private_ledger::Error> {
//! let key = PrivateKey::random()?;
//! let base = Base::Secret(key.secret_base());
//! let output = Slot::output(&base, &Opening::new(114_514)?, true, None)?;
//! assert!(output.check_zks());
//!
//! let bytes = output.to_bytes();
//! let decoded = Slot::from_slice(Privacy::Secret, &bytes)?;
//! assert_eq!(key.solve(decoded.value(), decoded.base())?, 114_514);
//! # Ok(())
//! # }
//! ```
//!
//! [`Address`]: crate::crypto::Address
//! [format proof]: crate::proofs::FormatProof
//! [range proof]: crate::proofs::RangeProof
//! [linear-equation proof]: crate::proofs::LinearProof
//! [`PrivateKey::solve()`]: crate::PrivateKey::solve()
//! [`Transaction`]: crate::Transaction
//! [`conservation`]: crate::conservation

extern crate byteorder;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate hex;
extern crate k256;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate rand;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate sha2;
#[cfg(test)]
extern crate serde_json;

#[macro_use]
pub mod crypto;
pub mod conservation;
pub mod error;
pub mod proofs;
pub mod secrets;
pub mod slots;
pub mod transactions;

pub use crate::error::Error;
pub use crate::secrets::{Opening, PrivateKey, MAX_SHORT_VALUE};
pub use crate::transactions::Transaction;

/// Tunable limits of the crate.
///
/// [`CONFIG`] holds the defaults; callers with their own limits (for example, read from
/// a JSON file through serde) pass a `Config` to [`PrivateKey::solve_with()`] and
/// [`Signature::sign_with()`].
///
/// [`PrivateKey::solve_with()`]: crate::PrivateKey::solve_with()
/// [`Signature::sign_with()`]: crate::proofs::Signature::sign_with()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclusive upper bound of the amount search in [`PrivateKey::solve()`].
    ///
    /// [`PrivateKey::solve()`]: crate::PrivateKey::solve()
    pub solve_bound: u64,
    /// Number of nonces tried before signing gives up.
    pub signing_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            solve_bound: MAX_SHORT_VALUE,
            signing_attempts: 64,
        }
    }
}

lazy_static! {
    /// Process-wide configuration.
    pub static ref CONFIG: Config = Config::default();
}

#[test]
fn config_defaults_fill_missing_fields() {
    let config: Config = serde_json::from_str(r#"{ "signing_attempts": 8 }"#).unwrap();
    assert_eq!(config.signing_attempts, 8);
    assert_eq!(config.solve_bound, MAX_SHORT_VALUE);
    assert_eq!(*CONFIG, Config::default());
}

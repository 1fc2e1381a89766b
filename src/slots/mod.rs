//! Transaction slots: the input and output records of a transaction.
//!
//! A slot is a [`Base`] and a [`Value`] of the same privacy tier, tagged with a
//! [`SlotMode`] byte and optionally carrying a [`ZkBundle`] and a [`ContractPayload`].
//!
//! # Wire format
//!
//! ```text
//! mode (1) ∥ base ∥ value ∥ zks ∥ contract payload
//! ```
//!
//! All parts but the contract payload have lengths determined by the mode byte:
//!
//! | Tier | Base | Input value | Output value | ZKs |
//! |------|------|-------------|--------------|-----|
//! | plaintext | 20 | 64 (`nonce ∥ v`) | 32 | signature on inputs |
//! | secret | 33 | 66 / 33 | 66 / 33 | format and range proofs on outputs |
//! | anonymous | 66 | 66 / 33 | 66 / 33 | format and range proofs on outputs |
//!
//! Confidential values take 66 bytes when solvable and 33 bytes otherwise. Output
//! slots whose mode names a contract kind end with the payload, prefixed by its length
//! as a big-endian `u16`.
//!
//! Decoding never implies proof validity: call [`Slot::check_zks()`] on decoded slots.
//!
//! [`Base`]: crate::slots::Base
//! [`Value`]: crate::slots::Value
//! [`SlotMode`]: crate::slots::SlotMode
//! [`ZkBundle`]: crate::slots::ZkBundle
//! [`ContractPayload`]: crate::slots::ContractPayload
//! [`Slot::check_zks()`]: crate::slots::Slot::check_zks()

mod base;
mod contract;
mod mode;
mod value;
mod zks;

pub use self::base::{AnonymousBase, Base, SecretBase};
pub use self::contract::ContractPayload;
pub use self::mode::{ContractKind, Privacy, SlotMode};
pub use self::value::{ConfidentialValue, PlaintextValue, Value};
pub use self::zks::{ConfidentialProofs, ZkBundle};

use crate::crypto::{Point, Scalar, POINT_LEN, SCALAR_LEN};
use crate::error::Error;
use crate::proofs::SIGNATURE_LEN;
use crate::secrets::{Opening, PrivateKey};

const MODE_LEN: usize = 1;

pub const PLAINTEXT_BASE_LEN: usize = 20;
pub const SECRET_BASE_LEN: usize = POINT_LEN;
pub const ANONYMOUS_BASE_LEN: usize = 2 * POINT_LEN;

pub const PLAINTEXT_INPUT_VALUE_LEN: usize = 2 * SCALAR_LEN;
pub const PLAINTEXT_OUTPUT_VALUE_LEN: usize = SCALAR_LEN;
pub const SOLVABLE_VALUE_LEN: usize = 2 * POINT_LEN;
pub const NON_SOLVABLE_VALUE_LEN: usize = POINT_LEN;

pub const PLAINTEXT_ZK_LEN: usize = SIGNATURE_LEN;
pub const CONFIDENTIAL_ZK_LEN: usize = ConfidentialProofs::BYTE_LEN;

pub const PLAINTEXT_INPUT_SLOT_LEN: usize =
    MODE_LEN + PLAINTEXT_BASE_LEN + PLAINTEXT_INPUT_VALUE_LEN + PLAINTEXT_ZK_LEN;
pub const PLAINTEXT_OUTPUT_SLOT_LEN: usize =
    MODE_LEN + PLAINTEXT_BASE_LEN + PLAINTEXT_OUTPUT_VALUE_LEN;
pub const SECRET_INPUT_SLOT_LEN: usize = MODE_LEN + SECRET_BASE_LEN + SOLVABLE_VALUE_LEN;
pub const SECRET_NON_SOLVABLE_INPUT_SLOT_LEN: usize =
    MODE_LEN + SECRET_BASE_LEN + NON_SOLVABLE_VALUE_LEN;
pub const SECRET_OUTPUT_SLOT_LEN: usize = SECRET_INPUT_SLOT_LEN + CONFIDENTIAL_ZK_LEN;
pub const SECRET_NON_SOLVABLE_OUTPUT_SLOT_LEN: usize =
    SECRET_NON_SOLVABLE_INPUT_SLOT_LEN + CONFIDENTIAL_ZK_LEN;
pub const ANONYMOUS_INPUT_SLOT_LEN: usize = MODE_LEN + ANONYMOUS_BASE_LEN + SOLVABLE_VALUE_LEN;
pub const ANONYMOUS_NON_SOLVABLE_INPUT_SLOT_LEN: usize =
    MODE_LEN + ANONYMOUS_BASE_LEN + NON_SOLVABLE_VALUE_LEN;
pub const ANONYMOUS_OUTPUT_SLOT_LEN: usize = ANONYMOUS_INPUT_SLOT_LEN + CONFIDENTIAL_ZK_LEN;
pub const ANONYMOUS_NON_SOLVABLE_OUTPUT_SLOT_LEN: usize =
    ANONYMOUS_NON_SOLVABLE_INPUT_SLOT_LEN + CONFIDENTIAL_ZK_LEN;

/// Input or output record of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    mode: SlotMode,
    base: Base,
    value: Value,
    zks: Option<ZkBundle>,
    contract: Option<ContractPayload>,
}

impl Slot {
    /// Creates an input spending `amount` from the plaintext account of `key`.
    ///
    /// The slot is signed over its address and value, so `nonce` must be fresh for every
    /// spend from the account.
    pub fn plaintext_input(key: &PrivateKey, nonce: Scalar, amount: Scalar) -> Result<Self, Error> {
        let address = key.plaintext_base();
        let value = PlaintextValue::with_nonce(nonce, amount);
        let signature = key.sign(&value.digest(&address))?;
        Ok(Slot {
            mode: SlotMode::new(Privacy::Plaintext, ContractKind::None, false, false),
            base: Base::Plaintext(address),
            value: Value::Plaintext(value),
            zks: Some(ZkBundle::Plaintext(signature)),
            contract: None,
        })
    }

    /// Creates an output paying `opening` to `base`.
    ///
    /// Plaintext outputs carry the amount in the clear and no proofs; the blinding of
    /// `opening` is ignored for them.
    ///
    /// # Errors
    ///
    /// - `NotSolvable` for a confidential output with `solvable == false`
    /// - `RangeExceeded` for a confidential amount that does not fit into a short range
    ///   proof
    pub fn output(
        base: &Base,
        opening: &Opening,
        solvable: bool,
        contract: Option<ContractPayload>,
    ) -> Result<Self, Error> {
        let kind = contract
            .as_ref()
            .map_or(ContractKind::None, ContractPayload::kind);

        let (g, h) = match base.generators() {
            Some(generators) => generators,
            None => {
                return Ok(Slot {
                    mode: SlotMode::new(Privacy::Plaintext, kind, true, false),
                    base: *base,
                    value: Value::Plaintext(PlaintextValue::new(*opening.value())),
                    zks: None,
                    contract,
                })
            }
        };
        if !solvable {
            return Err(Error::NotSolvable);
        }

        let confidential = ConfidentialValue {
            commitment: Point::commit(&g, &h, opening.value(), opening.blinding()),
            decryption: Some(g * opening.blinding()),
        };
        let proofs = ConfidentialProofs::prove(&g, &h, &confidential, opening)?;
        let (value, zks) = match base {
            Base::Secret(_) => (Value::Secret(confidential), ZkBundle::Secret(proofs)),
            _ => (Value::Anonymous(confidential), ZkBundle::Anonymous(proofs)),
        };
        Ok(Slot {
            mode: SlotMode::new(base.privacy(), kind, true, true),
            base: *base,
            value,
            zks: Some(zks),
            contract,
        })
    }

    /// Creates an input consuming a confidential `output`.
    ///
    /// The input reuses the base and value of the output and keeps its mode bits except
    /// for the direction; proofs and contract payload are dropped.
    pub fn input(output: &Slot) -> Result<Self, Error> {
        if !output.mode.privacy().is_confidential() {
            return Err(output
                .mode
                .mismatch("only confidential outputs can be spent by reference"));
        }
        Ok(Slot {
            mode: output.mode.to_input(),
            base: output.base,
            value: output.value,
            zks: None,
            contract: None,
        })
    }

    pub fn mode(&self) -> SlotMode {
        self.mode
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn zks(&self) -> Option<&ZkBundle> {
        self.zks.as_ref()
    }

    pub fn contract(&self) -> Option<&ContractPayload> {
        self.contract.as_ref()
    }

    /// Verifies the proofs carried by the slot against its base and value.
    ///
    /// Slots that carry no proofs check trivially.
    pub fn check_zks(&self) -> bool {
        match self.zks {
            None => true,
            Some(ZkBundle::Plaintext(ref signature)) => match (&self.base, &self.value) {
                (Base::Plaintext(address), Value::Plaintext(value)) => {
                    signature.verify(address, &value.digest(address))
                }
                _ => false,
            },
            Some(ZkBundle::Secret(ref proofs)) | Some(ZkBundle::Anonymous(ref proofs)) => {
                match (self.base.generators(), self.value.confidential()) {
                    (Some((g, h)), Some(value)) => proofs.verify(&g, &h, value),
                    _ => false,
                }
            }
        }
    }

    /// Key of the slot in the external state store.
    pub fn state_key(&self) -> Vec<u8> {
        self.base.to_bytes()
    }

    /// Value of the slot in the external state store; see [`Value::from_slice()`].
    ///
    /// [`Value::from_slice()`]: crate::slots::Value::from_slice()
    pub fn state_value(&self) -> Vec<u8> {
        self.value.to_bytes()
    }

    /// Length of the part of a slot determined by its mode byte.
    pub fn fixed_len(mode: SlotMode) -> Result<usize, Error> {
        let privacy = mode.privacy();
        if privacy == Privacy::Obscure {
            return Err(mode.mismatch("obscure privacy tier is reserved"));
        }

        let (extended_value, zk_len) = match (privacy, mode.is_output()) {
            (Privacy::Plaintext, false) => (true, PLAINTEXT_ZK_LEN),
            (Privacy::Plaintext, true) => (false, 0),
            (_, false) => (mode.is_solvable(), 0),
            (_, true) => (mode.is_solvable(), CONFIDENTIAL_ZK_LEN),
        };
        Ok(MODE_LEN
            + Base::byte_len(privacy)?
            + Value::byte_len(privacy, extended_value)?
            + zk_len)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.mode.as_byte()];
        bytes.extend_from_slice(&self.base.to_bytes());
        bytes.extend_from_slice(&self.value.to_bytes());
        if let Some(ref zks) = self.zks {
            bytes.extend_from_slice(&zks.to_bytes());
        }
        if let Some(ref contract) = self.contract {
            contract.write(&mut bytes);
        }
        bytes
    }

    /// Decodes a slot whose privacy bits must equal `expected`.
    pub fn from_slice(expected: Privacy, slice: &[u8]) -> Result<Self, Error> {
        let mode = slice
            .first()
            .map(|&byte| SlotMode::from(byte))
            .ok_or_else(|| Error::decode("slot", "empty input"))?;
        mode.expect_privacy(expected)?;
        Self::decode(slice)
    }

    /// Decodes a slot of the tier named by its mode byte.
    pub fn decode(slice: &[u8]) -> Result<Self, Error> {
        let (&mode_byte, rest) = slice
            .split_first()
            .ok_or_else(|| Error::decode("slot", "empty input"))?;
        let mode = SlotMode::from(mode_byte);
        let fixed_len = Self::fixed_len(mode)?;
        if slice.len() < fixed_len {
            return Err(Error::wrong_length("slot", fixed_len, slice.len()));
        }

        let privacy = mode.privacy();
        let (base_bytes, rest) = rest.split_at(Base::byte_len(privacy)?);
        let value_len = Value::byte_len(
            privacy,
            if privacy.is_confidential() {
                mode.is_solvable()
            } else {
                !mode.is_output()
            },
        )?;
        let (value_bytes, rest) = rest.split_at(value_len);
        let (zk_bytes, rest) = rest.split_at(fixed_len - MODE_LEN - base_bytes.len() - value_len);

        let zks = if zk_bytes.is_empty() {
            None
        } else {
            Some(ZkBundle::from_slice(privacy, zk_bytes)?)
        };
        let kind = mode.contract_kind();
        let contract = if mode.is_output() && kind != ContractKind::None {
            Some(ContractPayload::from_slice(kind, rest)?)
        } else if rest.is_empty() {
            None
        } else {
            return Err(Error::wrong_length("slot", fixed_len, slice.len()));
        };

        Ok(Slot {
            mode,
            base: Base::from_slice(privacy, base_bytes)?,
            value: Value::from_slice(privacy, value_bytes)?,
            zks,
            contract,
        })
    }
}

impl_hex_codec!(Slot, "slot", Slot::decode);

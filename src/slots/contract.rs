use byteorder::{BigEndian, ByteOrder};

use crate::error::Error;

use super::ContractKind;

const LENGTH_PREFIX_LEN: usize = 2;

/// Opaque contract code appended to an output slot.
///
/// The payload is produced by the contract compiler and is never interpreted here;
/// on the wire it is prefixed with its length as a big-endian `u16`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractPayload {
    kind: ContractKind,
    code: Vec<u8>,
}

impl ContractPayload {
    pub const MAX_LEN: usize = u16::max_value() as usize;

    pub fn new(kind: ContractKind, code: Vec<u8>) -> Result<Self, Error> {
        if kind == ContractKind::None {
            return Err(Error::decode("contract payload", "contract kind is not set"));
        }
        if code.len() > Self::MAX_LEN {
            return Err(Error::ContractTooLarge(code.len()));
        }
        Ok(ContractPayload { kind, code })
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Parses a payload that must span the whole of `slice`.
    pub(crate) fn from_slice(kind: ContractKind, slice: &[u8]) -> Result<Self, Error> {
        if slice.is_empty() {
            return Err(Error::MissingContract);
        }
        if slice.len() < LENGTH_PREFIX_LEN {
            return Err(Error::wrong_length(
                "contract payload",
                LENGTH_PREFIX_LEN,
                slice.len(),
            ));
        }
        let len = BigEndian::read_u16(&slice[..LENGTH_PREFIX_LEN]) as usize;
        let code = &slice[LENGTH_PREFIX_LEN..];
        if code.len() != len {
            return Err(Error::wrong_length("contract payload", len, code.len()));
        }
        Self::new(kind, code.to_vec())
    }

    pub(crate) fn write(&self, buffer: &mut Vec<u8>) {
        let mut prefix = [0_u8; LENGTH_PREFIX_LEN];
        BigEndian::write_u16(&mut prefix, self.code.len() as u16);
        buffer.extend_from_slice(&prefix);
        buffer.extend_from_slice(&self.code);
    }
}

#[test]
fn payload_encoding() {
    let payload = ContractPayload::new(ContractKind::Call, b"transfer(42)".to_vec()).unwrap();
    let mut bytes = vec![];
    payload.write(&mut bytes);
    assert_eq!(bytes.len(), LENGTH_PREFIX_LEN + payload.code().len());
    assert_eq!(&bytes[..2], &[0, 12]);
    assert_eq!(
        ContractPayload::from_slice(ContractKind::Call, &bytes).unwrap(),
        payload
    );

    assert_eq!(
        ContractPayload::from_slice(ContractKind::Call, &[]),
        Err(Error::MissingContract)
    );
    assert!(ContractPayload::from_slice(ContractKind::Call, &bytes[..5]).is_err());
    assert!(ContractPayload::new(ContractKind::None, vec![]).is_err());
}

#[test]
fn oversized_payload_is_rejected() {
    let code = vec![0_u8; ContractPayload::MAX_LEN + 1];
    assert_eq!(
        ContractPayload::new(ContractKind::Creation, code),
        Err(Error::ContractTooLarge(65_536))
    );
    let code = vec![0_u8; ContractPayload::MAX_LEN];
    assert!(ContractPayload::new(ContractKind::Creation, code).is_ok());
}

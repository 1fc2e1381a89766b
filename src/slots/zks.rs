use crate::crypto::{Generator, Point};
use crate::error::Error;
use crate::proofs::{
    FormatProof, FormatStatement, RangeProof, RangeStatement, Signature, FORMAT_PROOF_LEN,
    RANGE_PROOF_SHORT_LEN, SHORT_RANGE_BITS, SIGNATURE_LEN,
};
use crate::secrets::Opening;

use super::{ConfidentialValue, Privacy};

/// Proofs attached to a confidential output: the value is well-formed and short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidentialProofs {
    pub format: FormatProof,
    pub range: RangeProof,
}

impl ConfidentialProofs {
    pub const BYTE_LEN: usize = FORMAT_PROOF_LEN + RANGE_PROOF_SHORT_LEN;

    /// Proves that `value` opens to `opening` over generators `(g, h)`.
    ///
    /// # Errors
    ///
    /// Fails with `NotSolvable` if `value` has no decryption component, and with
    /// `RangeExceeded` if the amount does not fit into a short range proof.
    pub fn prove(
        g: &Generator,
        h: &Generator,
        value: &ConfidentialValue,
        opening: &Opening,
    ) -> Result<Self, Error> {
        let statement = Self::format_statement(g, h, value).ok_or(Error::NotSolvable)?;
        let range_statement =
            RangeStatement::with_shared_gens(value.commitment, *g, *h, SHORT_RANGE_BITS)?;
        let range = RangeProof::prove(&range_statement, opening.value(), opening.blinding())?;
        let format = FormatProof::prove(&statement, opening.value(), opening.blinding())?;
        Ok(ConfidentialProofs { format, range })
    }

    pub fn verify(&self, g: &Generator, h: &Generator, value: &ConfidentialValue) -> bool {
        let statement = match Self::format_statement(g, h, value) {
            Some(statement) => statement,
            None => {
                debug!("confidential proofs rejected: value is not solvable");
                return false;
            }
        };
        let range_statement =
            match RangeStatement::with_shared_gens(value.commitment, *g, *h, SHORT_RANGE_BITS) {
                Ok(statement) => statement,
                Err(_) => return false,
            };
        self.format.verify(&statement) && self.range.verify(&range_statement)
    }

    fn format_statement(
        g: &Point,
        h: &Point,
        value: &ConfidentialValue,
    ) -> Option<FormatStatement> {
        value.decryption.map(|c2| FormatStatement {
            g: *g,
            h: *h,
            c1: value.commitment,
            c2,
        })
    }

    fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() != Self::BYTE_LEN {
            return Err(Error::wrong_length("proofs", Self::BYTE_LEN, slice.len()));
        }
        Ok(ConfidentialProofs {
            format: FormatProof::from_slice(&slice[..FORMAT_PROOF_LEN])?,
            range: RangeProof::from_slice(&slice[FORMAT_PROOF_LEN..])?,
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.format.to_bytes();
        bytes.extend_from_slice(&self.range.to_bytes());
        bytes
    }
}

/// Zero-knowledge material carried by a slot, one variant per privacy tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZkBundle {
    Plaintext(Signature),
    Secret(ConfidentialProofs),
    Anonymous(ConfidentialProofs),
}

impl ZkBundle {
    pub fn privacy(&self) -> Privacy {
        match self {
            ZkBundle::Plaintext(_) => Privacy::Plaintext,
            ZkBundle::Secret(_) => Privacy::Secret,
            ZkBundle::Anonymous(_) => Privacy::Anonymous,
        }
    }

    pub fn byte_len(privacy: Privacy) -> Result<usize, Error> {
        match privacy {
            Privacy::Plaintext => Ok(SIGNATURE_LEN),
            Privacy::Secret | Privacy::Anonymous => Ok(ConfidentialProofs::BYTE_LEN),
            Privacy::Obscure => Err(Error::decode("proofs", "obscure privacy tier is reserved")),
        }
    }

    pub fn from_slice(privacy: Privacy, slice: &[u8]) -> Result<Self, Error> {
        match privacy {
            Privacy::Plaintext => Signature::from_slice(slice).map(ZkBundle::Plaintext),
            Privacy::Secret => ConfidentialProofs::from_slice(slice).map(ZkBundle::Secret),
            Privacy::Anonymous => ConfidentialProofs::from_slice(slice).map(ZkBundle::Anonymous),
            Privacy::Obscure => Err(Error::decode("proofs", "obscure privacy tier is reserved")),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ZkBundle::Plaintext(signature) => signature.to_bytes(),
            ZkBundle::Secret(proofs) | ZkBundle::Anonymous(proofs) => proofs.to_bytes(),
        }
    }
}

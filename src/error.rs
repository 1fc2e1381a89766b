//! Errors produced while building, decoding and aggregating confidential values.

/// Error type shared by every module of the crate.
///
/// Verification routines never return this type for a failed proof: they return `false`,
/// so that a verifier can keep evaluating other slots. Errors are reserved for
/// malformed input and for aborted construction of a single object.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum Error {
    #[fail(display = "cannot decode {}: {}", what, reason)]
    Decode {
        what: &'static str,
        reason: String,
    },

    #[fail(display = "slot mode {:#010b} rejected: {}", mode, reason)]
    SlotModeMismatch { mode: u8, reason: &'static str },

    #[fail(display = "value has {} significant bits, proof covers only {}", bits, max)]
    RangeExceeded { bits: usize, max: usize },

    #[fail(display = "range of {} bits exceeds supported width of {} bits", bits, max)]
    BitWidthExceeded { bits: usize, max: usize },

    #[fail(display = "value has no decryption component")]
    NotSolvable,

    #[fail(display = "no value below {} matches the commitment", bound)]
    ValueNotFound { bound: u64 },

    #[fail(display = "auxiliary variables do not fit the aggregation case")]
    AuxiliarySizeMismatch,

    #[fail(display = "auxiliary variable has unexpected type: {}", _0)]
    AuxiliaryTypeMismatch(&'static str),

    #[fail(display = "{} check not passed", _0)]
    ProofCheckFailed(&'static str),

    #[fail(display = "entropy source unavailable: {}", _0)]
    RandomnessUnavailable(String),

    #[fail(display = "length {} does not match length {}", _0, _1)]
    LengthMismatch(usize, usize),

    #[fail(display = "contract slot kind set without contract payload")]
    MissingContract,

    #[fail(display = "contract payload of {} bytes does not fit the length prefix", _0)]
    ContractTooLarge(usize),

    #[fail(display = "no usable signature nonce after {} attempts", _0)]
    SigningAttemptsExhausted(u32),

    #[fail(display = "inputs and outputs do not balance")]
    ConservationViolated,
}

impl Error {
    pub(crate) fn decode<S: Into<String>>(what: &'static str, reason: S) -> Self {
        Error::Decode {
            what,
            reason: reason.into(),
        }
    }

    /// Shorthand for a wrong-length decode failure.
    pub(crate) fn wrong_length(what: &'static str, expected: usize, actual: usize) -> Self {
        Error::decode(
            what,
            format!("expected {} bytes, got {}", expected, actual),
        )
    }
}

#[test]
fn errors_render_their_context() {
    let err = Error::wrong_length("commitment", 33, 32);
    assert_eq!(
        err.to_string(),
        "cannot decode commitment: expected 33 bytes, got 32"
    );

    let err = Error::RangeExceeded { bits: 21, max: 20 };
    assert_eq!(
        err.to_string(),
        "value has 21 significant bits, proof covers only 20"
    );
}

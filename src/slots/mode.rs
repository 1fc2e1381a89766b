use crate::error::Error;

/// Privacy tier of a slot (bits 7-6 of the mode byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privacy {
    Plaintext,
    Secret,
    Anonymous,
    /// Reserved tier; representable in a mode byte but never encoded or decoded.
    Obscure,
}

impl Privacy {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Privacy::Plaintext,
            0b01 => Privacy::Secret,
            0b10 => Privacy::Anonymous,
            _ => Privacy::Obscure,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Privacy::Plaintext => 0b00,
            Privacy::Secret => 0b01,
            Privacy::Anonymous => 0b10,
            Privacy::Obscure => 0b11,
        }
    }

    pub fn is_confidential(self) -> bool {
        self == Privacy::Secret || self == Privacy::Anonymous
    }
}

/// Kind of contract payload attached to a slot (bits 5-4 of the mode byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    None,
    Creation,
    Call,
    Receipt,
}

impl ContractKind {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => ContractKind::None,
            0b01 => ContractKind::Creation,
            0b10 => ContractKind::Call,
            _ => ContractKind::Receipt,
        }
    }

    fn bits(self) -> u8 {
        match self {
            ContractKind::None => 0b00,
            ContractKind::Creation => 0b01,
            ContractKind::Call => 0b10,
            ContractKind::Receipt => 0b11,
        }
    }
}

/// Mode byte of a slot.
///
/// | Bits | Meaning |
/// |------|---------|
/// | 7-6 | [`Privacy`] tier |
/// | 5-4 | [`ContractKind`] |
/// | 3 | output (1) / input (0) |
/// | 2 | solvable (1) / non-solvable (0) |
/// | 1-0 | gas flags, carried verbatim |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotMode(u8);

impl SlotMode {
    const PRIVACY_SHIFT: u8 = 6;
    const CONTRACT_SHIFT: u8 = 4;
    const OUTPUT_BIT: u8 = 1 << 3;
    const SOLVABLE_BIT: u8 = 1 << 2;
    const GAS_MASK: u8 = 0b11;

    pub fn new(privacy: Privacy, contract: ContractKind, is_output: bool, solvable: bool) -> Self {
        let mut byte =
            privacy.bits() << Self::PRIVACY_SHIFT | contract.bits() << Self::CONTRACT_SHIFT;
        if is_output {
            byte |= Self::OUTPUT_BIT;
        }
        if solvable {
            byte |= Self::SOLVABLE_BIT;
        }
        SlotMode(byte)
    }

    pub fn privacy(self) -> Privacy {
        Privacy::from_bits(self.0 >> Self::PRIVACY_SHIFT)
    }

    pub fn contract_kind(self) -> ContractKind {
        ContractKind::from_bits(self.0 >> Self::CONTRACT_SHIFT)
    }

    pub fn is_output(self) -> bool {
        self.0 & Self::OUTPUT_BIT != 0
    }

    pub fn is_solvable(self) -> bool {
        self.0 & Self::SOLVABLE_BIT != 0
    }

    pub fn gas_flags(self) -> u8 {
        self.0 & Self::GAS_MASK
    }

    pub fn with_gas_flags(self, flags: u8) -> Self {
        SlotMode(self.0 & !Self::GAS_MASK | flags & Self::GAS_MASK)
    }

    /// Same mode with the direction bit cleared.
    pub fn to_input(self) -> Self {
        SlotMode(self.0 & !Self::OUTPUT_BIT)
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }

    /// Checks the privacy bits against `expected`.
    pub fn expect_privacy(self, expected: Privacy) -> Result<(), Error> {
        let privacy = self.privacy();
        if privacy == Privacy::Obscure {
            return Err(self.mismatch("obscure privacy tier is reserved"));
        }
        if privacy != expected {
            return Err(self.mismatch(match expected {
                Privacy::Plaintext => "expected plaintext privacy bits",
                Privacy::Secret => "expected secret privacy bits",
                Privacy::Anonymous => "expected anonymous privacy bits",
                Privacy::Obscure => "obscure privacy tier is reserved",
            }));
        }
        Ok(())
    }

    pub(crate) fn mismatch(self, reason: &'static str) -> Error {
        Error::SlotModeMismatch {
            mode: self.0,
            reason,
        }
    }
}

impl From<u8> for SlotMode {
    fn from(byte: u8) -> Self {
        SlotMode(byte)
    }
}

impl From<SlotMode> for u8 {
    fn from(mode: SlotMode) -> u8 {
        mode.0
    }
}

#[test]
fn mode_bits() {
    let mode = SlotMode::new(Privacy::Anonymous, ContractKind::Call, true, true);
    assert_eq!(mode.as_byte(), 0b1010_1100);
    assert_eq!(mode.privacy(), Privacy::Anonymous);
    assert_eq!(mode.contract_kind(), ContractKind::Call);
    assert!(mode.is_output());
    assert!(mode.is_solvable());
    assert_eq!(mode.gas_flags(), 0);

    let input = mode.with_gas_flags(0b01).to_input();
    assert_eq!(input.as_byte(), 0b1010_0101);
    assert!(!input.is_output());
    assert_eq!(input.gas_flags(), 0b01);
    assert_eq!(SlotMode::from(0x45_u8).privacy(), Privacy::Secret);
}

#[test]
fn obscure_tier_is_rejected() {
    let mode = SlotMode::from(0b1100_1000);
    assert_eq!(mode.privacy(), Privacy::Obscure);
    assert!(!mode.privacy().is_confidential());
    assert_eq!(
        mode.expect_privacy(Privacy::Obscure).unwrap_err(),
        Error::SlotModeMismatch {
            mode: 0b1100_1000,
            reason: "obscure privacy tier is reserved",
        }
    );
    assert!(SlotMode::from(0x40).expect_privacy(Privacy::Anonymous).is_err());
    assert!(SlotMode::from(0x40).expect_privacy(Privacy::Secret).is_ok());
}

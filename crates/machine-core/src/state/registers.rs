/// Number of general-purpose registers (`R0..R3`).
pub const GENERAL_REGISTER_COUNT: usize = 4;
/// Number of index registers (`X1..X3`).
pub const INDEX_REGISTER_COUNT: usize = 3;

/// Mask for the 11-bit address registers (`PC` holds one extra bit so it can
/// point one past the top of memory after the last fetch).
pub const ADDRESS_MASK: u16 = 0x07FF;
/// Mask for the 12-bit `PC` view.
pub const PC_MASK: u16 = 0x0FFF;
/// Mask for the 4-bit `MFR` and `CC` registers.
pub const NIBBLE_MASK: u8 = 0x0F;

/// `CC` bit 0: arithmetic overflow.
pub const CC_OVERFLOW: u8 = 1 << 0;
/// `CC` bit 1: arithmetic underflow.
pub const CC_UNDERFLOW: u8 = 1 << 1;
/// `CC` bit 2: division by zero.
pub const CC_DIVZERO: u8 = 1 << 2;
/// `CC` bit 3: registers compared equal.
pub const CC_EQUAL: u8 = 1 << 3;

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
}

impl GeneralRegister {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [Self::R0, Self::R1, Self::R2, Self::R3];

    /// Returns the array index for this register (`0..=3`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 2-bit register field. Higher bits are ignored.
    #[must_use]
    pub const fn from_u2(bits: u16) -> Self {
        match bits & 0b11 {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            _ => Self::R3,
        }
    }

    /// The register following this one, used for `MLT`/`DVD` result pairs.
    #[must_use]
    pub const fn pair(self) -> Option<Self> {
        match self {
            Self::R0 => Some(Self::R1),
            Self::R2 => Some(Self::R3),
            Self::R1 | Self::R3 => None,
        }
    }
}

/// Index register identifier. Field value 0 means "no indexing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum IndexRegister {
    X1 = 1,
    X2 = 2,
    X3 = 3,
}

impl IndexRegister {
    /// Ordered list of all index registers.
    pub const ALL: [Self; INDEX_REGISTER_COUNT] = [Self::X1, Self::X2, Self::X3];

    /// Decodes a 2-bit `IX` field; 0 yields `None`.
    #[must_use]
    pub const fn from_u2(bits: u16) -> Option<Self> {
        match bits & 0b11 {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            3 => Some(Self::X3),
            _ => None,
        }
    }

    /// Returns the array index for this register (`0..=2`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

/// One condition-code bit, in `JCC` selector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionBit {
    /// Bit 0.
    Overflow,
    /// Bit 1.
    Underflow,
    /// Bit 2.
    DivZero,
    /// Bit 3.
    Equal,
}

impl ConditionBit {
    /// Maps a `JCC` register field to the bit it tests, LSB first.
    #[must_use]
    pub const fn from_selector(selector: GeneralRegister) -> Self {
        match selector {
            GeneralRegister::R0 => Self::Overflow,
            GeneralRegister::R1 => Self::Underflow,
            GeneralRegister::R2 => Self::DivZero,
            GeneralRegister::R3 => Self::Equal,
        }
    }

    /// Returns the `CC` mask for this bit.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::Overflow => CC_OVERFLOW,
            Self::Underflow => CC_UNDERFLOW,
            Self::DivZero => CC_DIVZERO,
            Self::Equal => CC_EQUAL,
        }
    }
}

/// Complete CPU register file.
///
/// Setters mask values to the declared register width so every stored value
/// fits its register.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    pc: u16,
    ir: u16,
    mar: u16,
    mbr: u16,
    mfr: u8,
    cc: u8,
    gpr: [u16; GENERAL_REGISTER_COUNT],
    ixr: [u16; INDEX_REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads `PC`.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes `PC`.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value & PC_MASK;
    }

    /// Reads `IR`.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        self.ir
    }

    /// Writes `IR`.
    pub const fn set_ir(&mut self, value: u16) {
        self.ir = value;
    }

    /// Reads `MAR`.
    #[must_use]
    pub const fn mar(&self) -> u16 {
        self.mar
    }

    /// Writes `MAR`.
    pub const fn set_mar(&mut self, value: u16) {
        self.mar = value & ADDRESS_MASK;
    }

    /// Reads `MBR`.
    #[must_use]
    pub const fn mbr(&self) -> u16 {
        self.mbr
    }

    /// Writes `MBR`.
    pub const fn set_mbr(&mut self, value: u16) {
        self.mbr = value;
    }

    /// Reads `MFR`.
    #[must_use]
    pub const fn mfr(&self) -> u8 {
        self.mfr
    }

    /// Writes `MFR`.
    pub const fn set_mfr(&mut self, value: u8) {
        self.mfr = value & NIBBLE_MASK;
    }

    /// Reads `CC`.
    #[must_use]
    pub const fn cc(&self) -> u8 {
        self.cc
    }

    /// Writes `CC`.
    pub const fn set_cc(&mut self, value: u8) {
        self.cc = value & NIBBLE_MASK;
    }

    /// Returns `true` when `bit` is set in `CC`.
    #[must_use]
    pub const fn condition(&self, bit: ConditionBit) -> bool {
        self.cc & bit.mask() != 0
    }

    /// Sets or clears one `CC` bit.
    pub const fn set_condition(&mut self, bit: ConditionBit, enabled: bool) {
        if enabled {
            self.cc |= bit.mask();
        } else {
            self.cc &= !bit.mask();
        }
    }

    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u16 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: u16) {
        self.gpr[reg.index()] = value;
    }

    /// Reads an index register.
    #[must_use]
    pub const fn ixr(&self, reg: IndexRegister) -> u16 {
        self.ixr[reg.index()]
    }

    /// Writes an index register.
    pub const fn set_ixr(&mut self, reg: IndexRegister, value: u16) {
        self.ixr[reg.index()] = value;
    }
}

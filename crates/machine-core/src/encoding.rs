/// Instruction opcodes (`OP` field, bits 15..10), values in octal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Hlt = 0o00,
    Ldr = 0o01,
    Str = 0o02,
    Lda = 0o03,
    Amr = 0o04,
    Smr = 0o05,
    Air = 0o06,
    Sir = 0o07,
    Jz = 0o10,
    Jne = 0o11,
    Jcc = 0o12,
    Jma = 0o13,
    Jsr = 0o14,
    Rfs = 0o15,
    Sob = 0o16,
    Jge = 0o17,
    Mlt = 0o20,
    Dvd = 0o21,
    Trr = 0o22,
    And = 0o23,
    Orr = 0o24,
    Not = 0o25,
    Trap = 0o30,
    Src = 0o31,
    Rrc = 0o32,
    Ldx = 0o41,
    Stx = 0o42,
    In = 0o61,
    Out = 0o62,
    Chk = 0o63,
}

/// Field layout family shared by a group of opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionFormat {
    /// All-zero word.
    Halt,
    /// `OP | R | IX | I | ADDR`.
    Memory,
    /// `OP | 00 | IX | I | ADDR`; `IX` names the index register operand.
    IndexMemory,
    /// `OP | R | 000 | IMM`.
    Immediate,
    /// `OP | Rx | Ry | 000000`.
    RegisterPair,
    /// `OP | Rx | 00 | 000000`.
    Register,
    /// `OP | R | AL | LR | 00 | COUNT`.
    Shift,
    /// `OP | R | 000 | DEV`.
    Io,
    /// `OP | 000000 | CODE`.
    Trap,
    /// `OP | 00000 | IMM`; loads `R0` and returns through `R3`.
    Return,
}

/// Single source-of-truth opcode table: value, mnemonic and format.
///
/// Any six-bit opcode not present here is illegal by definition.
pub const OPCODE_TABLE: &[(Opcode, &str, InstructionFormat)] = &[
    (Opcode::Hlt, "HLT", InstructionFormat::Halt),
    (Opcode::Ldr, "LDR", InstructionFormat::Memory),
    (Opcode::Str, "STR", InstructionFormat::Memory),
    (Opcode::Lda, "LDA", InstructionFormat::Memory),
    (Opcode::Amr, "AMR", InstructionFormat::Memory),
    (Opcode::Smr, "SMR", InstructionFormat::Memory),
    (Opcode::Air, "AIR", InstructionFormat::Immediate),
    (Opcode::Sir, "SIR", InstructionFormat::Immediate),
    (Opcode::Jz, "JZ", InstructionFormat::Memory),
    (Opcode::Jne, "JNE", InstructionFormat::Memory),
    (Opcode::Jcc, "JCC", InstructionFormat::Memory),
    (Opcode::Jma, "JMA", InstructionFormat::Memory),
    (Opcode::Jsr, "JSR", InstructionFormat::Memory),
    (Opcode::Rfs, "RFS", InstructionFormat::Return),
    (Opcode::Sob, "SOB", InstructionFormat::Memory),
    (Opcode::Jge, "JGE", InstructionFormat::Memory),
    (Opcode::Mlt, "MLT", InstructionFormat::RegisterPair),
    (Opcode::Dvd, "DVD", InstructionFormat::RegisterPair),
    (Opcode::Trr, "TRR", InstructionFormat::RegisterPair),
    (Opcode::And, "AND", InstructionFormat::RegisterPair),
    (Opcode::Orr, "ORR", InstructionFormat::RegisterPair),
    (Opcode::Not, "NOT", InstructionFormat::Register),
    (Opcode::Trap, "TRAP", InstructionFormat::Trap),
    (Opcode::Src, "SRC", InstructionFormat::Shift),
    (Opcode::Rrc, "RRC", InstructionFormat::Shift),
    (Opcode::Ldx, "LDX", InstructionFormat::IndexMemory),
    (Opcode::Stx, "STX", InstructionFormat::IndexMemory),
    (Opcode::In, "IN", InstructionFormat::Io),
    (Opcode::Out, "OUT", InstructionFormat::Io),
    (Opcode::Chk, "CHK", InstructionFormat::Io),
];

impl Opcode {
    /// Converts a six-bit opcode value into an assigned opcode.
    #[must_use]
    pub fn from_u6(op: u8) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .find_map(|(opcode, _, _)| (*opcode as u8 == op).then_some(*opcode))
    }

    /// Looks up a mnemonic, ignoring ASCII case.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        OPCODE_TABLE.iter().find_map(|(opcode, name, _)| {
            name.eq_ignore_ascii_case(mnemonic).then_some(*opcode)
        })
    }

    /// Returns the raw six-bit value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Canonical upper-case mnemonic.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(opcode, name, _)| (*opcode == self).then_some(*name))
            .unwrap_or("???")
    }

    /// Field layout used by this opcode.
    #[must_use]
    pub const fn format(self) -> InstructionFormat {
        match self {
            Self::Hlt => InstructionFormat::Halt,
            Self::Ldr
            | Self::Str
            | Self::Lda
            | Self::Amr
            | Self::Smr
            | Self::Jz
            | Self::Jne
            | Self::Jcc
            | Self::Jma
            | Self::Jsr
            | Self::Sob
            | Self::Jge => InstructionFormat::Memory,
            Self::Air | Self::Sir => InstructionFormat::Immediate,
            Self::Rfs => InstructionFormat::Return,
            Self::Mlt | Self::Dvd | Self::Trr | Self::And | Self::Orr => {
                InstructionFormat::RegisterPair
            }
            Self::Not => InstructionFormat::Register,
            Self::Trap => InstructionFormat::Trap,
            Self::Src | Self::Rrc => InstructionFormat::Shift,
            Self::Ldx | Self::Stx => InstructionFormat::IndexMemory,
            Self::In | Self::Out | Self::Chk => InstructionFormat::Io,
        }
    }
}

/// Bit position of the opcode field.
pub const OPCODE_SHIFT: u16 = 10;
/// Bit position of the `R`/`Rx` field.
pub const R_SHIFT: u16 = 8;
/// Bit position of the `IX`/`Ry` field.
pub const IX_SHIFT: u16 = 6;
/// Bit position of the indirect flag.
pub const I_SHIFT: u16 = 5;
/// Bit position of the shift `AL` flag.
pub const AL_SHIFT: u16 = 7;
/// Bit position of the shift `LR` flag.
pub const LR_SHIFT: u16 = 6;
/// Mask of the five-bit `ADDR`/`IMM`/`DEV` field.
pub const LOW5_MASK: u16 = 0x1F;
/// Mask of the four-bit `COUNT`/`CODE` field.
pub const LOW4_MASK: u16 = 0x0F;
/// Bits 9..4 of a `TRAP` word, which must be zero.
pub const TRAP_RESERVED_MASK: u16 = 0x03F0;

/// Extracts the six-bit opcode field from an instruction word.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn opcode_field(word: u16) -> u8 {
    ((word >> OPCODE_SHIFT) & 0x3F) as u8
}

/// Encodes `OP | R | IX | I | ADDR`. Fields are masked to their widths.
#[must_use]
pub const fn encode_memory(op: Opcode, r: u16, ix: u16, indirect: bool, address: u16) -> u16 {
    ((op as u16) << OPCODE_SHIFT)
        | ((r & 0b11) << R_SHIFT)
        | ((ix & 0b11) << IX_SHIFT)
        | ((indirect as u16) << I_SHIFT)
        | (address & LOW5_MASK)
}

/// Encodes `OP | R | 000 | low5` for immediate, I/O and return words.
#[must_use]
pub const fn encode_register_low5(op: Opcode, r: u16, low5: u16) -> u16 {
    ((op as u16) << OPCODE_SHIFT) | ((r & 0b11) << R_SHIFT) | (low5 & LOW5_MASK)
}

/// Encodes `OP | Rx | Ry | 000000`.
#[must_use]
pub const fn encode_register_pair(op: Opcode, rx: u16, ry: u16) -> u16 {
    ((op as u16) << OPCODE_SHIFT) | ((rx & 0b11) << R_SHIFT) | ((ry & 0b11) << IX_SHIFT)
}

/// Encodes `OP | R | AL | LR | 00 | COUNT`.
#[must_use]
pub const fn encode_shift(op: Opcode, r: u16, count: u16, left: bool, arithmetic: bool) -> u16 {
    ((op as u16) << OPCODE_SHIFT)
        | ((r & 0b11) << R_SHIFT)
        | ((arithmetic as u16) << AL_SHIFT)
        | ((left as u16) << LR_SHIFT)
        | (count & LOW4_MASK)
}

/// Encodes `TRAP code`.
#[must_use]
pub const fn encode_trap(code: u16) -> u16 {
    ((Opcode::Trap as u16) << OPCODE_SHIFT) | (code & LOW4_MASK)
}

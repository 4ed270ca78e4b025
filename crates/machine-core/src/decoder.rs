//! Instruction decoder.
//!
//! Splits a 16-bit instruction word into its per-format fields and rejects
//! encodings the execute unit has no meaning for. Decoding is pure; it never
//! touches registers or memory.

use std::fmt;

use crate::encoding::{
    encode_memory, encode_register_low5, encode_register_pair, encode_shift, encode_trap,
    opcode_field, InstructionFormat, Opcode, AL_SHIFT, IX_SHIFT, I_SHIFT, LOW4_MASK, LOW5_MASK,
    LR_SHIFT, R_SHIFT, TRAP_RESERVED_MASK,
};
use crate::state::{GeneralRegister, IndexRegister};
use crate::word::sign_extend;
use crate::MachineFault;

/// Effective-address operand shared by memory-class instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressOperand {
    /// Index register added to the address field, if any.
    pub index: Option<IndexRegister>,
    /// One level of indirection through memory.
    pub indirect: bool,
    /// Five-bit address field.
    pub address: u8,
}

impl AddressOperand {
    const fn from_word(word: u16) -> Self {
        Self {
            index: IndexRegister::from_u2(word >> IX_SHIFT),
            indirect: (word >> I_SHIFT) & 1 == 1,
            address: (word & LOW5_MASK) as u8,
        }
    }

    const fn index_bits(self) -> u16 {
        match self.index {
            Some(reg) => reg as u16,
            None => 0,
        }
    }
}

/// Decoded instruction with all extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInstruction {
    /// `HLT`.
    Halt,
    /// Memory-class: loads, stores, memory arithmetic and conditional jumps.
    Memory {
        /// Opcode with [`InstructionFormat::Memory`].
        op: Opcode,
        /// Register operand (condition selector for `JCC`).
        r: GeneralRegister,
        /// Effective-address operand.
        operand: AddressOperand,
    },
    /// `LDX`/`STX`. The `IX` field names the register being transferred, so
    /// the effective address is never indexed.
    IndexMemory {
        /// `LDX` or `STX`.
        op: Opcode,
        /// Index register transferred.
        x: IndexRegister,
        /// Effective-address operand with `index` always `None`.
        operand: AddressOperand,
    },
    /// `AIR`/`SIR` with a five-bit immediate sign-extended at execute.
    Immediate {
        /// `AIR` or `SIR`.
        op: Opcode,
        /// Destination register.
        r: GeneralRegister,
        /// Raw five-bit immediate.
        immediate: u8,
    },
    /// `MLT`, `DVD`, `TRR`, `AND`, `ORR`.
    RegisterPair {
        /// Opcode with [`InstructionFormat::RegisterPair`].
        op: Opcode,
        /// First register (destination).
        rx: GeneralRegister,
        /// Second register.
        ry: GeneralRegister,
    },
    /// `NOT Rx`.
    Not {
        /// Register complemented in place.
        rx: GeneralRegister,
    },
    /// `SRC`/`RRC`.
    Shift {
        /// `SRC` or `RRC`.
        op: Opcode,
        /// Register shifted.
        r: GeneralRegister,
        /// Shift distance `0..=15`.
        count: u8,
        /// Direction: `true` shifts left.
        left: bool,
        /// Arithmetic (`true`) or logical shift; ignored by `RRC`.
        arithmetic: bool,
    },
    /// `IN`, `OUT`, `CHK`.
    Io {
        /// Opcode with [`InstructionFormat::Io`].
        op: Opcode,
        /// Register operand.
        r: GeneralRegister,
        /// Device identifier `0..=31`.
        device: u8,
    },
    /// `TRAP code`.
    Trap {
        /// Trap code `0..=15`.
        code: u8,
    },
    /// `RFS immediate`.
    Return {
        /// Value loaded into `R0`.
        immediate: u8,
    },
}

impl DecodedInstruction {
    /// Opcode of this instruction.
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::Halt => Opcode::Hlt,
            Self::Memory { op, .. }
            | Self::IndexMemory { op, .. }
            | Self::Immediate { op, .. }
            | Self::RegisterPair { op, .. }
            | Self::Shift { op, .. }
            | Self::Io { op, .. } => op,
            Self::Not { .. } => Opcode::Not,
            Self::Trap { .. } => Opcode::Trap,
            Self::Return { .. } => Opcode::Rfs,
        }
    }

    /// Sign-extended immediate of `AIR`/`SIR`.
    #[must_use]
    pub const fn signed_immediate(self) -> Option<i32> {
        match self {
            Self::Immediate { immediate, .. } => Some(sign_extend(immediate as u16, 5)),
            _ => None,
        }
    }

    /// Re-encodes this decoded instruction to a 16-bit word.
    ///
    /// Reserved zero bits are emitted as zero, so `decode(w).encode()` equals
    /// `w` for every canonically encoded word.
    #[must_use]
    pub const fn encode(self) -> u16 {
        match self {
            Self::Halt => 0,
            Self::Memory { op, r, operand } => encode_memory(
                op,
                r as u16,
                operand.index_bits(),
                operand.indirect,
                operand.address as u16,
            ),
            Self::IndexMemory { op, x, operand } => {
                encode_memory(op, 0, x as u16, operand.indirect, operand.address as u16)
            }
            Self::Immediate { op, r, immediate } => {
                encode_register_low5(op, r as u16, immediate as u16)
            }
            Self::RegisterPair { op, rx, ry } => encode_register_pair(op, rx as u16, ry as u16),
            Self::Not { rx } => encode_register_pair(Opcode::Not, rx as u16, 0),
            Self::Shift {
                op,
                r,
                count,
                left,
                arithmetic,
            } => encode_shift(op, r as u16, count as u16, left, arithmetic),
            Self::Io { op, r, device } => encode_register_low5(op, r as u16, device as u16),
            Self::Trap { code } => encode_trap(code as u16),
            Self::Return { immediate } => encode_register_low5(Opcode::Rfs, 0, immediate as u16),
        }
    }
}

fn write_address(f: &mut fmt::Formatter<'_>, operand: AddressOperand) -> fmt::Result {
    write!(f, "{}", operand.address)?;
    if operand.indirect {
        write!(f, ",1")?;
    }
    Ok(())
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode().mnemonic();
        match *self {
            Self::Halt => write!(f, "{mnemonic}"),
            Self::Memory { r, operand, .. } => {
                write!(f, "{mnemonic} {},{},", r as u8, operand.index_bits())?;
                write_address(f, operand)
            }
            Self::IndexMemory { x, operand, .. } => {
                write!(f, "{mnemonic} {},", x as u8)?;
                write_address(f, operand)
            }
            Self::Immediate { r, .. } => {
                let value = self.signed_immediate().unwrap_or_default();
                write!(f, "{mnemonic} {},{value}", r as u8)
            }
            Self::RegisterPair { rx, ry, .. } => write!(f, "{mnemonic} {},{}", rx as u8, ry as u8),
            Self::Not { rx } => write!(f, "{mnemonic} {}", rx as u8),
            Self::Shift {
                r,
                count,
                left,
                arithmetic,
                ..
            } => write!(
                f,
                "{mnemonic} {},{count},{},{}",
                r as u8,
                u8::from(left),
                u8::from(arithmetic)
            ),
            Self::Io { r, device, .. } => write!(f, "{mnemonic} {},{device}", r as u8),
            Self::Trap { code } => write!(f, "{mnemonic} {code}"),
            Self::Return { immediate } => write!(f, "{mnemonic} {immediate}"),
        }
    }
}

/// Stateless instruction decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Decodes an instruction word.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::IllegalOperationCode`] for unassigned opcodes,
    /// `LDX`/`STX` naming index register 0, and `MLT`/`DVD` whose first
    /// register is not `R0` or `R2`. Returns [`MachineFault::IllegalTrapCode`]
    /// for a `TRAP` word with non-zero reserved bits.
    pub fn decode(word: u16) -> Result<DecodedInstruction, MachineFault> {
        let op = Opcode::from_u6(opcode_field(word)).ok_or(MachineFault::IllegalOperationCode)?;
        let r = GeneralRegister::from_u2(word >> R_SHIFT);
        let low5 = (word & LOW5_MASK) as u8;

        let decoded = match op.format() {
            InstructionFormat::Halt => DecodedInstruction::Halt,
            InstructionFormat::Memory => DecodedInstruction::Memory {
                op,
                r,
                operand: AddressOperand::from_word(word),
            },
            InstructionFormat::IndexMemory => {
                let x = IndexRegister::from_u2(word >> IX_SHIFT)
                    .ok_or(MachineFault::IllegalOperationCode)?;
                DecodedInstruction::IndexMemory {
                    op,
                    x,
                    operand: AddressOperand {
                        index: None,
                        ..AddressOperand::from_word(word)
                    },
                }
            }
            InstructionFormat::Immediate => DecodedInstruction::Immediate {
                op,
                r,
                immediate: low5,
            },
            InstructionFormat::RegisterPair => {
                if matches!(op, Opcode::Mlt | Opcode::Dvd) && r.pair().is_none() {
                    return Err(MachineFault::IllegalOperationCode);
                }
                DecodedInstruction::RegisterPair {
                    op,
                    rx: r,
                    ry: GeneralRegister::from_u2(word >> IX_SHIFT),
                }
            }
            InstructionFormat::Register => DecodedInstruction::Not { rx: r },
            InstructionFormat::Shift => DecodedInstruction::Shift {
                op,
                r,
                count: (word & LOW4_MASK) as u8,
                left: (word >> LR_SHIFT) & 1 == 1,
                arithmetic: (word >> AL_SHIFT) & 1 == 1,
            },
            InstructionFormat::Io => DecodedInstruction::Io {
                op,
                r,
                device: low5,
            },
            InstructionFormat::Trap => {
                if word & TRAP_RESERVED_MASK != 0 {
                    return Err(MachineFault::IllegalTrapCode);
                }
                DecodedInstruction::Trap {
                    code: (word & LOW4_MASK) as u8,
                }
            }
            InstructionFormat::Return => DecodedInstruction::Return { immediate: low5 },
        };
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AddressOperand, DecodedInstruction, Decoder};
    use crate::encoding::Opcode;
    use crate::state::{GeneralRegister, IndexRegister};
    use crate::MachineFault;

    #[test]
    fn all_zero_word_is_halt() {
        assert_eq!(Decoder::decode(0), Ok(DecodedInstruction::Halt));
    }

    #[test]
    fn memory_class_fields_are_extracted() {
        let decoded = Decoder::decode(0o002145).expect("LDR decodes");
        assert_eq!(
            decoded,
            DecodedInstruction::Memory {
                op: Opcode::Ldr,
                r: GeneralRegister::R0,
                operand: AddressOperand {
                    index: Some(IndexRegister::X1),
                    indirect: true,
                    address: 5,
                },
            }
        );
        assert_eq!(decoded.to_string(), "LDR 0,1,5,1");
        assert_eq!(decoded.encode(), 0o002145);
    }

    #[test]
    fn index_memory_names_destination_register_and_never_indexes() {
        // LDX 2,7
        let word = (u16::from(Opcode::Ldx.as_u8()) << 10) | (2 << 6) | 7;
        let decoded = Decoder::decode(word).expect("LDX decodes");
        let DecodedInstruction::IndexMemory { x, operand, .. } = decoded else {
            panic!("expected index-memory form, got {decoded:?}");
        };
        assert_eq!(x, IndexRegister::X2);
        assert_eq!(operand.index, None);
        assert_eq!(decoded.to_string(), "LDX 2,7");
        assert_eq!(decoded.encode(), word);
    }

    #[test]
    fn index_memory_with_x0_is_illegal() {
        let word = u16::from(Opcode::Stx.as_u8()) << 10;
        assert_eq!(
            Decoder::decode(word),
            Err(MachineFault::IllegalOperationCode)
        );
    }

    #[rstest]
    #[case(Opcode::Mlt, 1)]
    #[case(Opcode::Mlt, 3)]
    #[case(Opcode::Dvd, 1)]
    #[case(Opcode::Dvd, 3)]
    fn multiply_and_divide_require_even_first_register(#[case] op: Opcode, #[case] rx: u16) {
        let word = (u16::from(op.as_u8()) << 10) | (rx << 8);
        assert_eq!(
            Decoder::decode(word),
            Err(MachineFault::IllegalOperationCode)
        );
    }

    #[test]
    fn trap_with_reserved_bits_is_illegal_trap_code() {
        let base = u16::from(Opcode::Trap.as_u8()) << 10;
        assert_eq!(
            Decoder::decode(base | 0o17),
            Ok(DecodedInstruction::Trap { code: 15 })
        );
        assert_eq!(
            Decoder::decode(base | 0o20),
            Err(MachineFault::IllegalTrapCode)
        );
    }

    #[test]
    fn unassigned_opcode_is_illegal() {
        assert_eq!(
            Decoder::decode(0o77 << 10),
            Err(MachineFault::IllegalOperationCode)
        );
    }

    #[rstest]
    #[case(0o014437, "AIR 1,-1")]
    #[case(0o014420, "AIR 1,-16")]
    #[case(0o016417, "SIR 1,15")]
    #[case(0o043300, "DVD 2,3")]
    #[case(0o052400, "NOT 1")]
    #[case(0o063504, "SRC 3,4,1,0")]
    #[case(0o064703, "RRC 1,3,1,1")]
    #[case(0o144401, "OUT 1,1")]
    #[case(0o060007, "TRAP 7")]
    #[case(0o032005, "RFS 5")]
    #[case(0o006410, "LDA 1,0,8")]
    fn disassembly_uses_assembler_syntax(#[case] word: u16, #[case] text: &str) {
        let decoded = Decoder::decode(word).expect("legal word");
        assert_eq!(decoded.to_string(), text);
        assert_eq!(decoded.encode(), word);
    }

    #[test]
    fn immediate_is_sign_extended_from_five_bits() {
        let decoded = Decoder::decode(0o014437).expect("AIR decodes");
        assert_eq!(decoded.signed_immediate(), Some(-1));
        assert_eq!(DecodedInstruction::Halt.signed_immediate(), None);
    }
}

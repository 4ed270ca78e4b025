//! Statement encoding (pass 2).
//!
//! Resolves operands against the symbol table, range-checks each against the
//! field it lands in, and packs the word with the machine's own field
//! encoders.

use machine_core::encoding::{
    encode_memory, encode_register_low5, encode_register_pair, encode_shift, encode_trap,
};
use machine_core::word::truncate;
use machine_core::{InstructionFormat, Opcode};

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::Mnemonic;
use crate::parser::{Operand, Statement};
use crate::symbols::SymbolTable;

/// Accepted range of one instruction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    /// Field name used in diagnostics.
    pub name: &'static str,
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
}

impl FieldRange {
    const fn new(name: &'static str, min: i64, max: i64) -> Self {
        Self { name, min, max }
    }
}

/// General register selector.
pub const R: FieldRange = FieldRange::new("R", 0, 3);
/// Index register selector; 0 means "no indexing".
pub const IX: FieldRange = FieldRange::new("IX", 0, 3);
/// Index register operand of `LDX`/`STX`; there is no X0.
pub const IX_OPERAND: FieldRange = FieldRange::new("IX", 1, 3);
/// Indirect flag.
pub const I: FieldRange = FieldRange::new("I", 0, 1);
/// Five-bit address field.
pub const ADDR: FieldRange = FieldRange::new("ADDR", 0, 31);
/// `AIR`/`SIR` immediate, stored as the low five bits.
pub const IMMED: FieldRange = FieldRange::new("IMMED", -16, 31);
/// `RFS` return value.
pub const RETURN_VALUE: FieldRange = FieldRange::new("IMMED", 0, 31);
/// Shift/rotate count.
pub const COUNT: FieldRange = FieldRange::new("COUNT", 0, 15);
/// Shift direction: 1 left, 0 right.
pub const LR: FieldRange = FieldRange::new("LR", 0, 1);
/// Shift kind: 1 arithmetic, 0 logical.
pub const AL: FieldRange = FieldRange::new("AL", 0, 1);
/// Device number.
pub const DEVID: FieldRange = FieldRange::new("DEVID", 0, 31);
/// Trap code.
pub const TRAP_CODE: FieldRange = FieldRange::new("TRAP", 0, 15);
/// `DATA` value: any signed or unsigned 16-bit quantity.
pub const DATA: FieldRange = FieldRange::new("DATA", -32768, 65535);

struct Operands<'a> {
    mnemonic: Mnemonic,
    values: &'a [Operand],
    symbols: &'a SymbolTable,
    line: usize,
}

impl Operands<'_> {
    fn error(&self, kind: AssembleErrorKind) -> AssembleError {
        AssembleError::at(self.line, kind)
    }

    fn expect_count(&self, min: usize, max: usize) -> Result<usize, AssembleError> {
        let count = self.values.len();
        if count < min {
            return Err(self.error(AssembleErrorKind::MissingOperand {
                mnemonic: self.mnemonic.name().to_string(),
            }));
        }
        if count > max {
            return Err(self.error(AssembleErrorKind::TooManyOperands {
                mnemonic: self.mnemonic.name().to_string(),
                max,
            }));
        }
        Ok(count)
    }

    fn resolve(&self, index: usize) -> Result<i64, AssembleError> {
        match self.values.get(index) {
            Some(Operand::Literal(value)) => Ok(*value),
            Some(Operand::Symbol(name)) => self
                .symbols
                .get(name)
                .map(|symbol| i64::from(symbol.address))
                .ok_or_else(|| {
                    self.error(AssembleErrorKind::UndefinedSymbol { name: name.clone() })
                }),
            None => Err(self.error(AssembleErrorKind::MissingOperand {
                mnemonic: self.mnemonic.name().to_string(),
            })),
        }
    }

    /// Resolves operand `index` and checks it against `range`.
    fn field(&self, index: usize, range: FieldRange) -> Result<u16, AssembleError> {
        let value = self.resolve(index)?;
        if value < range.min || value > range.max {
            return Err(self.error(AssembleErrorKind::OperandOutOfRange {
                field: range.name,
                value,
                min: range.min,
                max: range.max,
            }));
        }
        Ok(truncate(value))
    }

    fn flag(&self, index: usize, range: FieldRange) -> Result<bool, AssembleError> {
        self.field(index, range).map(|bit| bit == 1)
    }
}

/// Encodes one statement.
///
/// Returns `Ok(None)` for `LOC`, which emits nothing.
///
/// # Errors
///
/// Returns `MissingOperand`, `TooManyOperands`, `UndefinedSymbol`,
/// `OperandOutOfRange` or `RegisterNotAllowed`, attached to `line`.
pub fn encode_statement(
    statement: &Statement,
    symbols: &SymbolTable,
    line: usize,
) -> Result<Option<u16>, AssembleError> {
    let operands = Operands {
        mnemonic: statement.mnemonic,
        values: &statement.operands,
        symbols,
        line,
    };
    match statement.mnemonic {
        Mnemonic::Loc => Ok(None),
        Mnemonic::Data => {
            operands.expect_count(1, 1)?;
            operands.field(0, DATA).map(Some)
        }
        Mnemonic::Instruction(op) => encode_instruction(op, &operands).map(Some),
    }
}

fn encode_instruction(op: Opcode, operands: &Operands<'_>) -> Result<u16, AssembleError> {
    match op.format() {
        InstructionFormat::Halt => {
            operands.expect_count(0, 0)?;
            Ok(0)
        }
        InstructionFormat::Memory => encode_memory_form(op, operands),
        InstructionFormat::IndexMemory => {
            let count = operands.expect_count(2, 3)?;
            let ix = operands.field(0, IX_OPERAND)?;
            let address = operands.field(1, ADDR)?;
            let indirect = count == 3 && operands.flag(2, I)?;
            Ok(encode_memory(op, 0, ix, indirect, address))
        }
        InstructionFormat::Immediate => {
            operands.expect_count(2, 2)?;
            let r = operands.field(0, R)?;
            let immediate = operands.field(1, IMMED)?;
            Ok(encode_register_low5(op, r, immediate))
        }
        InstructionFormat::RegisterPair => {
            operands.expect_count(2, 2)?;
            let rx = operands.field(0, R)?;
            let ry = operands.field(1, R)?;
            if matches!(op, Opcode::Mlt | Opcode::Dvd) && rx % 2 != 0 {
                return Err(operands.error(AssembleErrorKind::RegisterNotAllowed {
                    mnemonic: op.mnemonic().to_string(),
                    register: i64::from(rx),
                }));
            }
            Ok(encode_register_pair(op, rx, ry))
        }
        InstructionFormat::Register => {
            operands.expect_count(1, 1)?;
            let rx = operands.field(0, R)?;
            Ok(encode_register_pair(op, rx, 0))
        }
        InstructionFormat::Shift => {
            operands.expect_count(4, 4)?;
            let r = operands.field(0, R)?;
            let count = operands.field(1, COUNT)?;
            let left = operands.flag(2, LR)?;
            let arithmetic = operands.flag(3, AL)?;
            Ok(encode_shift(op, r, count, left, arithmetic))
        }
        InstructionFormat::Io => {
            operands.expect_count(2, 2)?;
            let r = operands.field(0, R)?;
            let device = operands.field(1, DEVID)?;
            Ok(encode_register_low5(op, r, device))
        }
        InstructionFormat::Trap => {
            operands.expect_count(1, 1)?;
            let code = operands.field(0, TRAP_CODE)?;
            Ok(encode_trap(code))
        }
        InstructionFormat::Return => {
            let count = operands.expect_count(0, 1)?;
            let value = if count == 1 {
                operands.field(0, RETURN_VALUE)?
            } else {
                0
            };
            Ok(encode_register_low5(op, 0, value))
        }
    }
}

/// `R,IX,ADDR[,I]`, `R,ADDR` or `ADDR`.
fn encode_memory_form(op: Opcode, operands: &Operands<'_>) -> Result<u16, AssembleError> {
    let count = operands.expect_count(1, 4)?;
    let (r, ix, address, indirect) = match count {
        1 => (0, 0, operands.field(0, ADDR)?, false),
        2 => (operands.field(0, R)?, 0, operands.field(1, ADDR)?, false),
        _ => {
            let r = operands.field(0, R)?;
            let ix = operands.field(1, IX)?;
            let address = operands.field(2, ADDR)?;
            let indirect = count == 4 && operands.flag(3, I)?;
            (r, ix, address, indirect)
        }
    };
    Ok(encode_memory(op, r, ix, indirect, address))
}

#[cfg(test)]
mod tests {
    use machine_core::Decoder;
    use rstest::rstest;

    use super::*;
    use crate::parser::parse_line;
    use crate::symbols::Symbol;

    fn encode_text(text: &str, symbols: &SymbolTable) -> Result<Option<u16>, AssembleError> {
        let parsed = parse_line(text, 1)?;
        let statement = parsed.statement.expect("statement");
        encode_statement(&statement, symbols, 1)
    }

    fn encode(text: &str) -> u16 {
        encode_text(text, &SymbolTable::new())
            .expect("encodes")
            .expect("emits a word")
    }

    fn encode_err(text: &str) -> AssembleErrorKind {
        encode_text(text, &SymbolTable::new())
            .expect_err("encoding fails")
            .kind
    }

    #[rstest]
    #[case("HLT", 0o000000)]
    #[case("LDA 1,0,8", 0o006410)]
    #[case("LDR 0,1,5,1", 0o002145)]
    #[case("LDR 3,17", 0o003421)]
    #[case("JMA 30", 0o026036)]
    #[case("LDX 2,9", 0o102211)]
    #[case("STX 3,4,1", 0o104344)]
    #[case("AIR 1,-1", 0o014437)]
    #[case("AIR 2,16", 0o015020)]
    #[case("SIR 1,15", 0o016417)]
    #[case("DVD 2,3", 0o043300)]
    #[case("NOT 1", 0o052400)]
    #[case("SRC 3,4,1,0", 0o063504)]
    #[case("RRC 1,3,1,1", 0o064703)]
    #[case("OUT 1,1", 0o144401)]
    #[case("TRAP 7", 0o060007)]
    #[case("RFS 5", 0o032005)]
    #[case("RFS", 0o032000)]
    #[case("DATA -1", 0o177777)]
    #[case("DATA 65535", 0o177777)]
    #[case("DATA 42", 0o000052)]
    fn encodes_every_operand_form(#[case] text: &str, #[case] want: u16) {
        assert_eq!(encode(text), want, "{text}");
    }

    #[rstest]
    #[case("LDR 0,1,5,1")]
    #[case("AIR 1,-16")]
    #[case("SRC 3,4,1,0")]
    #[case("RRC 1,3,1,1")]
    #[case("TRAP 7")]
    #[case("RFS 5")]
    #[case("MLT 0,3")]
    #[case("IN 0,0")]
    #[case("CHK 2,2")]
    fn disassembly_reassembles_to_the_same_text(#[case] text: &str) {
        let word = encode(text);
        let decoded = Decoder::decode(word).expect("decodes");
        assert_eq!(decoded.to_string(), text);
    }

    #[test]
    fn loc_emits_nothing() {
        assert_eq!(encode_text("LOC 100", &SymbolTable::new()), Ok(None));
    }

    #[test]
    fn symbols_resolve_to_their_address() {
        let mut symbols = SymbolTable::new();
        symbols.insert(
            "End".to_string(),
            Symbol {
                address: 8,
                defined_at: 4,
            },
        );
        assert_eq!(encode_text("LDA 1,0,End", &symbols), Ok(Some(0o006410)));
        assert_eq!(encode_text("DATA End", &symbols), Ok(Some(8)));
    }

    #[test]
    fn undefined_symbol_fails() {
        assert_eq!(
            encode_err("JZ 0,0,Nowhere"),
            AssembleErrorKind::UndefinedSymbol {
                name: "Nowhere".to_string()
            }
        );
    }

    #[test]
    fn label_beyond_address_field_is_out_of_range() {
        let mut symbols = SymbolTable::new();
        symbols.insert(
            "Far".to_string(),
            Symbol {
                address: 100,
                defined_at: 1,
            },
        );
        let error = encode_text("JMA Far", &symbols).expect_err("address too large");
        assert_eq!(
            error.kind,
            AssembleErrorKind::OperandOutOfRange {
                field: "ADDR",
                value: 100,
                min: 0,
                max: 31,
            }
        );
    }

    #[rstest]
    #[case("LDR 4,0,1", "R")]
    #[case("LDR 0,0,32", "ADDR")]
    #[case("LDR 0,0,1,2", "I")]
    #[case("AIR 0,-17", "IMMED")]
    #[case("AIR 0,32", "IMMED")]
    #[case("SRC 0,16,1,0", "COUNT")]
    #[case("SRC 0,1,2,0", "LR")]
    #[case("OUT 1,32", "DEVID")]
    #[case("TRAP 16", "TRAP")]
    #[case("DATA 65536", "DATA")]
    #[case("DATA -32769", "DATA")]
    #[case("LDX 0,5", "IX")]
    fn out_of_range_operands_name_their_field(#[case] text: &str, #[case] field: &str) {
        match encode_err(text) {
            AssembleErrorKind::OperandOutOfRange { field: got, .. } => assert_eq!(got, field),
            other => panic!("{text}: unexpected {other:?}"),
        }
    }

    #[rstest]
    #[case("LDR")]
    #[case("AIR 1")]
    #[case("SRC 1,2,1")]
    #[case("LDX 1")]
    #[case("TRAP")]
    #[case("DATA")]
    fn missing_operands(#[case] text: &str) {
        assert!(matches!(
            encode_err(text),
            AssembleErrorKind::MissingOperand { .. }
        ));
    }

    #[rstest]
    #[case("HLT 1", 0)]
    #[case("LDR 0,0,1,0,1", 4)]
    #[case("NOT 1,2", 1)]
    #[case("RFS 1,2", 1)]
    #[case("DATA 1,2", 1)]
    fn too_many_operands(#[case] text: &str, #[case] max: usize) {
        match encode_err(text) {
            AssembleErrorKind::TooManyOperands { max: got, .. } => assert_eq!(got, max),
            other => panic!("{text}: unexpected {other:?}"),
        }
    }

    #[test]
    fn multiply_requires_even_register() {
        assert_eq!(
            encode_err("MLT 1,2"),
            AssembleErrorKind::RegisterNotAllowed {
                mnemonic: "MLT".to_string(),
                register: 1,
            }
        );
    }
}

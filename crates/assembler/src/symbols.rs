//! Symbol table and pass-1 address assignment.
//!
//! Walks the parsed lines, applies `LOC`, assigns each emitting line its
//! location and records every label definition.

use std::collections::HashMap;

use tracing::{event, Level};

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::Mnemonic;
use crate::parser::{parse_line, Operand, ParsedLine, Statement};
use crate::source::SourceLine;

/// Largest value `LOC` accepts.
pub const MAX_LOCATION: i64 = u16::MAX as i64;

/// A label with its assigned address and definition location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Location counter value at the defining line.
    pub address: u32,
    /// Source line number where the label was defined.
    pub defined_at: usize,
}

/// Symbol table mapping label names to their definitions.
pub type SymbolTable = HashMap<String, Symbol>;

/// A line with its assigned address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedLine {
    /// Location counter when the line was reached (before any `LOC` on it).
    pub address: u32,
    /// The parsed line content.
    pub parsed: ParsedLine,
    /// The original source line.
    pub source: SourceLine,
}

/// Result of pass-1 address assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// All lines with their assigned addresses.
    pub lines: Vec<AddressedLine>,
    /// Symbol table of label definitions.
    pub symbols: SymbolTable,
    /// Final location counter.
    pub end_address: u32,
}

/// Parses every line and performs pass-1 address assignment.
///
/// # Errors
///
/// Returns the first parse error, `DuplicateLabel`, `LocWithoutOperand`,
/// or a malformed `LOC` operand, in source order.
pub fn assign_addresses(source: &[SourceLine]) -> Result<Assignment, AssembleError> {
    let mut symbols = SymbolTable::new();
    let mut addressed = Vec::with_capacity(source.len());
    let mut location: u32 = 0;

    for line in source {
        let line_number = line.original_line;
        let parsed = parse_line(&line.text, line_number)?;

        if let Some(name) = &parsed.label {
            if let Some(existing) = symbols.get(name) {
                return Err(AssembleError::at(
                    line_number,
                    AssembleErrorKind::DuplicateLabel {
                        name: name.clone(),
                        first_definition: existing.defined_at,
                    },
                ));
            }
            symbols.insert(
                name.clone(),
                Symbol {
                    address: location,
                    defined_at: line_number,
                },
            );
        }

        let line_address = location;
        match &parsed.statement {
            Some(statement) if statement.mnemonic == Mnemonic::Loc => {
                location = loc_target(statement, line_number)?;
            }
            Some(_) => location += 1,
            None => {}
        }

        addressed.push(AddressedLine {
            address: line_address,
            parsed,
            source: line.clone(),
        });
    }

    event!(
        Level::DEBUG,
        symbols = symbols.len(),
        end_address = location,
        "pass 1 complete"
    );
    Ok(Assignment {
        lines: addressed,
        symbols,
        end_address: location,
    })
}

fn loc_target(statement: &Statement, line_number: usize) -> Result<u32, AssembleError> {
    let value = match statement.operands.as_slice() {
        [] => {
            return Err(AssembleError::at(
                line_number,
                AssembleErrorKind::LocWithoutOperand,
            ))
        }
        [Operand::Literal(value)] => *value,
        [Operand::Symbol(name)] => {
            return Err(AssembleError::at(
                line_number,
                AssembleErrorKind::BadInteger { text: name.clone() },
            ))
        }
        _ => {
            return Err(AssembleError::at(
                line_number,
                AssembleErrorKind::TooManyOperands {
                    mnemonic: Mnemonic::Loc.name().to_string(),
                    max: 1,
                },
            ))
        }
    };
    u32::try_from(value)
        .ok()
        .filter(|_| value <= MAX_LOCATION)
        .ok_or_else(|| {
            AssembleError::at(
                line_number,
                AssembleErrorKind::OperandOutOfRange {
                    field: "LOC",
                    value,
                    min: 0,
                    max: MAX_LOCATION,
                },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::split_source;

    fn assign(text: &str) -> Result<Assignment, AssembleError> {
        assign_addresses(&split_source(text))
    }

    #[test]
    fn loc_sets_counter_and_labels_follow() {
        let assignment = assign("LOC 6\nStart: LDA 1,0,End\nDATA 0\nEnd: HLT\n").expect("assigns");
        assert_eq!(assignment.symbols["Start"].address, 6);
        assert_eq!(assignment.symbols["End"].address, 8);
        assert_eq!(assignment.symbols["End"].defined_at, 4);
        assert_eq!(assignment.end_address, 9);
        let addresses: Vec<u32> = assignment.lines.iter().map(|line| line.address).collect();
        assert_eq!(addresses, vec![0, 6, 7, 8]);
    }

    #[test]
    fn label_only_line_does_not_advance() {
        let assignment = assign("Here:\nThere: HLT\n").expect("assigns");
        assert_eq!(assignment.symbols["Here"].address, 0);
        assert_eq!(assignment.symbols["There"].address, 0);
        assert_eq!(assignment.end_address, 1);
    }

    #[test]
    fn comments_and_blanks_do_not_advance() {
        let assignment = assign("; header\n\nHLT ; stop\n").expect("assigns");
        assert_eq!(assignment.end_address, 1);
        assert_eq!(assignment.lines.len(), 3);
    }

    #[test]
    fn loc_may_repeat_and_move_backwards() {
        let assignment = assign("LOC 20\nA: DATA 1\nLOC 10\nB: DATA 2\n").expect("assigns");
        assert_eq!(assignment.symbols["A"].address, 20);
        assert_eq!(assignment.symbols["B"].address, 10);
    }

    #[test]
    fn duplicate_label_reports_both_lines() {
        let error = assign("X: HLT\nY: HLT\nX: HLT\n").expect_err("duplicate");
        assert_eq!(error.line, Some(3));
        assert_eq!(
            error.kind,
            AssembleErrorKind::DuplicateLabel {
                name: "X".to_string(),
                first_definition: 1,
            }
        );
    }

    #[test]
    fn loc_without_operand_fails() {
        let error = assign("HLT\nLOC\n").expect_err("missing LOC value");
        assert_eq!(error.line, Some(2));
        assert_eq!(error.kind, AssembleErrorKind::LocWithoutOperand);
    }

    #[test]
    fn negative_loc_is_out_of_range() {
        let error = assign("LOC -1\n").expect_err("negative LOC");
        assert!(matches!(
            error.kind,
            AssembleErrorKind::OperandOutOfRange { field: "LOC", .. }
        ));
    }

    #[test]
    fn symbolic_loc_is_rejected() {
        let error = assign("LOC Start\n").expect_err("LOC takes a number");
        assert_eq!(
            error.kind,
            AssembleErrorKind::BadInteger {
                text: "Start".to_string()
            }
        );
    }
}

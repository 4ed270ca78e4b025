//! Line parser for labels, mnemonics and operand lists.
//!
//! Converts raw source lines into [`ParsedLine`] items ready for address
//! assignment and encoding. Operand values are not range-checked here; the
//! encoder knows which field each operand lands in.

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::{resolve_mnemonic, Mnemonic};

/// A single operand as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Decimal integer literal, possibly negative.
    Literal(i64),
    /// Reference to a label, resolved in pass 2.
    Symbol(String),
}

/// Mnemonic plus operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Resolved mnemonic.
    pub mnemonic: Mnemonic,
    /// Operands in source order.
    pub operands: Vec<Operand>,
}

/// A parsed source line. Both parts are optional: a blank or comment line
/// has neither, a label-only line has no statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    /// Label defined by this line.
    pub label: Option<String>,
    /// Instruction or directive on this line.
    pub statement: Option<Statement>,
}

impl ParsedLine {
    /// Whether the line emits a word.
    #[must_use]
    pub fn emits_word(&self) -> bool {
        self.statement
            .as_ref()
            .is_some_and(|statement| statement.mnemonic.emits_word())
    }
}

/// Parses one source line.
///
/// # Errors
///
/// Returns `UnknownMnemonic`, `MissingOperand` (an empty operand between
/// commas) or `BadInteger`, attached to `line_number`.
pub fn parse_line(text: &str, line_number: usize) -> Result<ParsedLine, AssembleError> {
    let code = strip_comment(text).trim();
    if code.is_empty() {
        return Ok(ParsedLine::default());
    }

    let (label, rest) = match split_label(code) {
        Some((label, rest)) => (Some(label), rest.trim()),
        None => (None, code),
    };
    if rest.is_empty() {
        return Ok(ParsedLine {
            label,
            statement: None,
        });
    }

    let (name, operand_text) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let mnemonic = resolve_mnemonic(name).ok_or_else(|| {
        AssembleError::at(
            line_number,
            AssembleErrorKind::UnknownMnemonic {
                mnemonic: name.to_string(),
            },
        )
    })?;
    let operands = parse_operands(operand_text, mnemonic, line_number)?;

    Ok(ParsedLine {
        label,
        statement: Some(Statement { mnemonic, operands }),
    })
}

fn strip_comment(line: &str) -> &str {
    line.find(';').map_or(line, |pos| &line[..pos])
}

fn split_label(text: &str) -> Option<(String, &str)> {
    let colon_pos = text.find(':')?;
    let label = text[..colon_pos].trim();
    is_identifier(label).then(|| (label.to_string(), &text[colon_pos + 1..]))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_operands(
    text: &str,
    mnemonic: Mnemonic,
    line_number: usize,
) -> Result<Vec<Operand>, AssembleError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut fields: Vec<&str> = text.split(',').map(str::trim).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }

    fields
        .into_iter()
        .map(|field| {
            if field.is_empty() {
                Err(AssembleError::at(
                    line_number,
                    AssembleErrorKind::MissingOperand {
                        mnemonic: mnemonic.name().to_string(),
                    },
                ))
            } else {
                parse_operand(field, line_number)
            }
        })
        .collect()
}

fn parse_operand(s: &str, line_number: usize) -> Result<Operand, AssembleError> {
    if is_identifier(s) {
        return Ok(Operand::Symbol(s.to_string()));
    }
    s.parse::<i64>().map(Operand::Literal).map_err(|_| {
        AssembleError::at(
            line_number,
            AssembleErrorKind::BadInteger {
                text: s.to_string(),
            },
        )
    })
}

//! Error reporting for both assembler passes and the file-level driver.
//!
//! Every error that originates in the source text carries the 1-based line
//! number it was found on; file-system failures carry the path instead.
//!
//! ```text
//! line 7: undefined symbol 'Loop'
//! ```

use std::fmt;
use std::path::PathBuf;

/// Classification of assembly failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleErrorKind {
    /// Mnemonic is neither an instruction nor a directive.
    #[error("unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic {
        /// The mnemonic as written.
        mnemonic: String,
    },
    /// Fewer operands than the instruction form requires, or an empty
    /// operand between two commas.
    #[error("missing operand for {mnemonic}")]
    MissingOperand {
        /// Upper-case mnemonic.
        mnemonic: String,
    },
    /// More operands than any form of the instruction accepts.
    #[error("too many operands for {mnemonic} (at most {max})")]
    TooManyOperands {
        /// Upper-case mnemonic.
        mnemonic: String,
        /// Largest accepted operand count.
        max: usize,
    },
    /// Operand value does not fit its field.
    #[error("{field} operand {value} out of range {min}..={max}")]
    OperandOutOfRange {
        /// Field name (`R`, `IX`, `ADDR`, ...).
        field: &'static str,
        /// Resolved value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// Register is in range but not usable by this instruction.
    #[error("{mnemonic} requires register 0 or 2, got {register}")]
    RegisterNotAllowed {
        /// Upper-case mnemonic.
        mnemonic: String,
        /// The rejected register number.
        register: i64,
    },
    /// Symbol used as an operand was never defined.
    #[error("undefined symbol '{name}'")]
    UndefinedSymbol {
        /// The symbol name.
        name: String,
    },
    /// Label defined twice.
    #[error("duplicate label '{name}' (first defined at line {first_definition})")]
    DuplicateLabel {
        /// The label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// `LOC` with no value.
    #[error("LOC requires an address operand")]
    LocWithoutOperand,
    /// Operand is neither a decimal integer nor a symbol name.
    #[error("cannot parse integer '{text}'")]
    BadInteger {
        /// The offending operand text.
        text: String,
    },
    /// A word would be emitted outside memory.
    #[error("address {address} is outside memory (0..{limit})", limit = machine_core::MEMORY_WORDS)]
    AddressOutOfRange {
        /// Location counter at the emitting line.
        address: u32,
    },
    /// Reading the source or writing an output file failed.
    #[error("{path}: {message}", path = path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Operating-system error text.
        message: String,
    },
}

/// An assembly failure with the source line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// The kind of error.
    pub kind: AssembleErrorKind,
    /// 1-based source line; `None` for file-level failures.
    pub line: Option<usize>,
}

impl AssembleError {
    /// Creates an error attached to a source line.
    #[must_use]
    pub const fn at(line: usize, kind: AssembleErrorKind) -> Self {
        Self {
            kind,
            line: Some(line),
        }
    }

    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self {
            kind: AssembleErrorKind::Io {
                path: path.into(),
                message: error.to_string(),
            },
            line: None,
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for AssembleError {}

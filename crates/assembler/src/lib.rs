//! Two-pass assembler for the sixteen-bit teaching machine.
//!
//! Source text goes through [`symbols::assign_addresses`] (pass 1) and
//! [`encoder::encode_statement`] (pass 2); [`assembler::assemble_file`]
//! ties them together and writes the listing and load files.

use clap as _;
use tracing_subscriber as _;

/// Top-level pipeline and output files.
pub mod assembler;
/// Pass-2 operand resolution and word encoding.
pub mod encoder;
/// Assembly error types.
pub mod errors;
/// Listing and load-file text.
pub mod listing;
/// Directive and opcode mnemonics.
pub mod mnemonic;
/// Line parser.
pub mod parser;
/// Source file ingestion.
pub mod source;
/// Symbol table and pass-1 address assignment.
pub mod symbols;

pub use assembler::{assemble_file, assemble_source, output_paths, Assembly, OutputPaths};
pub use errors::{AssembleError, AssembleErrorKind};

#[cfg(test)]
use proptest as _;

//! Source ingestion.
//!
//! Lines keep their original text so the listing can copy them through
//! verbatim, and their 1-based number so diagnostics can name them.

use std::fs;
use std::path::Path;

use crate::errors::AssembleError;

/// A line of source with its original location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The source text (without trailing newline).
    pub text: String,
    /// 1-indexed line number in the original file.
    pub original_line: usize,
}

/// Splits source text into numbered lines.
#[must_use]
pub fn split_source(content: &str) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| SourceLine {
            text: line.to_string(),
            original_line: idx + 1,
        })
        .collect()
}

/// Reads and splits a source file.
///
/// # Errors
///
/// Returns an I/O error naming `path` when the file cannot be read.
pub fn read_source(path: &Path) -> Result<Vec<SourceLine>, AssembleError> {
    let content = fs::read_to_string(path).map_err(|e| AssembleError::io(path, &e))?;
    Ok(split_source(&content))
}

//! Load-file parsing for initial program load.

use thiserror::Error;

use crate::MEMORY_WORDS;

/// One `ADDRESS WORD` record from a load file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRecord {
    /// Target address.
    pub address: u16,
    /// Word deposited at `address`.
    pub word: u16,
}

/// Load-file errors, each naming the 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The line does not hold exactly two fields.
    #[error("line {line}: expected `ADDRESS WORD`, found {found:?}")]
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// Offending line text.
        found: String,
    },
    /// A field is not an octal number that fits 16 bits.
    #[error("line {line}: {field:?} is not a 16-bit octal number")]
    BadOctal {
        /// 1-based line number.
        line: usize,
        /// Offending field.
        field: String,
    },
    /// The address lies outside memory.
    #[error("line {line}: address {address:o} is outside memory")]
    AddressOutOfRange {
        /// 1-based line number.
        line: usize,
        /// Parsed address.
        address: u16,
    },
    /// The file holds no records.
    #[error("load file contains no records")]
    Empty,
}

fn parse_octal(field: &str, line: usize) -> Result<u16, LoadError> {
    u16::from_str_radix(field, 8).map_err(|_| LoadError::BadOctal {
        line,
        field: field.to_owned(),
    })
}

/// Parses load-file text into records. Blank lines are skipped and fields
/// may be separated by any whitespace.
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered, or [`LoadError::Empty`]
/// when no record is present.
pub fn parse_load_file(text: &str) -> Result<Vec<LoadRecord>, LoadError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let mut fields = raw.split_whitespace();
        let (Some(address), Some(word), None) = (fields.next(), fields.next(), fields.next())
        else {
            if raw.trim().is_empty() {
                continue;
            }
            return Err(LoadError::MalformedRecord {
                line,
                found: raw.to_owned(),
            });
        };

        let address = parse_octal(address, line)?;
        let word = parse_octal(word, line)?;
        if usize::from(address) >= MEMORY_WORDS {
            return Err(LoadError::AddressOutOfRange { line, address });
        }
        records.push(LoadRecord { address, word });
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{parse_load_file, LoadError, LoadRecord};

    #[test]
    fn records_parse_with_any_whitespace() {
        let records = parse_load_file("000006 006410\n\n000007\t000000\r\n  000010   177777\n")
            .expect("valid load text");
        assert_eq!(
            records,
            vec![
                LoadRecord { address: 6, word: 0o6410 },
                LoadRecord { address: 7, word: 0 },
                LoadRecord { address: 8, word: 0xFFFF },
            ]
        );
    }

    #[test]
    fn errors_name_the_offending_line() {
        assert_eq!(
            parse_load_file("000001 000002\n000003\n"),
            Err(LoadError::MalformedRecord {
                line: 2,
                found: "000003".to_owned()
            })
        );
        assert_eq!(
            parse_load_file("000001 000009\n"),
            Err(LoadError::BadOctal {
                line: 1,
                field: "000009".to_owned()
            })
        );
        assert_eq!(
            parse_load_file("\n004000 000001\n"),
            Err(LoadError::AddressOutOfRange {
                line: 2,
                address: 2048
            })
        );
        assert!(parse_load_file("000001 200000\n").is_err());
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_load_file("\n  \n"), Err(LoadError::Empty));
    }

    #[test]
    fn error_display_names_line() {
        let err = parse_load_file("x y z").expect_err("three fields");
        assert!(err.to_string().starts_with("line 1:"));
    }
}

//! Two-pass assembler pipeline and output file handling.
//!
//! Assembly completes in memory before anything is written, so a failed
//! run leaves no partial listing or load file behind.

use std::fs;
use std::path::{Path, PathBuf};

use machine_core::{LoadRecord, MEMORY_WORDS};
use tracing::{event, Level};

use crate::encoder::encode_statement;
use crate::errors::{AssembleError, AssembleErrorKind};
use crate::listing::{render_listing, render_load, ListingEntry, ListingKind};
use crate::source::{read_source, split_source, SourceLine};
use crate::symbols::{assign_addresses, SymbolTable};

/// Output of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// One listing entry per source line.
    pub listing: Vec<ListingEntry>,
    /// Emitted words in source order.
    pub records: Vec<LoadRecord>,
    /// Label definitions.
    pub symbols: SymbolTable,
}

impl Assembly {
    /// Listing file text.
    #[must_use]
    pub fn listing_text(&self) -> String {
        render_listing(&self.listing)
    }

    /// Load file text.
    #[must_use]
    pub fn load_text(&self) -> String {
        render_load(&self.records)
    }
}

/// Where the two output files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<base>_listing.txt`.
    pub listing: PathBuf,
    /// `<base>_load.txt`.
    pub load: PathBuf,
}

/// Derives the output paths for `source`: same directory, with the file's
/// extension replaced by `_listing.txt` and `_load.txt`.
#[must_use]
pub fn output_paths(source: &Path) -> OutputPaths {
    let stem = source
        .file_stem()
        .map_or_else(|| "out".into(), |s| s.to_string_lossy());
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    OutputPaths {
        listing: parent.join(format!("{stem}_listing.txt")),
        load: parent.join(format!("{stem}_load.txt")),
    }
}

/// Assembles source text.
///
/// # Errors
///
/// Returns the first error found, in source order within each pass.
pub fn assemble_source(text: &str) -> Result<Assembly, AssembleError> {
    assemble_lines(&split_source(text))
}

/// Assembles already-split source lines.
///
/// # Errors
///
/// Returns the first error found, in source order within each pass.
pub fn assemble_lines(lines: &[SourceLine]) -> Result<Assembly, AssembleError> {
    let assignment = assign_addresses(lines)?;

    let mut listing = Vec::with_capacity(assignment.lines.len());
    let mut records = Vec::new();
    for line in &assignment.lines {
        let line_number = line.source.original_line;
        let kind = match &line.parsed.statement {
            None if line.parsed.label.is_some() => ListingKind::Label {
                address: line.address,
            },
            None => ListingKind::Passthrough,
            Some(statement) => {
                match encode_statement(statement, &assignment.symbols, line_number)? {
                    Some(word) => {
                        let address = emit_address(line.address, line_number)?;
                        records.push(LoadRecord { address, word });
                        ListingKind::Emitted { address, word }
                    }
                    None => ListingKind::Passthrough,
                }
            }
        };
        listing.push(ListingEntry {
            kind,
            source: line.source.text.clone(),
        });
    }

    event!(Level::DEBUG, words = records.len(), "pass 2 complete");
    Ok(Assembly {
        listing,
        records,
        symbols: assignment.symbols,
    })
}

fn emit_address(location: u32, line_number: usize) -> Result<u16, AssembleError> {
    u16::try_from(location)
        .ok()
        .filter(|&address| usize::from(address) < MEMORY_WORDS)
        .ok_or_else(|| {
            AssembleError::at(
                line_number,
                AssembleErrorKind::AddressOutOfRange { address: location },
            )
        })
}

/// Writes both output files. If the second write fails the first file is
/// removed again.
///
/// # Errors
///
/// Returns an I/O error naming the file that could not be written.
pub fn write_outputs(assembly: &Assembly, paths: &OutputPaths) -> Result<(), AssembleError> {
    fs::write(&paths.listing, assembly.listing_text())
        .map_err(|e| AssembleError::io(&paths.listing, &e))?;
    if let Err(e) = fs::write(&paths.load, assembly.load_text()) {
        if let Err(cleanup) = fs::remove_file(&paths.listing) {
            event!(
                Level::WARN,
                listing = %paths.listing.display(),
                error = %cleanup,
                "could not remove partial listing"
            );
        }
        return Err(AssembleError::io(&paths.load, &e));
    }
    Ok(())
}

/// Assembles `source` and writes the listing and load files beside it.
///
/// # Errors
///
/// Returns any read, assembly or write error. Nothing is written unless
/// assembly succeeds.
pub fn assemble_file(source: &Path) -> Result<(Assembly, OutputPaths), AssembleError> {
    let lines = read_source(source)?;
    let assembly = assemble_lines(&lines)?;
    let paths = output_paths(source);
    write_outputs(&assembly, &paths)?;
    event!(
        Level::DEBUG,
        listing = %paths.listing.display(),
        load = %paths.load.display(),
        "outputs written"
    );
    Ok((assembly, paths))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP: &str = "LOC 6\nStart: LDA 1,0,End\nDATA 0\nEnd:   HLT\n";

    #[test]
    fn scenario_program_produces_expected_load_file() {
        let assembly = assemble_source(ROUND_TRIP).expect("assembles");
        assert_eq!(
            assembly.load_text(),
            "000006 006410\n000007 000000\n000010 000000\n"
        );
    }

    #[test]
    fn listing_mirrors_every_source_line() {
        let assembly = assemble_source(ROUND_TRIP).expect("assembles");
        assert_eq!(
            assembly.listing_text(),
            "\t\t\tLOC 6\n\
             000006\t006410\tStart: LDA 1,0,End\n\
             000007\t000000\tDATA 0\n\
             000010\t000000\tEnd:   HLT\n"
        );
    }

    #[test]
    fn comments_blanks_and_labels_in_listing() {
        let assembly = assemble_source("; header\n\nTop:\nJMA Top\n").expect("assembles");
        let rows: Vec<String> = assembly.listing.iter().map(ListingEntry::render).collect();
        assert_eq!(
            rows,
            vec![
                "\t\t\t; header".to_string(),
                "\t\t\t".to_string(),
                "000000\tTop:".to_string(),
                "000000\t026000\tJMA Top".to_string(),
            ]
        );
    }

    #[test]
    fn forward_references_resolve() {
        let assembly = assemble_source("JZ 0,Done\nDATA 7\nDone: HLT\n").expect("assembles");
        assert_eq!(assembly.records[0].word, 0o020002);
    }

    #[test]
    fn emitting_past_memory_fails() {
        let error = assemble_source("LOC 2047\nDATA 1\nDATA 2\n").expect_err("overflows memory");
        assert_eq!(error.line, Some(3));
        assert_eq!(
            error.kind,
            AssembleErrorKind::AddressOutOfRange { address: 2048 }
        );
    }

    #[test]
    fn label_past_memory_is_allowed() {
        let assembly = assemble_source("LOC 2047\nDATA 1\nEnd:\n").expect("assembles");
        assert_eq!(assembly.symbols["End"].address, 2048);
    }

    #[test]
    fn output_paths_sit_beside_the_source() {
        let paths = output_paths(Path::new("programs/demo.txt"));
        assert_eq!(paths.listing, PathBuf::from("programs/demo_listing.txt"));
        assert_eq!(paths.load, PathBuf::from("programs/demo_load.txt"));
    }

    #[test]
    fn assemble_file_writes_both_outputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("prog.txt");
        fs::write(&source, ROUND_TRIP).expect("write source");

        let (assembly, paths) = assemble_file(&source).expect("assembles");

        assert_eq!(
            fs::read_to_string(&paths.load).expect("load file"),
            assembly.load_text()
        );
        assert_eq!(
            fs::read_to_string(&paths.listing).expect("listing file"),
            assembly.listing_text()
        );
    }

    #[test]
    fn failed_load_write_removes_the_listing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = OutputPaths {
            listing: dir.path().join("prog_listing.txt"),
            load: dir.path().join("prog_load.txt"),
        };
        fs::create_dir(&paths.load).expect("directory in place of the load file");
        let assembly = assemble_source(ROUND_TRIP).expect("assembles");

        let error = write_outputs(&assembly, &paths).expect_err("load path is a directory");

        assert!(matches!(error.kind, AssembleErrorKind::Io { .. }));
        assert!(!paths.listing.exists());
    }

    #[test]
    fn failed_assembly_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("bad.txt");
        fs::write(&source, "LDR 0,0,Missing\n").expect("write source");

        let error = assemble_file(&source).expect_err("undefined symbol");
        assert_eq!(error.line, Some(1));

        let paths = output_paths(&source);
        assert!(!paths.listing.exists());
        assert!(!paths.load.exists());
    }
}

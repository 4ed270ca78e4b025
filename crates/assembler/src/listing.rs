//! Listing and load-file rendering.

use std::fmt::Write as _;

use machine_core::{format_octal, LoadRecord};

/// What a listing line shows in front of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// An emitting line: address and word.
    Emitted {
        /// Address the word was placed at.
        address: u16,
        /// The emitted word.
        word: u16,
    },
    /// A label-only line: the label's address.
    Label {
        /// Location counter at the label.
        address: u32,
    },
    /// Comment, blank or `LOC` line.
    Passthrough,
}

/// One listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Prefix kind.
    pub kind: ListingKind,
    /// Original source text.
    pub source: String,
}

impl ListingEntry {
    /// Renders the entry without a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        match self.kind {
            ListingKind::Emitted { address, word } => format!(
                "{}\t{}\t{}",
                format_octal(address),
                format_octal(word),
                self.source
            ),
            ListingKind::Label { address } => format!("{address:06o}\t{}", self.source),
            ListingKind::Passthrough => format!("\t\t\t{}", self.source),
        }
    }
}

/// Renders a full listing, one entry per line.
#[must_use]
pub fn render_listing(entries: &[ListingEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}", entry.render());
    }
    out
}

/// Renders load records as `AAAAAA WWWWWW` lines.
#[must_use]
pub fn render_load(records: &[LoadRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{} {}",
            format_octal(record.address),
            format_octal(record.word)
        );
    }
    out
}

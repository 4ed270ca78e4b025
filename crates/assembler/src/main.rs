//! CLI entry point for the `asm16` assembler binary.

use std::path::PathBuf;
use std::process::ExitCode;

use assembler::assemble_file;
use clap::Parser;
use machine_core as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

/// Assembler for the sixteen-bit teaching machine.
///
/// Writes `<base>_listing.txt` and `<base>_load.txt` next to the source.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Assembly source file (e.g. `program.txt`).
    source: PathBuf,
}

fn init_tracing() -> Result<(), String> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .map_err(|e| format!("failed to initialise tracing filter: {e}"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(message) = init_tracing() {
        eprintln!("error: {message}");
        return ExitCode::FAILURE;
    }

    match assemble_file(&cli.source) {
        Ok((assembly, paths)) => {
            event!(Level::INFO, source = %cli.source.display(), "assembly succeeded");
            println!(
                "Assembled {} ({} words) -> {}, {}",
                cli.source.display(),
                assembly.records.len(),
                paths.listing.display(),
                paths.load.display()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}: error: {error}", cli.source.display());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn takes_exactly_one_source_path() {
        let cli = Cli::try_parse_from(["asm16", "prog.txt"]).expect("one argument parses");
        assert_eq!(cli.source, PathBuf::from("prog.txt"));

        assert!(Cli::try_parse_from(["asm16"]).is_err());
        assert!(Cli::try_parse_from(["asm16", "a.txt", "b.txt"]).is_err());
    }
}

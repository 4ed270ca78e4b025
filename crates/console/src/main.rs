//! Headless operator console for the sixteen-bit teaching machine.
//!
//! Loads a load file, applies operator deposits, optionally preloads the
//! file-reader device, then runs until the program halts, faults, runs out
//! of keyboard input, hits the step limit or the operator presses Ctrl-C.

mod panel;
mod session;

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use machine_core::{
    paragraph_code_points, AddressError, LoadError, Machine, MachineConfig, StopReason,
    MEMORY_WORDS,
};
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use crate::panel::{
    describe_stop, memory_window, render_memory_window, render_registers, render_reserved,
    render_words,
};
use crate::session::{drive, KeyboardFeed, SessionOutcome};

/// Operator console for the sixteen-bit teaching machine.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Load file produced by the assembler.
    load_file: PathBuf,

    /// Text file queued on the file-reader device (device 2).
    #[clap(long)]
    paragraph: Option<PathBuf>,

    /// Keyboard line supplied before falling back to stdin. Repeatable.
    #[clap(long = "input", short = 'i')]
    input: Vec<String>,

    /// Deposit `WORD` at `ADDR` after loading, both octal. Repeatable.
    #[clap(long, value_name = "ADDR=WORD", value_parser = parse_deposit)]
    deposit: Vec<Deposit>,

    /// Octal address to show after the run. Repeatable.
    #[clap(long, value_name = "ADDR", value_parser = parse_address)]
    inspect: Vec<u16>,

    /// Stop each run after this many steps.
    #[clap(long)]
    max_steps: Option<u64>,

    /// Print the cache pane after the run.
    #[clap(long)]
    cache: bool,

    /// Print the final state as JSON instead of text panes.
    #[clap(long)]
    json: bool,

    /// Log every fetch and cache access.
    #[clap(long)]
    trace: bool,
}

/// One operator deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deposit {
    address: u16,
    word: u16,
}

fn parse_address(text: &str) -> Result<u16, String> {
    let address = u16::from_str_radix(text.trim(), 8)
        .map_err(|_| format!("{text:?} is not an octal address"))?;
    if usize::from(address) >= MEMORY_WORDS {
        return Err(format!("address {address:o} is outside memory"));
    }
    Ok(address)
}

fn parse_deposit(text: &str) -> Result<Deposit, String> {
    let (address, word) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=WORD, found {text:?}"))?;
    let word = u16::from_str_radix(word.trim(), 8)
        .map_err(|_| format!("{word:?} is not a 16-bit octal word"))?;
    Ok(Deposit {
        address: parse_address(address)?,
        word,
    })
}

#[derive(Debug)]
enum Fail {
    /// Logging could not be set up.
    Tracing(String),
    /// A file could not be read.
    Read { path: PathBuf, error: io::Error },
    /// The load file is malformed.
    Load(LoadError),
    /// A deposit or inspection named an address outside memory.
    Address(AddressError),
    /// Writing program output failed.
    Output(io::Error),
    /// The JSON report could not be produced.
    Json(serde_json::Error),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracing(msg) => f.write_str(msg),
            Self::Read { path, error } => write!(f, "{}: {error}", path.display()),
            Self::Load(error) => write!(f, "load file: {error}"),
            Self::Address(error) => write!(f, "memory: {error}"),
            Self::Output(error) => write!(f, "output: {error}"),
            Self::Json(error) => write!(f, "json: {error}"),
        }
    }
}

impl std::error::Error for Fail {}

fn init_tracing(force_trace: bool) -> Result<(), Fail> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = if force_trace {
        tracing_subscriber::EnvFilter::try_new("trace")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    }
    .map_err(|e| Fail::Tracing(format!("failed to initialise tracing filter: {e}")))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn read_text(path: &Path) -> Result<String, Fail> {
    fs::read_to_string(path).map_err(|error| Fail::Read {
        path: path.to_path_buf(),
        error,
    })
}

fn install_halt_handler() -> Arc<AtomicBool> {
    let halt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&halt);
    if let Err(error) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        event!(Level::WARN, error = %error, "Ctrl-C handler unavailable");
    }
    halt
}

fn words_json(words: &[(u16, u16)]) -> serde_json::Value {
    words
        .iter()
        .map(|&(address, word)| serde_json::json!({ "address": address, "word": word }))
        .collect()
}

fn report(machine: &Machine, outcome: SessionOutcome, cli: &Cli) -> Result<(), Fail> {
    let inspected = cli
        .inspect
        .iter()
        .map(|&address| machine.inspect(address).map(|word| (address, word)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(Fail::Address)?;

    if cli.json {
        let cache = cli.cache.then(|| machine.cache_view());
        let value = serde_json::json!({
            "stop": outcome.stop,
            "steps": outcome.steps,
            "state": machine.snapshot(),
            "memory": words_json(&memory_window(machine)),
            "inspect": words_json(&inspected),
            "cache": cache,
        });
        let text = serde_json::to_string_pretty(&value).map_err(Fail::Json)?;
        println!("{text}");
        return Ok(());
    }

    println!();
    println!("{}", describe_stop(outcome.stop, outcome.steps));
    print!("{}", render_registers(&machine.snapshot()));
    print!("{}", render_reserved(machine));
    print!("{}", render_memory_window(machine));
    if !inspected.is_empty() {
        println!("INSPECT");
        print!("{}", render_words(&inspected));
    }
    if cli.cache {
        print!("{}", machine.render_cache());
    }
    Ok(())
}

fn run_console(cli: &Cli) -> Result<SessionOutcome, Fail> {
    init_tracing(cli.trace)?;
    let halt = install_halt_handler();

    let mut machine = Machine::with_config(MachineConfig {
        step_limit: cli.max_steps,
        ..MachineConfig::default()
    });
    let start = machine
        .ipl(&read_text(&cli.load_file)?)
        .map_err(Fail::Load)?;
    event!(Level::INFO, start = start, load_file = %cli.load_file.display(), "program loaded");

    for deposit in &cli.deposit {
        machine
            .load(deposit.address, deposit.word)
            .map_err(Fail::Address)?;
        event!(
            Level::DEBUG,
            address = deposit.address,
            word = deposit.word,
            "operator deposit"
        );
    }

    if let Some(path) = &cli.paragraph {
        let words = paragraph_code_points(&read_text(path)?);
        event!(Level::DEBUG, words = words.len(), "file reader preloaded");
        machine.preload_file(&words);
    }

    let stdin = io::stdin();
    let mut keyboard = KeyboardFeed::new(cli.input.clone(), Some(stdin.lock()));
    let mut stdout = io::stdout();
    let outcome = drive(&mut machine, &halt, &mut keyboard, &mut stdout).map_err(Fail::Output)?;

    report(&machine, outcome, cli)?;
    Ok(outcome)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_console(&cli) {
        Ok(SessionOutcome {
            stop: StopReason::Fault(_),
            ..
        }) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

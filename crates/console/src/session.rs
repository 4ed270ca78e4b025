//! Run loop that resumes the machine across keyboard suspensions.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::atomic::AtomicBool;

use machine_core::{Machine, StopReason};
use tracing::{event, Level};

/// Keyboard lines: scripted entries first, then an optional interactive
/// reader.
#[derive(Debug)]
pub struct KeyboardFeed<R> {
    scripted: VecDeque<String>,
    interactive: Option<R>,
}

impl<R: BufRead> KeyboardFeed<R> {
    pub fn new(scripted: Vec<String>, interactive: Option<R>) -> Self {
        Self {
            scripted: scripted.into(),
            interactive,
        }
    }

    /// Next line of operator input, or `None` once every source is
    /// exhausted.
    pub fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.scripted.pop_front() {
            return Some(line);
        }
        let reader = self.interactive.as_mut()?;
        eprint!("input> ");
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.interactive = None;
                None
            }
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Totals for a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Step attempts across every run.
    pub steps: u64,
    /// Why the last run stopped.
    pub stop: StopReason,
}

/// Runs the machine, copying printer output to `printer` after every run
/// and feeding keyboard lines whenever the machine suspends on input.
///
/// Returns once the machine stops for any other reason, or when it waits
/// for input and `keyboard` has nothing left.
///
/// # Errors
///
/// Returns any error from writing to `printer`.
pub fn drive<R: BufRead, W: Write>(
    machine: &mut Machine,
    halt: &AtomicBool,
    keyboard: &mut KeyboardFeed<R>,
    printer: &mut W,
) -> io::Result<SessionOutcome> {
    let mut steps = 0u64;
    loop {
        let outcome = machine.run(halt);
        steps += outcome.steps;

        let text = machine.take_printer();
        if !text.is_empty() {
            printer.write_all(text.as_bytes())?;
            printer.flush()?;
        }

        if outcome.stop != StopReason::WaitingForInput {
            return Ok(SessionOutcome {
                steps,
                stop: outcome.stop,
            });
        }

        loop {
            let Some(line) = keyboard.next_line() else {
                event!(Level::INFO, "keyboard input exhausted");
                return Ok(SessionOutcome {
                    steps,
                    stop: StopReason::WaitingForInput,
                });
            };
            match machine.submit_keyboard_text(&line) {
                Ok(value) => {
                    event!(Level::DEBUG, value = value, "keyboard input accepted");
                    break;
                }
                Err(error) => {
                    event!(Level::WARN, input = ?line, error = %error, "keyboard input rejected");
                }
            }
        }
    }
}

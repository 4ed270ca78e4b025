use std::collections::VecDeque;

use thiserror::Error;

use super::{DeviceInput, IoDevice};
use crate::word::truncate;

/// Keyboard text the operator submitted but which has no word value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Nothing but whitespace was submitted.
    #[error("keyboard input is empty")]
    Empty,
}

/// Converts operator text to the word delivered to `IN`.
///
/// Signed decimal text is truncated to 16 bits; anything else yields the
/// first character's code point masked to 16 bits.
///
/// # Errors
///
/// Returns [`InputError::Empty`] when `text` is empty after trimming.
pub fn parse_keyboard_input(text: &str) -> Result<u16, InputError> {
    let trimmed = text.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return Ok(truncate(number));
    }
    let first = trimmed.chars().next().ok_or(InputError::Empty)?;
    Ok(truncate(i64::from(u32::from(first))))
}

/// Operator keyboard. `IN` suspends until a value has been submitted.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    pending: VecDeque<u16>,
}

impl Keyboard {
    /// Queues a word for the next `IN`.
    pub fn submit(&mut self, value: u16) {
        self.pending.push_back(value);
    }

    /// Returns `true` when a submitted word is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl IoDevice for Keyboard {
    fn input(&mut self) -> DeviceInput {
        self.pending
            .pop_front()
            .map_or(DeviceInput::Pending, DeviceInput::Ready)
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}

use std::fmt::Write as _;

use super::{DeviceInput, IoDevice};
use crate::word::to_signed;

/// Character sink fed by `OUT`.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    buffer: String,
}

impl Printer {
    /// Text printed since the last [`Printer::take`].
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Drains printed text.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Appends the signed decimal value followed by a newline.
    pub fn print_decimal(&mut self, value: u16) {
        let _ = writeln!(self.buffer, "{}", to_signed(value));
    }
}

impl IoDevice for Printer {
    fn input(&mut self) -> DeviceInput {
        DeviceInput::Ready(0)
    }

    fn output(&mut self, value: u16) {
        let [_, low] = value.to_be_bytes();
        self.buffer.push(char::from(low));
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

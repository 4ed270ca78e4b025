//! Simulated I/O devices reachable through `IN`, `OUT` and `CHK`.

/// Operator keyboard (device 0).
pub mod keyboard;
/// Character printer (device 1).
pub mod printer;
/// Paragraph file reader (device 2).
pub mod file_reader;

pub use file_reader::{paragraph_code_points, FileReader};
pub use keyboard::{parse_keyboard_input, InputError, Keyboard};
pub use printer::Printer;

/// Device number of the keyboard.
pub const KEYBOARD_DEVICE: u8 = 0;
/// Device number of the printer.
pub const PRINTER_DEVICE: u8 = 1;
/// Device number of the file reader.
pub const FILE_READER_DEVICE: u8 = 2;

/// Result of asking a device for one input word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceInput {
    /// A word is available.
    Ready(u16),
    /// No word yet; the requesting instruction must suspend.
    Pending,
}

/// Contract shared by every simulated device.
pub trait IoDevice {
    /// Takes one input word.
    fn input(&mut self) -> DeviceInput;

    /// Accepts one output word. Input-only devices ignore it.
    fn output(&mut self, _value: u16) {}

    /// Status word returned by `CHK`; 1 means ready.
    fn status(&self) -> u16 {
        1
    }

    /// Clears buffered state.
    fn reset(&mut self);
}

/// Fixed device bus routing device numbers to the three devices.
///
/// Unmapped numbers read as 0. `OUT` to any device other than the printer
/// prints the value as a signed decimal line.
#[derive(Debug, Clone, Default)]
pub struct DeviceBus {
    keyboard: Keyboard,
    printer: Printer,
    file_reader: FileReader,
}

impl DeviceBus {
    /// Keyboard device.
    #[must_use]
    pub const fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Mutable keyboard device.
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// Printer device.
    #[must_use]
    pub const fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Mutable printer device.
    pub fn printer_mut(&mut self) -> &mut Printer {
        &mut self.printer
    }

    /// Mutable file reader device.
    pub fn file_reader_mut(&mut self) -> &mut FileReader {
        &mut self.file_reader
    }

    /// File reader device.
    #[must_use]
    pub const fn file_reader(&self) -> &FileReader {
        &self.file_reader
    }

    /// Reads one word from `device`.
    pub fn input(&mut self, device: u8) -> DeviceInput {
        match device {
            KEYBOARD_DEVICE => self.keyboard.input(),
            PRINTER_DEVICE => self.printer.input(),
            FILE_READER_DEVICE => self.file_reader.input(),
            _ => DeviceInput::Ready(0),
        }
    }

    /// Writes one word to `device`.
    pub fn output(&mut self, device: u8, value: u16) {
        match device {
            PRINTER_DEVICE => self.printer.output(value),
            _ => self.printer.print_decimal(value),
        }
    }

    /// Status of `device` for `CHK`.
    #[must_use]
    pub fn status(&self, device: u8) -> u16 {
        match device {
            KEYBOARD_DEVICE => self.keyboard.status(),
            PRINTER_DEVICE => self.printer.status(),
            FILE_READER_DEVICE => self.file_reader.status(),
            _ => 1,
        }
    }

    /// Resets every device.
    pub fn reset(&mut self) {
        self.keyboard.reset();
        self.printer.reset();
        self.file_reader.reset();
    }
}

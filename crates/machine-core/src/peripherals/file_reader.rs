use std::collections::VecDeque;

use super::{DeviceInput, IoDevice};

/// Converts paragraph text into the code points queued on the file reader.
#[must_use]
pub fn paragraph_code_points(text: &str) -> Vec<u16> {
    text.chars()
        .map(|ch| (u32::from(ch) & 0xFFFF) as u16)
        .collect()
}

/// Queue of pre-loaded words; reads 0 once drained.
#[derive(Debug, Clone, Default)]
pub struct FileReader {
    queue: VecDeque<u16>,
}

impl FileReader {
    /// Appends words to the read queue.
    pub fn preload(&mut self, words: &[u16]) {
        self.queue.extend(words.iter().copied());
    }

    /// Number of words not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl IoDevice for FileReader {
    fn input(&mut self) -> DeviceInput {
        DeviceInput::Ready(self.queue.pop_front().unwrap_or(0))
    }

    fn reset(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{paragraph_code_points, FileReader};
    use crate::peripherals::{DeviceInput, IoDevice};

    #[test]
    fn paragraph_text_maps_to_code_points() {
        assert_eq!(paragraph_code_points("Hi.\n"), vec![72, 105, 46, 10]);
        assert_eq!(paragraph_code_points("\u{1F600}"), vec![0xF600]);
    }

    #[test]
    fn reader_drains_in_order_then_reads_zero() {
        let mut reader = FileReader::default();
        reader.preload(&[3, 4]);
        assert_eq!(reader.input(), DeviceInput::Ready(3));
        assert_eq!(reader.input(), DeviceInput::Ready(4));
        assert_eq!(reader.input(), DeviceInput::Ready(0));
        assert_eq!(reader.remaining(), 0);
    }
}

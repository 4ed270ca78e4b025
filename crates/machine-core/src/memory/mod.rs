//! Backing store: 2048 sixteen-bit words.

/// Address legality checks.
pub mod access;
/// Reserved low-memory map.
pub mod map;

pub use access::validate_address;
pub use map::{ReservedSlot, FAULT_VECTOR_ADDR, MEMORY_WORDS, SAVED_PC_ADDR, TRAP_VECTOR_ADDR};

use crate::{LoadRecord, MachineFault};

/// Word-addressed main memory.
///
/// This is the raw array behind the cache; it never touches `MAR`/`MBR`.
/// The CPU-side path that updates those registers lives on
/// [`crate::Machine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    words: Box<[u16]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }
}

impl Memory {
    /// Reads the word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::IllegalMemoryAddress`] for `addr >= 2048`.
    pub fn read(&self, addr: u16) -> Result<u16, MachineFault> {
        let index = validate_address(addr)?;
        Ok(self.words[index])
    }

    /// Writes `value` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::IllegalMemoryAddress`] for `addr >= 2048`.
    pub fn write(&mut self, addr: u16, value: u16) -> Result<(), MachineFault> {
        let index = validate_address(addr)?;
        self.words[index] = value;
        Ok(())
    }

    /// Zeroes every word.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Copies load records into memory and returns how many landed.
    /// Records outside memory are skipped.
    pub fn deposit(&mut self, records: &[LoadRecord]) -> usize {
        let mut deposited = 0;
        for record in records {
            if let Some(slot) = self.words.get_mut(usize::from(record.address)) {
                *slot = record.word;
                deposited += 1;
            }
        }
        deposited
    }

    /// Borrows the full word array.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, MEMORY_WORDS};
    use crate::{LoadRecord, MachineFault};

    #[test]
    fn deposit_skips_records_outside_memory() {
        let mut memory = Memory::default();
        let records = [
            LoadRecord {
                address: 6,
                word: 0o6410,
            },
            LoadRecord {
                address: 2048,
                word: 1,
            },
            LoadRecord {
                address: 2047,
                word: 0o177777,
            },
        ];

        assert_eq!(memory.deposit(&records), 2);
        assert_eq!(memory.read(6), Ok(0o6410));
        assert_eq!(memory.read(2047), Ok(0o177777));
    }

    #[test]
    fn power_on_memory_is_zeroed() {
        let memory = Memory::default();
        assert_eq!(memory.words().len(), MEMORY_WORDS);
        assert!(memory.words().iter().all(|word| *word == 0));
    }

    #[test]
    fn write_then_read_same_word() {
        let mut memory = Memory::default();
        memory.write(2047, 0o177777).expect("top word is addressable");
        assert_eq!(memory.read(2047), Ok(0o177777));
    }

    #[test]
    fn out_of_range_access_faults_without_side_effects() {
        let mut memory = Memory::default();
        assert_eq!(memory.read(2048), Err(MachineFault::IllegalMemoryAddress));
        assert_eq!(
            memory.write(2048, 1),
            Err(MachineFault::IllegalMemoryAddress)
        );
        assert!(memory.words().iter().all(|word| *word == 0));
    }

    #[test]
    fn clear_resets_contents() {
        let mut memory = Memory::default();
        memory.write(100, 42).expect("in range");
        memory.clear();
        assert_eq!(memory.read(100), Ok(0));
    }
}

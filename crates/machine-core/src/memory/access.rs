//! Address legality checks shared by fetch, load and store paths.

use crate::{MachineFault, MEMORY_WORDS};

/// Validates that `addr` names a word of memory.
///
/// # Errors
///
/// Returns [`MachineFault::IllegalMemoryAddress`] when `addr >= 2048`.
pub const fn validate_address(addr: u16) -> Result<usize, MachineFault> {
    let index = addr as usize;
    if index < MEMORY_WORDS {
        Ok(index)
    } else {
        Err(MachineFault::IllegalMemoryAddress)
    }
}

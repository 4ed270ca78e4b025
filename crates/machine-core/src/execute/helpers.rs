//! Effective-address computation and jump-target checks.

use crate::decoder::AddressOperand;
use crate::{Machine, MachineFault, MEMORY_WORDS};

/// Computes the effective address of a memory-class operand.
///
/// `ADDR` is zero-extended, the selected index register is added with 16-bit
/// wrap, then at most one indirect read goes through the cache.
///
/// # Errors
///
/// Returns [`MachineFault::IllegalMemoryAddress`] when the indirect read
/// targets an address outside memory.
pub fn compute_effective_address(
    machine: &mut Machine,
    operand: AddressOperand,
) -> Result<u16, MachineFault> {
    let mut ea = u16::from(operand.address);
    if let Some(index) = operand.index {
        ea = ea.wrapping_add(machine.registers.ixr(index));
    }
    if operand.indirect {
        ea = machine.read_word(ea)?;
    }
    Ok(ea)
}

/// Validates a control-transfer target so `PC` never leaves memory.
///
/// # Errors
///
/// Returns [`MachineFault::IllegalMemoryAddress`] for targets outside memory.
pub const fn jump_target(ea: u16) -> Result<u16, MachineFault> {
    if (ea as usize) < MEMORY_WORDS {
        Ok(ea)
    } else {
        Err(MachineFault::IllegalMemoryAddress)
    }
}

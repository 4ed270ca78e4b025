//! Instruction execution.
//!
//! Each instruction family has its own `execute_*` function. Memory-class
//! instructions compute their effective address (including the indirect
//! read) before evaluating any branch condition. A returned fault is latched
//! by the caller; side effects already committed stay visible.

mod flags;
mod helpers;

pub use flags::{add_result, multiply_result, subtract_result};
pub use helpers::{compute_effective_address, jump_target};

use crate::decoder::{AddressOperand, DecodedInstruction};
use crate::encoding::Opcode;
use crate::peripherals::DeviceInput;
use crate::state::{ConditionBit, GeneralRegister, IndexRegister};
use crate::word::{to_signed, truncate};
use crate::{Machine, MachineFault, SAVED_PC_ADDR, TRAP_VECTOR_ADDR};

/// Control flow after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Fetch the next instruction.
    Continue,
    /// `HLT` executed.
    Halt,
    /// `IN` suspended; `PC` already points back at it.
    WaitForInput,
}

/// Executes one decoded instruction against `machine`.
///
/// # Errors
///
/// Returns the [`MachineFault`] raised by an illegal memory access or jump
/// target.
pub fn execute_instruction(
    machine: &mut Machine,
    instruction: DecodedInstruction,
) -> Result<ExecuteOutcome, MachineFault> {
    match instruction {
        DecodedInstruction::Halt => return Ok(ExecuteOutcome::Halt),
        DecodedInstruction::Memory { op, r, operand } => execute_memory(machine, op, r, operand)?,
        DecodedInstruction::IndexMemory { op, x, operand } => {
            execute_index_memory(machine, op, x, operand)?;
        }
        DecodedInstruction::Immediate { op, r, .. } => {
            let immediate = instruction.signed_immediate().unwrap_or_default();
            execute_immediate(machine, op, r, immediate);
        }
        DecodedInstruction::RegisterPair { op, rx, ry } => {
            execute_register_pair(machine, op, rx, ry);
        }
        DecodedInstruction::Not { rx } => {
            let value = machine.registers.gpr(rx);
            machine.registers.set_gpr(rx, !value);
        }
        DecodedInstruction::Shift {
            op,
            r,
            count,
            left,
            arithmetic,
        } => execute_shift(machine, op, r, count, left, arithmetic),
        DecodedInstruction::Io { op, r, device } => {
            return Ok(execute_io(machine, op, r, device));
        }
        DecodedInstruction::Trap { .. } => execute_trap(machine)?,
        DecodedInstruction::Return { immediate } => {
            let target = jump_target(machine.registers.gpr(GeneralRegister::R3))?;
            machine
                .registers
                .set_gpr(GeneralRegister::R0, u16::from(immediate));
            machine.registers.set_pc(target);
        }
    }
    Ok(ExecuteOutcome::Continue)
}

fn jump(machine: &mut Machine, ea: u16) -> Result<(), MachineFault> {
    let target = jump_target(ea)?;
    machine.registers.set_pc(target);
    Ok(())
}

fn execute_memory(
    machine: &mut Machine,
    op: Opcode,
    r: GeneralRegister,
    operand: AddressOperand,
) -> Result<(), MachineFault> {
    let ea = compute_effective_address(machine, operand)?;
    let value = machine.registers.gpr(r);

    match op {
        Opcode::Ldr => {
            let word = machine.read_word(ea)?;
            machine.registers.set_gpr(r, word);
        }
        Opcode::Str => machine.write_word(ea, value)?,
        Opcode::Lda => machine.registers.set_gpr(r, ea),
        Opcode::Amr => {
            let word = machine.read_word(ea)?;
            let wide = i64::from(to_signed(value)) + i64::from(to_signed(word));
            let result = add_result(&mut machine.registers, wide);
            machine.registers.set_gpr(r, result);
        }
        Opcode::Smr => {
            let word = machine.read_word(ea)?;
            let wide = i64::from(to_signed(value)) - i64::from(to_signed(word));
            let result = subtract_result(&mut machine.registers, wide);
            machine.registers.set_gpr(r, result);
        }
        Opcode::Jz if value == 0 => jump(machine, ea)?,
        Opcode::Jne if value != 0 => jump(machine, ea)?,
        Opcode::Jcc if machine.registers.condition(ConditionBit::from_selector(r)) => {
            jump(machine, ea)?;
        }
        Opcode::Jma => jump(machine, ea)?,
        Opcode::Jsr => {
            let target = jump_target(ea)?;
            let link = machine.registers.pc();
            machine.registers.set_gpr(GeneralRegister::R3, link);
            machine.registers.set_pc(target);
        }
        Opcode::Sob => {
            let decremented = value.wrapping_sub(1);
            machine.registers.set_gpr(r, decremented);
            if to_signed(decremented) > 0 {
                jump(machine, ea)?;
            }
        }
        Opcode::Jge if to_signed(value) >= 0 => jump(machine, ea)?,
        _ => {}
    }
    Ok(())
}

fn execute_index_memory(
    machine: &mut Machine,
    op: Opcode,
    x: IndexRegister,
    operand: AddressOperand,
) -> Result<(), MachineFault> {
    let ea = compute_effective_address(machine, operand)?;
    match op {
        Opcode::Ldx => {
            let word = machine.read_word(ea)?;
            machine.registers.set_ixr(x, word);
        }
        _ => {
            let value = machine.registers.ixr(x);
            machine.write_word(ea, value)?;
        }
    }
    Ok(())
}

fn execute_immediate(machine: &mut Machine, op: Opcode, r: GeneralRegister, immediate: i32) {
    let current = i64::from(to_signed(machine.registers.gpr(r)));
    let result = if op == Opcode::Sir {
        subtract_result(&mut machine.registers, current - i64::from(immediate))
    } else {
        add_result(&mut machine.registers, current + i64::from(immediate))
    };
    machine.registers.set_gpr(r, result);
}

fn execute_register_pair(
    machine: &mut Machine,
    op: Opcode,
    rx: GeneralRegister,
    ry: GeneralRegister,
) {
    let regs = &mut machine.registers;
    let x = regs.gpr(rx);
    let y = regs.gpr(ry);

    match op {
        Opcode::Mlt => {
            let product = i64::from(to_signed(x)) * i64::from(to_signed(y));
            let (high, low) = multiply_result(regs, product);
            regs.set_gpr(rx, high);
            if let Some(pair) = rx.pair() {
                regs.set_gpr(pair, low);
            }
        }
        Opcode::Dvd => {
            if y == 0 {
                regs.set_condition(ConditionBit::DivZero, true);
                return;
            }
            regs.set_condition(ConditionBit::DivZero, false);
            let dividend = i32::from(to_signed(x));
            let divisor = i32::from(to_signed(y));
            // -32768 / -1 is the only quotient outside the signed range.
            let quotient = dividend / divisor;
            let remainder = dividend % divisor;
            regs.set_condition(ConditionBit::Overflow, quotient > i32::from(i16::MAX));
            regs.set_gpr(rx, truncate(i64::from(quotient)));
            if let Some(pair) = rx.pair() {
                regs.set_gpr(pair, truncate(i64::from(remainder)));
            }
        }
        Opcode::Trr => regs.set_condition(ConditionBit::Equal, x == y),
        Opcode::And => regs.set_gpr(rx, x & y),
        Opcode::Orr => regs.set_gpr(rx, x | y),
        _ => {}
    }
}

fn execute_shift(
    machine: &mut Machine,
    op: Opcode,
    r: GeneralRegister,
    count: u8,
    left: bool,
    arithmetic: bool,
) {
    let value = machine.registers.gpr(r);
    let count = u32::from(count);
    let result = match (op, left) {
        (Opcode::Rrc, true) => value.rotate_left(count),
        (Opcode::Rrc, false) => value.rotate_right(count),
        (_, true) => value << count,
        (_, false) if arithmetic => (to_signed(value) >> count) as u16,
        (_, false) => value >> count,
    };
    machine.registers.set_gpr(r, result);
}

fn execute_io(machine: &mut Machine, op: Opcode, r: GeneralRegister, device: u8) -> ExecuteOutcome {
    match op {
        Opcode::In => match machine.devices.input(device) {
            DeviceInput::Ready(value) => machine.registers.set_gpr(r, value),
            DeviceInput::Pending => {
                let pc = machine.registers.pc();
                machine.registers.set_pc(pc.wrapping_sub(1));
                return ExecuteOutcome::WaitForInput;
            }
        },
        Opcode::Out => {
            let value = machine.registers.gpr(r);
            machine.devices.output(device, value);
        }
        _ => {
            let status = machine.devices.status(device);
            machine.registers.set_gpr(r, status);
        }
    }
    ExecuteOutcome::Continue
}

fn execute_trap(machine: &mut Machine) -> Result<(), MachineFault> {
    let return_pc = machine.registers.pc();
    machine.write_word(SAVED_PC_ADDR, return_pc)?;
    let handler = machine.read_word(TRAP_VECTOR_ADDR)?;
    jump(machine, handler)
}

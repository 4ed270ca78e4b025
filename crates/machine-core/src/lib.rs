//! Core of the sixteen-bit teaching computer: memory, cache, registers,
//! decoder, execute unit, I/O devices and the operator-console interface.

/// Architectural fault codes.
pub mod fault;
pub use fault::MachineFault;

/// Word-level bit helpers and display formatting.
pub mod word;
pub use word::{format_binary, format_octal, sign_extend};

/// Main memory and reserved low addresses.
pub mod memory;
pub use memory::{
    validate_address, Memory, ReservedSlot, FAULT_VECTOR_ADDR, MEMORY_WORDS, SAVED_PC_ADDR,
    TRAP_VECTOR_ADDR,
};

/// Sixteen-line FIFO cache in front of memory.
pub mod cache;
pub use cache::{Cache, CacheInvariantError, CacheLineView, CACHE_LINES};

/// Register file and execution state.
pub mod state;
pub use state::{ConditionBit, GeneralRegister, IndexRegister, RegisterFile, RunState};

/// Opcode table and instruction field encoders.
pub mod encoding;
pub use encoding::{InstructionFormat, Opcode, OPCODE_TABLE};

/// Instruction decoder and disassembly.
pub mod decoder;
pub use decoder::{AddressOperand, DecodedInstruction, Decoder};

/// Instruction execution.
pub mod execute;
pub use execute::{execute_instruction, ExecuteOutcome};

/// Keyboard, printer and file reader.
pub mod peripherals;
pub use peripherals::{paragraph_code_points, parse_keyboard_input, DeviceBus, InputError};

/// Load-file parsing.
pub mod loader;
pub use loader::{parse_load_file, LoadError, LoadRecord};

/// Operator-console interface.
pub mod api;
pub use api::{
    AddressError, Machine, MachineConfig, MachineSnapshot, RunOutcome, StepOutcome, StopReason,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

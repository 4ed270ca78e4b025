//! CPU register file and execution state.

/// Register file types and storage model.
pub mod registers;
/// Host-observable execution state machine.
pub mod run_state;

pub use registers::{
    ConditionBit, GeneralRegister, IndexRegister, RegisterFile, CC_DIVZERO, CC_EQUAL, CC_OVERFLOW,
    CC_UNDERFLOW, GENERAL_REGISTER_COUNT, INDEX_REGISTER_COUNT,
};
pub use run_state::RunState;

//! Fixed low-memory map with architectural roles.

/// Number of addressable words.
pub const MEMORY_WORDS: usize = 2048;

/// Holds the `PC` loaded by `TRAP`.
pub const TRAP_VECTOR_ADDR: u16 = 0;

/// Entry point of the machine-fault handler.
pub const FAULT_VECTOR_ADDR: u16 = 1;

/// Receives the `PC` at the moment of a trap or fault.
pub const SAVED_PC_ADDR: u16 = 2;

/// Reserved low-memory slots and their addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedSlot {
    /// Address 0: trap vector.
    TrapVector,
    /// Address 1: fault vector.
    FaultVector,
    /// Address 2: saved program counter.
    SavedPc,
}

impl ReservedSlot {
    /// All slots in address order.
    pub const ALL: [Self; 3] = [Self::TrapVector, Self::FaultVector, Self::SavedPc];

    /// Short operator-panel label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TrapVector => "TRAP",
            Self::FaultVector => "FAULT",
            Self::SavedPc => "SAVED PC",
        }
    }

    /// Returns the memory address of this slot.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::TrapVector => TRAP_VECTOR_ADDR,
            Self::FaultVector => FAULT_VECTOR_ADDR,
            Self::SavedPc => SAVED_PC_ADDR,
        }
    }

    /// Returns the reserved slot at `addr`, if any.
    #[must_use]
    pub const fn at(addr: u16) -> Option<Self> {
        match addr {
            TRAP_VECTOR_ADDR => Some(Self::TrapVector),
            FAULT_VECTOR_ADDR => Some(Self::FaultVector),
            SAVED_PC_ADDR => Some(Self::SavedPc),
            _ => None,
        }
    }
}

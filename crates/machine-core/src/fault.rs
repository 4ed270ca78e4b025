use thiserror::Error;

/// Architectural machine faults, stored by code in `MFR`.
///
/// Raising any of these latches the machine: `MFR` receives the code, the
/// faulting `PC` is saved at [`crate::SAVED_PC_ADDR`] and control moves to
/// [`crate::FAULT_VECTOR_ADDR`]. Only a reset clears the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum MachineFault {
    /// Memory access or fetch outside `0..2048`.
    #[error("illegal memory address")]
    IllegalMemoryAddress = 1,
    /// `TRAP` executed with non-zero reserved bits.
    #[error("illegal trap code")]
    IllegalTrapCode = 2,
    /// Reserved in the fault table; `TRAP` vectors through memory instead.
    #[error("trap executed")]
    TrapExecuted = 3,
    /// Opcode not in the instruction set, or an invalid register field.
    #[error("illegal operation code")]
    IllegalOperationCode = 4,
}

impl MachineFault {
    /// Converts a fault to the 4-bit value stored in `MFR`.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts an `MFR` value back into a fault.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::IllegalMemoryAddress),
            2 => Some(Self::IllegalTrapCode),
            3 => Some(Self::TrapExecuted),
            4 => Some(Self::IllegalOperationCode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MachineFault;

    #[test]
    fn stable_code_roundtrip_is_bijective_for_defined_values() {
        for code in 1u8..=4 {
            let fault = MachineFault::from_u8(code).expect("defined fault code");
            assert_eq!(fault.as_u8(), code);
        }
    }

    #[test]
    fn zero_and_unknown_codes_are_rejected() {
        assert!(MachineFault::from_u8(0).is_none());
        assert!(MachineFault::from_u8(5).is_none());
        assert!(MachineFault::from_u8(0xF).is_none());
    }

    #[test]
    fn display_names_the_fault() {
        assert_eq!(
            MachineFault::IllegalMemoryAddress.to_string(),
            "illegal memory address"
        );
        assert_eq!(
            MachineFault::IllegalOperationCode.to_string(),
            "illegal operation code"
        );
    }
}

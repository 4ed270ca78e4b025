use crate::MachineFault;

/// Execution state observed by the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Idle,
    /// Inside [`crate::Machine::run`].
    Running,
    /// Suspended on `IN` from the keyboard until a value is submitted.
    WaitingForInput,
    /// `HLT` executed; no progress until reset.
    Halted,
    /// Fault latched in `MFR`; no progress until reset.
    FaultLatched(MachineFault),
}

impl RunState {
    /// Returns the latched fault, if any.
    #[must_use]
    pub const fn latched_fault(self) -> Option<MachineFault> {
        match self {
            Self::FaultLatched(fault) => Some(fault),
            Self::Idle | Self::Running | Self::WaitingForInput | Self::Halted => None,
        }
    }

    /// Returns `true` when only a reset can resume execution.
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        matches!(self, Self::Halted | Self::FaultLatched(_))
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::MachineFault;

    #[test]
    fn run_state_default_is_idle() {
        assert_eq!(RunState::default(), RunState::Idle);
    }

    #[test]
    fn latched_fault_accessor_reports_only_fault_latched_variant() {
        assert_eq!(RunState::Idle.latched_fault(), None);
        assert_eq!(RunState::Halted.latched_fault(), None);
        assert_eq!(RunState::WaitingForInput.latched_fault(), None);
        assert_eq!(
            RunState::FaultLatched(MachineFault::IllegalOperationCode).latched_fault(),
            Some(MachineFault::IllegalOperationCode)
        );
    }

    #[test]
    fn halt_and_fault_are_sticky_states() {
        assert!(RunState::Halted.is_stopped());
        assert!(RunState::FaultLatched(MachineFault::IllegalMemoryAddress).is_stopped());
        assert!(!RunState::WaitingForInput.is_stopped());
        assert!(!RunState::Running.is_stopped());
    }
}

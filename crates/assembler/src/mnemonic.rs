//! Mnemonic resolution against the machine's opcode table.
//!
//! Instruction mnemonics come straight from [`machine_core::OPCODE_TABLE`]
//! so the assembler and the decoder cannot disagree. The two directives are
//! the only names defined here.

use machine_core::Opcode;

const LOC_DIRECTIVE: &str = "LOC";
const DATA_DIRECTIVE: &str = "DATA";

/// What a mnemonic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    /// `LOC n`: set the location counter.
    Loc,
    /// `DATA x`: emit one word.
    Data,
    /// A machine instruction.
    Instruction(Opcode),
}

impl Mnemonic {
    /// Canonical upper-case spelling.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Loc => LOC_DIRECTIVE,
            Self::Data => DATA_DIRECTIVE,
            Self::Instruction(op) => op.mnemonic(),
        }
    }

    /// Whether this line occupies a word in memory.
    #[must_use]
    pub const fn emits_word(self) -> bool {
        !matches!(self, Self::Loc)
    }
}

/// Resolves a mnemonic, ignoring ASCII case.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<Mnemonic> {
    if name.eq_ignore_ascii_case(LOC_DIRECTIVE) {
        return Some(Mnemonic::Loc);
    }
    if name.eq_ignore_ascii_case(DATA_DIRECTIVE) {
        return Some(Mnemonic::Data);
    }
    Opcode::from_mnemonic(name).map(Mnemonic::Instruction)
}

#[cfg(test)]
mod tests {
    use machine_core::{Opcode, OPCODE_TABLE};
    use rstest::rstest;

    use super::{resolve_mnemonic, Mnemonic};

    #[test]
    fn every_table_mnemonic_resolves_to_its_opcode() {
        for (op, name, _) in OPCODE_TABLE {
            assert_eq!(resolve_mnemonic(name), Some(Mnemonic::Instruction(*op)));
        }
    }

    #[rstest]
    #[case("loc", Some(Mnemonic::Loc))]
    #[case("Data", Some(Mnemonic::Data))]
    #[case("ldr", Some(Mnemonic::Instruction(Opcode::Ldr)))]
    #[case("HlT", Some(Mnemonic::Instruction(Opcode::Hlt)))]
    #[case("MOV", None)]
    #[case("", None)]
    fn resolution_ignores_case(#[case] name: &str, #[case] want: Option<Mnemonic>) {
        assert_eq!(resolve_mnemonic(name), want);
    }

    #[test]
    fn only_loc_does_not_emit() {
        assert!(!Mnemonic::Loc.emits_word());
        assert!(Mnemonic::Data.emits_word());
        assert!(Mnemonic::Instruction(Opcode::Hlt).emits_word());
    }

    #[test]
    fn names_are_canonical() {
        assert_eq!(Mnemonic::Loc.name(), "LOC");
        assert_eq!(Mnemonic::Instruction(Opcode::Jsr).name(), "JSR");
    }
}

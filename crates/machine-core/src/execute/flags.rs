//! Condition-code updates. Each helper sets or clears only the bits its
//! instruction owns and returns the truncated 16-bit result.

use crate::state::{ConditionBit, RegisterFile};
use crate::word::{fits_signed, truncate, SIGNED_MAX, SIGNED_MIN};

/// `AMR`/`AIR`: owns OVERFLOW.
pub fn add_result(regs: &mut RegisterFile, wide: i64) -> u16 {
    regs.set_condition(ConditionBit::Overflow, !fits_signed(wide));
    truncate(wide)
}

/// `SMR`/`SIR`: owns UNDERFLOW (below the signed range) and OVERFLOW
/// (above it).
pub fn subtract_result(regs: &mut RegisterFile, wide: i64) -> u16 {
    regs.set_condition(ConditionBit::Underflow, wide < SIGNED_MIN);
    regs.set_condition(ConditionBit::Overflow, wide > SIGNED_MAX);
    truncate(wide)
}

/// `MLT`: owns OVERFLOW when the product leaves the signed 32-bit range.
/// Returns `(high, low)` words.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn multiply_result(regs: &mut RegisterFile, product: i64) -> (u16, u16) {
    let fits = i32::try_from(product).is_ok();
    regs.set_condition(ConditionBit::Overflow, !fits);
    let bits = product as u32;
    ((bits >> 16) as u16, bits as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CC_DIVZERO, CC_EQUAL, CC_OVERFLOW, CC_UNDERFLOW};

    #[test]
    fn add_sets_and_clears_overflow_only() {
        let mut regs = RegisterFile::default();
        regs.set_cc(CC_EQUAL | CC_DIVZERO);

        assert_eq!(add_result(&mut regs, 32768), 0x8000);
        assert_eq!(regs.cc(), CC_EQUAL | CC_DIVZERO | CC_OVERFLOW);

        assert_eq!(add_result(&mut regs, -5), 0xFFFB);
        assert_eq!(regs.cc(), CC_EQUAL | CC_DIVZERO);
    }

    #[test]
    fn subtract_distinguishes_underflow_from_overflow() {
        let mut regs = RegisterFile::default();
        assert_eq!(subtract_result(&mut regs, -32769), 0x7FFF);
        assert_eq!(regs.cc(), CC_UNDERFLOW);

        assert_eq!(subtract_result(&mut regs, 32768), 0x8000);
        assert_eq!(regs.cc(), CC_OVERFLOW);

        subtract_result(&mut regs, 0);
        assert_eq!(regs.cc(), 0);
    }

    #[test]
    fn multiply_splits_product_into_high_and_low_words() {
        let mut regs = RegisterFile::default();
        assert_eq!(multiply_result(&mut regs, 0x0001_2345), (0x0001, 0x2345));
        assert_eq!(multiply_result(&mut regs, -1), (0xFFFF, 0xFFFF));
        assert_eq!(regs.cc(), 0);

        multiply_result(&mut regs, 1 << 31);
        assert_eq!(regs.cc(), CC_OVERFLOW);
    }
}

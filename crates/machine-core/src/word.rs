//! Word-level bit helpers: masking, sign extension, and display formatting.

/// Width of a machine word in bits.
pub const WORD_BITS: u32 = 16;

/// Mask selecting the 16 bits of a machine word.
pub const WORD_MASK: i64 = 0xFFFF;

/// Smallest signed value a word can hold.
pub const SIGNED_MIN: i64 = i16::MIN as i64;

/// Largest signed value a word can hold.
pub const SIGNED_MAX: i64 = i16::MAX as i64;

/// Sign-extends the low `bits` bits of `value` to a signed integer.
#[must_use]
pub const fn sign_extend(value: u16, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value as i32) << shift) >> shift
}

/// Interprets a word as a two's-complement signed value.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn to_signed(word: u16) -> i16 {
    word as i16
}

/// Truncates a wide arithmetic result to a 16-bit word.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn truncate(value: i64) -> u16 {
    (value & WORD_MASK) as u16
}

/// Returns `true` when `value` fits in a signed 16-bit word.
#[must_use]
pub const fn fits_signed(value: i64) -> bool {
    value >= SIGNED_MIN && value <= SIGNED_MAX
}

/// Formats a word as six-digit octal with leading zeros.
#[must_use]
pub fn format_octal(word: u16) -> String {
    format!("{word:06o}")
}

/// Formats a word as sixteen binary digits, most significant first.
#[must_use]
pub fn format_binary(word: u16) -> String {
    format!("{word:016b}")
}

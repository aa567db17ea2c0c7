//! Big-endian conversion between character-code byte strings and integers.
//!
//! Codes are at most four bytes long, so they always fit in a `u32`. The byte
//! length travels next to the value: `<00 41>` and `<41>` share the value 0x41
//! but belong to different codespaces.

use crate::cmap_section::{CodeLen, SourceCode};

/// Longest character code a CMap may declare.
pub const MAX_CODE_LEN: usize = 4;

/// `value = Σ byte[i] << (8 * (n - 1 - i))`.
///
/// Input longer than [`MAX_CODE_LEN`] keeps its last four bytes.
pub fn bytes_to_code(bytes: &[u8]) -> SourceCode {
    bytes.iter().fold(0, |code, &byte| (code << 8) | SourceCode::from(byte))
}

/// Fixed width, zero padded, most significant byte first.
pub fn code_to_bytes(code: SourceCode, len: CodeLen) -> Vec<u8> {
    debug_assert!(len as usize <= MAX_CODE_LEN);
    let bytes = code.to_be_bytes();
    bytes[MAX_CODE_LEN - len as usize..].to_vec()
}

/// Smallest number of bytes able to hold `code`, at least one.
pub fn code_len(code: SourceCode) -> CodeLen {
    match code {
        0..=0xff => 1,
        0x100..=0xffff => 2,
        0x1_0000..=0xff_ffff => 3,
        _ => 4,
    }
}

/// Big-endian pairs of bytes to UTF-16 code units. A trailing odd byte becomes
/// a unit of its own.
pub fn bytes_to_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|chunk| chunk.iter().fold(0, |unit, &byte| (unit << 8) | u16::from(byte)))
        .collect()
}

pub fn units_to_bytes(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|unit| unit.to_be_bytes()).collect()
}

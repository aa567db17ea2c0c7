//! The Type 1 font cipher.
//!
//! `eexec` sections and individual charstrings are both encrypted with the
//! same byte-wise cipher, seeded with different keys. The first `lenIV`
//! plaintext bytes (4 unless the font says otherwise) are random filler.

/// Seed for the `eexec` encrypted part of a font program.
pub const EEXEC_KEY: u16 = 55665;
/// Seed for charstrings and subroutines.
pub const CHARSTRING_KEY: u16 = 4330;

const C1: u16 = 52845;
const C2: u16 = 22719;

/// Decrypts `input` with the seed `key` and drops the first `skip` plaintext
/// bytes. Input shorter than `skip` yields an empty vector.
pub fn decrypt<Input>(input: Input, key: u16, skip: usize) -> Vec<u8>
where
    Input: AsRef<[u8]>,
{
    let mut r = key;
    input
        .as_ref()
        .iter()
        .map(|&cipher| {
            let plain = cipher ^ (r >> 8) as u8;
            r = u16::from(cipher).wrapping_add(r).wrapping_mul(C1).wrapping_add(C2);
            plain
        })
        .skip(skip)
        .collect()
}

/// Encrypts `input` with the seed `key`, preceded by `skip` zero filler
/// bytes, so that `decrypt(encrypt(x, key, n), key, n) == x`.
pub fn encrypt<Input>(input: Input, key: u16, skip: usize) -> Vec<u8>
where
    Input: AsRef<[u8]>,
{
    let mut r = key;
    std::iter::repeat_n(&0u8, skip)
        .chain(input.as_ref())
        .map(|&plain| {
            let cipher = plain ^ (r >> 8) as u8;
            r = u16::from(cipher).wrapping_add(r).wrapping_mul(C1).wrapping_add(C2);
            cipher
        })
        .collect()
}

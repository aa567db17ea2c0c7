//! Range types a CMap is assembled from.
//!
//! Every range covers a contiguous block of same-length character codes.
//! Single-code entries (`cidchar`, `bfchar`) are kept as their own types for
//! the builder API but are stored as degenerate ranges with `start == end`.

use crate::cmap_section::{Cid, CodeLen, SourceCode};
use crate::codec::{MAX_CODE_LEN, bytes_to_code, code_to_bytes};
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Codespace segment: codes of exactly `n_bytes` bytes in `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCodeRange"))]
pub struct CodeRange {
    start: SourceCode,
    end: SourceCode,
    n_bytes: CodeLen,
}

/// Deserialized fields of a [`CodeRange`], validated by [`CodeRange::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawCodeRange {
    start: SourceCode,
    end: SourceCode,
    n_bytes: CodeLen,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCodeRange> for CodeRange {
    type Error = Error;

    fn try_from(raw: RawCodeRange) -> Result<CodeRange> {
        CodeRange::new(raw.start, raw.end, raw.n_bytes)
    }
}

impl CodeRange {
    /// Every two-byte code, the codespace of the Identity CMaps.
    pub const TWO_BYTE: CodeRange = CodeRange {
        start: 0x0000,
        end: 0xffff,
        n_bytes: 2,
    };

    pub fn new(start: SourceCode, end: SourceCode, n_bytes: CodeLen) -> Result<CodeRange> {
        if n_bytes == 0 || n_bytes as usize > MAX_CODE_LEN {
            return Err(Error::InvalidCodeRange(format!(
                "code length should be between 1 and 4 bytes, got {n_bytes}"
            )));
        }
        if n_bytes < 4 && end >> (8 * n_bytes as u32) != 0 {
            return Err(Error::InvalidCodeRange(format!(
                "<{end:X}> does not fit in {n_bytes} bytes"
            )));
        }
        if end < start {
            return Err(Error::InvalidCodeRange(format!("<{start:X}> is above <{end:X}>")));
        }
        Ok(CodeRange { start, end, n_bytes })
    }

    /// Range between two codes given as byte strings of equal length.
    pub fn from_bytes(start: &[u8], end: &[u8]) -> Result<CodeRange> {
        if start.len() != end.len() {
            return Err(Error::InvalidCodeRange(format!(
                "range bounds have different lengths ({} and {} bytes)",
                start.len(),
                end.len()
            )));
        }
        if start.len() > MAX_CODE_LEN {
            return Err(Error::InvalidCodeRange(format!(
                "code length should be between 1 and 4 bytes, got {}",
                start.len()
            )));
        }
        CodeRange::new(bytes_to_code(start), bytes_to_code(end), start.len() as CodeLen)
    }

    pub fn single(code: SourceCode, n_bytes: CodeLen) -> Result<CodeRange> {
        CodeRange::new(code, code, n_bytes)
    }

    pub fn start(&self) -> SourceCode {
        self.start
    }

    pub fn end(&self) -> SourceCode {
        self.end
    }

    pub fn n_bytes(&self) -> CodeLen {
        self.n_bytes
    }

    /// Number of codes in the range minus one.
    pub fn span(&self) -> u32 {
        self.end - self.start
    }

    pub fn contains(&self, code: SourceCode) -> bool {
        self.start <= code && code <= self.end
    }

    /// Whether the leading `n_bytes` of `input` form a code inside this range.
    pub fn matches(&self, input: &[u8]) -> bool {
        let n = self.n_bytes as usize;
        input.len() >= n && self.contains(bytes_to_code(&input[..n]))
    }

    pub fn start_bytes(&self) -> Vec<u8> {
        code_to_bytes(self.start, self.n_bytes)
    }

    pub fn end_bytes(&self) -> Vec<u8> {
        code_to_bytes(self.end, self.n_bytes)
    }

    /// Bounds of this range extended to `n_bytes`: a zero byte appended to the
    /// start and an 0xFF byte to the end per missing byte.
    fn widened(&self, n_bytes: CodeLen) -> (SourceCode, SourceCode) {
        let mut start = self.start;
        let mut end = self.end;
        for _ in self.n_bytes..n_bytes {
            start <<= 8;
            end = (end << 8) | 0xff;
        }
        (start, end)
    }

    /// Evaluation order of codespace ranges.
    ///
    /// Ranges of one length sort by descending start, then ascending end. A
    /// shorter range is compared as if widened to the longer one's length.
    /// Ranges still equal after widening put the longer one first.
    pub fn codespace_cmp(&self, other: &CodeRange) -> Ordering {
        let width = self.n_bytes.max(other.n_bytes);
        let (a_start, a_end) = self.widened(width);
        let (b_start, b_end) = other.widened(width);
        b_start
            .cmp(&a_start)
            .then(a_end.cmp(&b_end))
            .then(other.n_bytes.cmp(&self.n_bytes))
    }
}

/// Codes in a range map to consecutive CIDs starting at `cid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CidRange {
    codes: CodeRange,
    cid: Cid,
}

impl CidRange {
    pub fn new(codes: CodeRange, cid: Cid) -> CidRange {
        CidRange { codes, cid }
    }

    pub fn codes(&self) -> &CodeRange {
        &self.codes
    }

    pub fn base_cid(&self) -> Cid {
        self.cid
    }

    pub fn last_cid(&self) -> Cid {
        self.cid.saturating_add(self.codes.span())
    }

    /// Applies to codes of exactly this range's length.
    pub fn contains(&self, code: SourceCode, n_bytes: CodeLen) -> bool {
        self.codes.n_bytes == n_bytes && self.codes.contains(code)
    }

    pub fn contains_cid(&self, cid: Cid) -> bool {
        self.cid <= cid && cid <= self.last_cid()
    }

    pub fn cid_for(&self, code: SourceCode) -> Cid {
        self.cid.wrapping_add(code - self.codes.start)
    }

    pub fn code_for(&self, cid: Cid) -> SourceCode {
        cid.wrapping_add(self.codes.start).wrapping_sub(self.cid)
    }
}

/// A single code mapped to a CID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CidChar {
    code: CodeRange,
    cid: Cid,
}

impl CidChar {
    pub fn new(code: SourceCode, n_bytes: CodeLen, cid: Cid) -> Result<CidChar> {
        Ok(CidChar {
            code: CodeRange::single(code, n_bytes)?,
            cid,
        })
    }

    pub fn from_bytes(code: &[u8], cid: Cid) -> Result<CidChar> {
        Ok(CidChar {
            code: CodeRange::from_bytes(code, code)?,
            cid,
        })
    }

    pub fn code(&self) -> SourceCode {
        self.code.start
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }
}

impl From<CidChar> for CidRange {
    fn from(ch: CidChar) -> CidRange {
        CidRange::new(ch.code, ch.cid)
    }
}

/// What a range of codes maps to in a ToUnicode or bf CMap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CharTarget {
    /// UTF-16 code units; the last unit is incremented across the range.
    Unicode(Vec<u16>),
    /// A glyph name. Only meaningful for a single code.
    Name(String),
}

/// Codes in a range map to `base` with its last code unit advanced by the
/// code's offset in the range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharRange {
    codes: CodeRange,
    target: CharTarget,
}

impl CharRange {
    pub fn new(codes: CodeRange, target: CharTarget) -> CharRange {
        CharRange { codes, target }
    }

    pub fn codes(&self) -> &CodeRange {
        &self.codes
    }

    pub fn target(&self) -> &CharTarget {
        &self.target
    }

    /// Applies to codes no longer than this range's length.
    pub fn contains(&self, code: SourceCode, n_bytes: CodeLen) -> bool {
        self.codes.n_bytes >= n_bytes && self.codes.contains(code)
    }

    pub fn unicode_for(&self, code: SourceCode) -> Result<Vec<u16>> {
        match &self.target {
            CharTarget::Unicode(base) => Ok(advance_last_unit(base, code - self.codes.start)),
            CharTarget::Name(_) => Err(Error::UnsupportedMapping("named character target has no Unicode value")),
        }
    }

    /// First and last Unicode sequence of an arithmetic range.
    pub fn unicode_bounds(&self) -> Option<(Vec<u16>, Vec<u16>)> {
        match &self.target {
            CharTarget::Unicode(base) => Some((base.clone(), advance_last_unit(base, self.codes.span()))),
            CharTarget::Name(_) => None,
        }
    }
}

/// A single code mapped to a Unicode sequence or a glyph name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharToCharMap {
    code: CodeRange,
    target: CharTarget,
}

impl CharToCharMap {
    pub fn new(code: SourceCode, n_bytes: CodeLen, target: CharTarget) -> Result<CharToCharMap> {
        Ok(CharToCharMap {
            code: CodeRange::single(code, n_bytes)?,
            target,
        })
    }

    pub fn from_bytes(code: &[u8], target: CharTarget) -> Result<CharToCharMap> {
        Ok(CharToCharMap {
            code: CodeRange::from_bytes(code, code)?,
            target,
        })
    }

    pub fn code(&self) -> SourceCode {
        self.code.start
    }

    pub fn target(&self) -> &CharTarget {
        &self.target
    }
}

impl From<CharToCharMap> for CharRange {
    fn from(map: CharToCharMap) -> CharRange {
        CharRange::new(map.code, map.target)
    }
}

// No overflow check: a range crossing a 16-bit boundary wraps.
fn advance_last_unit(base: &[u16], offset: u32) -> Vec<u16> {
    let mut units = base.to_vec();
    match units.last_mut() {
        Some(last) => *last = last.wrapping_add(offset as u16),
        None => units.push(offset as u16),
    }
    units
}

/// Compare two unit sequences as big-endian numbers, the shorter one
/// zero-extended on the high side.
pub(crate) fn cmp_units(a: &[u16], b: &[u16]) -> Ordering {
    let width = a.len().max(b.len());
    let unit_at = |seq: &[u16], i: usize| {
        let pad = width - seq.len();
        if i < pad { 0 } else { seq[i - pad] }
    };
    (0..width)
        .map(|i| unit_at(a, i).cmp(&unit_at(b, i)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Integer value of the last two units of a sequence.
pub(crate) fn units_to_u32(units: &[u16]) -> u32 {
    units[units.len().saturating_sub(2)..]
        .iter()
        .fold(0, |acc, &unit| (acc << 16) | u32::from(unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: SourceCode, end: SourceCode, n_bytes: CodeLen) -> CodeRange {
        CodeRange::new(start, end, n_bytes).unwrap()
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(CodeRange::new(0, 1, 0).is_err());
        assert!(CodeRange::new(0, 1, 5).is_err());
        assert!(CodeRange::new(2, 1, 1).is_err());
        assert!(CodeRange::new(0, 0x100, 1).is_err());
        assert!(CodeRange::from_bytes(&[0x00], &[0x00, 0xff]).is_err());
        assert!(CodeRange::new(0, u32::MAX, 4).is_ok());
    }

    #[test]
    fn same_length_orders_by_descending_start_then_ascending_end() {
        let low = range(0x00, 0x7f, 1);
        let high = range(0x80, 0xff, 1);
        let high_narrow = range(0x80, 0x9f, 1);
        assert_eq!(high.codespace_cmp(&low), Ordering::Less);
        assert_eq!(high_narrow.codespace_cmp(&high), Ordering::Less);
        assert_eq!(low.codespace_cmp(&low), Ordering::Equal);
    }

    #[test]
    fn shorter_range_is_widened() {
        let single = range(0x00, 0x80, 1);
        let double = range(0x8140, 0x9ffc, 2);
        // <00>..<80> widens to <0000>..<80FF>
        assert_eq!(double.codespace_cmp(&single), Ordering::Less);
        assert_eq!(single.codespace_cmp(&double), Ordering::Greater);

        let single_high = range(0xa1, 0xdf, 1);
        // <A100> sorts above <8140>
        assert_eq!(single_high.codespace_cmp(&double), Ordering::Less);
    }

    #[test]
    fn widened_tie_puts_longer_first() {
        let single = range(0x00, 0xff, 1);
        let double = range(0x0000, 0xffff, 2);
        assert_eq!(double.codespace_cmp(&single), Ordering::Less);
        assert_eq!(single.codespace_cmp(&double), Ordering::Greater);
    }

    #[test]
    fn matches_reads_leading_bytes() {
        let double = range(0x8000, 0xffff, 2);
        assert!(double.matches(&[0x80, 0x50, 0x41]));
        assert!(!double.matches(&[0x80]));
        assert!(!double.matches(&[0x41, 0x80]));
    }

    #[test]
    fn cid_range_is_linear() {
        let cids = CidRange::new(range(0x8000, 0x80ff, 2), 1);
        assert!(cids.contains(0x8050, 2));
        assert!(!cids.contains(0x8050, 3));
        assert_eq!(cids.cid_for(0x8050), 81);
        assert_eq!(cids.last_cid(), 256);
        assert!(cids.contains_cid(256));
        assert!(!cids.contains_cid(0));
        assert_eq!(cids.code_for(81), 0x8050);
    }

    #[test]
    fn cid_char_is_degenerate_range() {
        let ch = CidChar::from_bytes(&[0x00, 0x20], 3).unwrap();
        let as_range = CidRange::from(ch);
        assert_eq!(as_range.codes(), &range(0x20, 0x20, 2));
        assert_eq!(as_range.base_cid(), 3);
    }

    #[test]
    fn char_range_advances_last_unit() {
        let chars = CharRange::new(range(0x10, 0x12, 1), CharTarget::Unicode(vec![0xd83d, 0xde00]));
        assert_eq!(chars.unicode_for(0x11).unwrap(), vec![0xd83d, 0xde01]);
        assert_eq!(
            chars.unicode_bounds(),
            Some((vec![0xd83d, 0xde00], vec![0xd83d, 0xde02]))
        );
        assert!(chars.contains(0x11, 1));
        assert!(!chars.contains(0x11, 2));
    }

    #[test]
    fn named_target_is_unsupported() {
        let named: CharRange = CharToCharMap::new(0x20, 1, CharTarget::Name("space".into()))
            .unwrap()
            .into();
        assert!(matches!(named.unicode_for(0x20), Err(Error::UnsupportedMapping(_))));
        assert_eq!(named.unicode_bounds(), None);
    }

    #[test]
    fn unit_sequences_compare_right_aligned() {
        assert_eq!(cmp_units(&[0x0041], &[0x0000, 0x0041]), Ordering::Equal);
        assert_eq!(cmp_units(&[0x0041], &[0x0001, 0x0000]), Ordering::Less);
        assert_eq!(cmp_units(&[0xd83d, 0xde01], &[0xd83d, 0xde00]), Ordering::Greater);
        assert_eq!(units_to_u32(&[0xd83d, 0xde01]), 0xd83d_de01);
        assert_eq!(units_to_u32(&[0x0042]), 0x42);
    }
}

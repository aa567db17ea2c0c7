use crate::cmap_section::{Cid, CodeLen, SourceCode};
use crate::codec::{bytes_to_code, bytes_to_units, code_to_bytes};
use crate::ranges::{CharRange, CharToCharMap, CidChar, CidRange, CodeRange, cmp_units, units_to_u32};
use crate::{Error, Result};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accumulates the ranges of a CMap while it is being loaded.
///
/// Ranges are appended in program order. Order matters: among overlapping
/// CID and character ranges the one added last wins. [`CodeMapBuilder::build`]
/// freezes the collected ranges into a [`CodeMap`].
#[derive(Debug, Default, Clone)]
pub struct CodeMapBuilder {
    code_ranges: Vec<CodeRange>,
    cid_ranges: Vec<CidRange>,
    ndef_ranges: Vec<CidRange>,
    char_ranges: Vec<CharRange>,
    max_code_length: CodeLen,
}

impl CodeMapBuilder {
    pub fn new() -> CodeMapBuilder {
        CodeMapBuilder::default()
    }

    pub fn add_code_ranges<I>(&mut self, ranges: I) -> &mut Self
    where
        I: IntoIterator<Item = CodeRange>,
    {
        for range in ranges {
            self.max_code_length = self.max_code_length.max(range.n_bytes());
            self.code_ranges.push(range);
        }
        self
    }

    pub fn add_cid_ranges<I>(&mut self, ranges: I) -> &mut Self
    where
        I: IntoIterator<Item = CidRange>,
    {
        self.cid_ranges.extend(ranges);
        self
    }

    pub fn add_cid_chars<I>(&mut self, chars: I) -> &mut Self
    where
        I: IntoIterator<Item = CidChar>,
    {
        self.cid_ranges.extend(chars.into_iter().map(CidRange::from));
        self
    }

    /// Not-def ranges map every code they cover to their base CID.
    pub fn add_notdef_ranges<I>(&mut self, ranges: I) -> &mut Self
    where
        I: IntoIterator<Item = CidRange>,
    {
        self.ndef_ranges.extend(ranges);
        self
    }

    pub fn add_notdef_chars<I>(&mut self, chars: I) -> &mut Self
    where
        I: IntoIterator<Item = CidChar>,
    {
        self.ndef_ranges.extend(chars.into_iter().map(CidRange::from));
        self
    }

    pub fn add_char_ranges<I>(&mut self, ranges: I) -> &mut Self
    where
        I: IntoIterator<Item = CharRange>,
    {
        self.char_ranges.extend(ranges);
        self
    }

    pub fn add_char_maps<I>(&mut self, maps: I) -> &mut Self
    where
        I: IntoIterator<Item = CharToCharMap>,
    {
        self.char_ranges.extend(maps.into_iter().map(CharRange::from));
        self
    }

    /// Append every range of `parent`, as `usecmap` does. Ranges added
    /// afterwards take priority over the inherited ones.
    pub fn extend_from(&mut self, parent: &CodeMap) -> &mut Self {
        self.add_code_ranges(parent.code_ranges.iter().copied());
        self.cid_ranges.extend_from_slice(&parent.cid_ranges);
        self.ndef_ranges.extend_from_slice(&parent.ndef_ranges);
        self.char_ranges.extend_from_slice(&parent.char_ranges);
        self
    }

    pub fn build(self) -> CodeMap {
        let CodeMapBuilder {
            mut code_ranges,
            cid_ranges,
            ndef_ranges,
            char_ranges,
            max_code_length,
        } = self;
        sort_codespace_ranges(&mut code_ranges);
        debug!(
            "CMap built: {} codespace, {} cid, {} notdef, {} char ranges",
            code_ranges.len(),
            cid_ranges.len(),
            ndef_ranges.len(),
            char_ranges.len()
        );
        CodeMap {
            code_ranges,
            cid_ranges,
            ndef_ranges,
            char_ranges,
            max_code_length,
        }
    }
}

/// Put codespace ranges into evaluation order, see [`CodeRange::codespace_cmp`].
pub fn sort_codespace_ranges(ranges: &mut [CodeRange]) {
    ranges.sort_by(CodeRange::codespace_cmp);
}

/// A frozen CMap: codespace plus code to CID and code to Unicode mappings.
///
/// Built once through [`CodeMapBuilder`], then only queried. All lookups take
/// `&self`, so a `CodeMap` can be shared between threads.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodeMap {
    code_ranges: Vec<CodeRange>,
    cid_ranges: Vec<CidRange>,
    ndef_ranges: Vec<CidRange>,
    char_ranges: Vec<CharRange>,
    max_code_length: CodeLen,
}

impl CodeMap {
    pub fn builder() -> CodeMapBuilder {
        CodeMapBuilder::new()
    }

    /// Longest code length of the codespace, 0 when no codespace is declared.
    pub fn max_code_length(&self) -> CodeLen {
        self.max_code_length
    }

    /// Codespace ranges in evaluation order.
    pub fn codespace_ranges(&self) -> &[CodeRange] {
        &self.code_ranges
    }

    pub fn cid_ranges(&self) -> &[CidRange] {
        &self.cid_ranges
    }

    pub fn notdef_ranges(&self) -> &[CidRange] {
        &self.ndef_ranges
    }

    pub fn char_ranges(&self) -> &[CharRange] {
        &self.char_ranges
    }

    /// Number of bytes the code at the start of `input` occupies, taken from
    /// the first codespace range (in evaluation order) that matches.
    pub fn code_length(&self, input: &[u8]) -> Option<CodeLen> {
        self.code_ranges
            .iter()
            .find(|range| range.matches(input))
            .map(CodeRange::n_bytes)
    }

    /// Code read when no codespace range matches: one byte, or with no
    /// codespace at all, the width of the mapping ranges.
    fn fallback_length(&self) -> CodeLen {
        if !self.code_ranges.is_empty() {
            return 1;
        }
        self.cid_ranges
            .iter()
            .chain(self.ndef_ranges.iter())
            .map(|range| range.codes().n_bytes())
            .chain(self.char_ranges.iter().map(|range| range.codes().n_bytes()))
            .max()
            .unwrap_or(1)
    }

    /// Split the code at the start of `input` off the rest.
    pub fn next_code<'a>(&self, input: &'a [u8]) -> Option<((SourceCode, CodeLen), &'a [u8])> {
        if input.is_empty() {
            return None;
        }
        let n_bytes = self.code_length(input).unwrap_or_else(|| {
            let fallback = self.fallback_length();
            trace!("no codespace range matches {:02X?}, reading {fallback} byte(s)", &input[..1]);
            fallback
        });
        let n = (n_bytes as usize).min(input.len());
        let (code, rest) = input.split_at(n);
        Some(((bytes_to_code(code), n as CodeLen), rest))
    }

    /// Iterate over the `(code, length)` pairs of a byte string.
    pub fn codes<'a>(&'a self, input: &'a [u8]) -> Codes<'a> {
        Codes { cmap: self, input }
    }

    /// Code to CID. Later ranges win over earlier ones; codes outside every
    /// CID range fall back to the not-def ranges and finally to CID 0.
    pub fn cid(&self, code: SourceCode, n_bytes: CodeLen) -> Cid {
        if let Some(range) = self.cid_ranges.iter().rev().find(|r| r.contains(code, n_bytes)) {
            return range.cid_for(code);
        }
        if let Some(range) = self.ndef_ranges.iter().rev().find(|r| r.contains(code, n_bytes)) {
            debug!("code <{code:X}> mapped by notdef range to CID {}", range.base_cid());
            return range.base_cid();
        }
        0
    }

    /// CIDs of every code in a byte string.
    pub fn cids<'a>(&'a self, input: &'a [u8]) -> impl Iterator<Item = Cid> + 'a {
        self.codes(input).map(move |(code, n_bytes)| self.cid(code, n_bytes))
    }

    /// Code to UTF-16 code units, `[0]` for unmapped codes.
    pub fn unicode(&self, code: SourceCode, n_bytes: CodeLen) -> Result<Vec<u16>> {
        match self.char_ranges.iter().rev().find(|r| r.contains(code, n_bytes)) {
            Some(range) => range.unicode_for(code),
            None => Ok(vec![0]),
        }
    }

    /// CID to the code that produces it.
    ///
    /// A CMap without CID ranges is treated as an identity map: the CID comes
    /// back as its big-endian bytes, two wide unless it needs four. A CID no
    /// range produces is replaced by CID 0; if 0 has no code either the CMap
    /// is incomplete.
    pub fn encode_cid(&self, cid: Cid) -> Result<Vec<u8>> {
        if self.cid_ranges.is_empty() {
            let width = if cid <= 0xffff { 2 } else { 4 };
            return Ok(code_to_bytes(cid, width));
        }
        let mut candidate = cid;
        loop {
            if let Some(range) = self.cid_ranges.iter().find(|r| r.contains_cid(candidate)) {
                return Ok(code_to_bytes(range.code_for(candidate), range.codes().n_bytes()));
            }
            if candidate == 0 {
                return Err(Error::CMapFallbackExhausted);
            }
            debug!("no code produces CID {candidate}, encoding CID 0 instead");
            candidate = 0;
        }
    }

    /// UTF-16 code units to the code that produces them. Unmapped text is
    /// replaced by the code of U+0000; if that has no code either the CMap is
    /// incomplete.
    pub fn encode_unicode(&self, units: &[u16]) -> Result<Vec<u8>> {
        const NOTDEF: [u16; 1] = [0];

        let mut candidate = units;
        loop {
            if let Some(code) = self.find_unicode(candidate) {
                return Ok(code);
            }
            if candidate == NOTDEF.as_slice() {
                return Err(Error::CMapFallbackExhausted);
            }
            debug!("no code produces {candidate:04X?}, encoding U+0000 instead");
            candidate = &NOTDEF;
        }
    }

    /// [`CodeMap::encode_unicode`] for UTF-16BE bytes.
    pub fn encode_unicode_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        self.encode_unicode(&bytes_to_units(bytes))
    }

    fn find_unicode(&self, units: &[u16]) -> Option<Vec<u8>> {
        self.char_ranges.iter().find_map(|range| {
            let (first, last) = range.unicode_bounds()?;
            if cmp_units(units, &first).is_lt() || cmp_units(units, &last).is_gt() {
                return None;
            }
            let distance = units_to_u32(units).wrapping_sub(units_to_u32(&first));
            let codes = range.codes();
            Some(code_to_bytes(codes.start().wrapping_add(distance), codes.n_bytes()))
        })
    }
}

/// Iterator returned by [`CodeMap::codes`].
#[derive(Debug, Clone)]
pub struct Codes<'a> {
    cmap: &'a CodeMap,
    input: &'a [u8],
}

impl Iterator for Codes<'_> {
    type Item = (SourceCode, CodeLen);

    fn next(&mut self) -> Option<Self::Item> {
        let (code, rest) = self.cmap.next_code(self.input)?;
        self.input = rest;
        Some(code)
    }
}

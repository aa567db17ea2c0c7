/*
A CMap program is read into a list of sections, which are then folded into a
Dictionary the same way a PostScript interpreter would populate the CMap
resource. Each section kind appends to its own array entry, so sections of
the same kind keep their program order.
 */
use crate::codec::code_to_bytes;
use crate::{Dictionary, Object};
use thiserror::Error;

// According to pdf documentation source codes can be of various byte length but they
// should be smaller than integer
pub type SourceCode = u32;
pub type CodeLen = u8;
pub type Cid = u32;
pub(crate) type SourceRange = (SourceCode, SourceCode, CodeLen);
pub(crate) type SourceChar = (SourceCode, CodeLen);

/// Dictionary keys of a CMap resource.
pub mod keys {
    pub const CMAP_TYPE: &[u8] = b"CMapType";
    pub const CMAP_NAME: &[u8] = b"CMapName";
    pub const CMAP_VERSION: &[u8] = b"CMapVersion";
    pub const WMODE: &[u8] = b"WMode";
    pub const CID_SYSTEM_INFO: &[u8] = b"CIDSystemInfo";
    pub const USE_CMAP: &[u8] = b"UseCMap";
    pub const CODESPACE_RANGE: &[u8] = b"CodeSpaceRange";
    pub const CID_RANGE: &[u8] = b"CIDRange";
    pub const CID_CHAR: &[u8] = b"CIDChar";
    pub const NOTDEF_RANGE: &[u8] = b"NotDefRange";
    pub const NOTDEF_CHAR: &[u8] = b"NotDefChar";
    pub const BF_RANGE: &[u8] = b"BFRange";
    pub const BF_CHAR: &[u8] = b"BFChar";
}

/// Destination of a bfchar or bfrange line.
#[derive(Debug, PartialEq, Clone)]
pub enum BfTarget {
    // UTF16-BE bytes, kept raw so a one byte destination survives
    HexString(Vec<u8>),
    Name(Vec<u8>),
    ArrayOfHexStrings(Vec<Vec<u8>>),
}

#[derive(Debug, PartialEq)]
pub enum CMapSection {
    CsRange(Vec<SourceRange>),
    CidRange(Vec<(SourceRange, Cid)>),
    CidChar(Vec<(SourceChar, Cid)>),
    NotDefRange(Vec<(SourceRange, Cid)>),
    NotDefChar(Vec<(SourceChar, Cid)>),
    BfRange(Vec<(SourceRange, BfTarget)>),
    BfChar(Vec<(SourceChar, BfTarget)>),
    /// `/Key value def` inside the CMap dictionary.
    Entry(Vec<u8>, Object),
    UseCMap(Vec<u8>),
}

impl CMapSection {
    /// Codespace and mapping sections, as opposed to dictionary entries.
    pub fn is_mapping(&self) -> bool {
        !matches!(self, CMapSection::Entry(..) | CMapSection::UseCMap(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CMapParseError {
    #[error("unexpected end of CMap program")]
    Incomplete,
    #[error("malformed CMap program")]
    Error,
}

fn code_object(code: SourceCode, len: CodeLen) -> Object {
    Object::hex(code_to_bytes(code, len))
}

fn target_object(target: BfTarget) -> Object {
    match target {
        BfTarget::HexString(bytes) => Object::hex(bytes),
        BfTarget::Name(name) => Object::Name(name),
        BfTarget::ArrayOfHexStrings(strings) => Object::Array(strings.into_iter().map(Object::hex).collect()),
    }
}

fn range_objects(ranges: Vec<(SourceRange, Cid)>) -> Vec<Object> {
    ranges
        .into_iter()
        .flat_map(|((lo, hi, len), cid)| [code_object(lo, len), code_object(hi, len), Object::from(cid)])
        .collect()
}

fn char_objects(chars: Vec<(SourceChar, Cid)>) -> Vec<Object> {
    chars
        .into_iter()
        .flat_map(|((code, len), cid)| [code_object(code, len), Object::from(cid)])
        .collect()
}

/// Fold parsed sections into a CMap resource dictionary.
pub fn into_dictionary(sections: Vec<CMapSection>) -> Dictionary {
    use CMapSection::*;

    let mut dict = Dictionary::new();
    for section in sections {
        match section {
            CsRange(ranges) => {
                let values = ranges
                    .into_iter()
                    .flat_map(|(lo, hi, len)| [code_object(lo, len), code_object(hi, len)])
                    .collect();
                dict.append_to_array(keys::CODESPACE_RANGE, values);
            }
            CidRange(ranges) => dict.append_to_array(keys::CID_RANGE, range_objects(ranges)),
            CidChar(chars) => dict.append_to_array(keys::CID_CHAR, char_objects(chars)),
            NotDefRange(ranges) => dict.append_to_array(keys::NOTDEF_RANGE, range_objects(ranges)),
            NotDefChar(chars) => dict.append_to_array(keys::NOTDEF_CHAR, char_objects(chars)),
            BfRange(ranges) => {
                let values = ranges
                    .into_iter()
                    .flat_map(|((lo, hi, len), target)| {
                        [code_object(lo, len), code_object(hi, len), target_object(target)]
                    })
                    .collect();
                dict.append_to_array(keys::BF_RANGE, values);
            }
            BfChar(chars) => {
                let values = chars
                    .into_iter()
                    .flat_map(|((code, len), target)| [code_object(code, len), target_object(target)])
                    .collect();
                dict.append_to_array(keys::BF_CHAR, values);
            }
            Entry(key, value) => dict.set(key, value),
            UseCMap(name) => dict.set(keys::USE_CMAP, Object::Name(name)),
        }
    }
    dict
}

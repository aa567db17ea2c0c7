use super::subrs::decode_charstring;
use crate::{Dictionary, Result};
use indexmap::IndexMap;

/// Decrypted glyph programs of a Type 1 font, keyed by glyph name in font
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PSCharStrings {
    strings: IndexMap<String, Vec<u8>>,
}

impl PSCharStrings {
    pub fn new(dict: &Dictionary, len_iv: i64) -> Result<PSCharStrings> {
        let strings = dict
            .iter()
            .map(|(name, charstring)| {
                let name = String::from_utf8(name.clone())?;
                Ok((name, decode_charstring(charstring.as_str()?, len_iv)))
            })
            .collect::<Result<_>>()?;
        Ok(PSCharStrings { strings })
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.strings.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

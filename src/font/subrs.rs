use crate::encryption::{CHARSTRING_KEY, decrypt};
use crate::{Object, Result};

/// Decrypted charstring subroutines of a Type 1 font, indexed from 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PSSubrs {
    subrs: Vec<Vec<u8>>,
}

impl PSSubrs {
    /// `len_iv` filler bytes are dropped from each decrypted subroutine. A
    /// negative `len_iv` means the subroutines are stored unencrypted.
    pub fn new(subrs: &[Object], len_iv: i64) -> Result<PSSubrs> {
        let subrs = subrs
            .iter()
            .map(|subr| Ok(decode_charstring(subr.as_str()?, len_iv)))
            .collect::<Result<_>>()?;
        Ok(PSSubrs { subrs })
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.subrs.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.subrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.subrs.iter().map(Vec::as_slice)
    }
}

pub(crate) fn decode_charstring(bytes: &[u8], len_iv: i64) -> Vec<u8> {
    match usize::try_from(len_iv) {
        Ok(skip) => decrypt(bytes, CHARSTRING_KEY, skip),
        Err(_) => bytes.to_vec(),
    }
}

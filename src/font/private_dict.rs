use super::subrs::PSSubrs;
use crate::{Dictionary, Object, Result};

/// Hinting data and subroutines from the `/Private` dictionary of a Type 1
/// font.
#[derive(Debug, Clone, PartialEq)]
pub struct PSPrivDict {
    /// (Optional) Number of random bytes at the start of each encrypted
    /// charstring. Negative when charstrings are not encrypted. Default 4.
    pub len_iv: i64,
    /// (Optional) Charstring subroutines, already decrypted.
    pub subrs: PSSubrs,
    /// (Optional) Pairs of y coordinates of the alignment zones, the first
    /// pair being the baseline overshoot.
    pub blue_values: Vec<f32>,
    /// (Optional) Pairs of y coordinates of descender zones.
    pub other_blues: Vec<f32>,
    /// (Optional) Point size below which overshoot suppression applies.
    /// Default 0.039625.
    pub blue_scale: f32,
    /// (Optional) Dominant horizontal stem width.
    pub std_hw: Option<f32>,
    /// (Optional) Dominant vertical stem width.
    pub std_vw: Option<f32>,
    /// (Optional) Whether bold rendering should thicken stems at small sizes.
    pub force_bold: bool,
}

impl Default for PSPrivDict {
    fn default() -> Self {
        PSPrivDict {
            len_iv: PSPrivDict::DEFAULT_LEN_IV,
            subrs: PSSubrs::default(),
            blue_values: vec![],
            other_blues: vec![],
            blue_scale: PSPrivDict::DEFAULT_BLUE_SCALE,
            std_hw: None,
            std_vw: None,
            force_bold: false,
        }
    }
}

impl PSPrivDict {
    pub const DEFAULT_LEN_IV: i64 = 4;
    pub const DEFAULT_BLUE_SCALE: f32 = 0.039625;

    pub fn new(dict: &Dictionary) -> Result<PSPrivDict> {
        let len_iv = match dict.get_opt(b"lenIV") {
            Some(len_iv) => len_iv.as_i64()?,
            None => Self::DEFAULT_LEN_IV,
        };
        let subrs = match dict.get_opt(b"Subrs") {
            Some(subrs) => PSSubrs::new(subrs.as_array()?, len_iv)?,
            None => PSSubrs::default(),
        };
        Ok(PSPrivDict {
            len_iv,
            subrs,
            blue_values: number_array(dict, b"BlueValues")?,
            other_blues: number_array(dict, b"OtherBlues")?,
            blue_scale: match dict.get_opt(b"BlueScale") {
                Some(scale) => scale.as_f32()?,
                None => Self::DEFAULT_BLUE_SCALE,
            },
            std_hw: stem_width(dict, b"StdHW")?,
            std_vw: stem_width(dict, b"StdVW")?,
            force_bold: dict.get_opt(b"ForceBold").map(Object::as_bool).transpose()?.unwrap_or(false),
        })
    }
}

pub(crate) fn number_array(dict: &Dictionary, key: &[u8]) -> Result<Vec<f32>> {
    match dict.get_opt(key) {
        Some(array) => array.as_array()?.iter().map(Object::as_f32).collect(),
        None => Ok(vec![]),
    }
}

// Written as a one element array in font programs.
fn stem_width(dict: &Dictionary, key: &[u8]) -> Result<Option<f32>> {
    match dict.get_opt(key) {
        Some(Object::Array(array)) => array.first().map(Object::as_f32).transpose(),
        Some(width) => width.as_f32().map(Some),
        None => Ok(None),
    }
}

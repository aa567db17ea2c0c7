mod charstrings;
mod private_dict;
mod subrs;

pub use charstrings::PSCharStrings;
pub use private_dict::PSPrivDict;
pub use subrs::PSSubrs;

use crate::cmap::{PSCMap, WritingMode};
use crate::cmap_section::{Cid, CodeLen, SourceCode};
use crate::{Dictionary, Error, Object, Result};
use log::debug;
use private_dict::number_array;

/// A PostScript font dictionary with its decrypted glyph programs and the
/// CMap that turns character codes into CIDs.
#[derive(Debug, Clone, PartialEq)]
pub struct PSFont {
    /// (Required) The PostScript name of the font.
    pub font_name: String,
    /// (Optional) 1 for Type 1 fonts, 0 for composite fonts, 42 for wrapped
    /// TrueType. Default 1.
    pub font_type: i64,
    /// (Optional) 0 when glyph outlines are filled, 2 when they are stroked.
    /// Default 0.
    pub paint_type: i64,
    /// (Optional) Glyph space to text space transformation.
    /// Default `[0.001 0 0 0.001 0 0]`.
    pub font_matrix: [f32; 6],
    /// (Optional) Bounding box of all glyphs in glyph space, as
    /// (x_min, y_min, x_max, y_max).
    pub font_bbox: [f32; 4],
    /// (Optional) Hinting data and subroutines.
    pub private: PSPrivDict,
    char_strings: PSCharStrings,
    cmap: PSCMap,
}

impl PSFont {
    pub const DEFAULT_FONT_MATRIX: [f32; 6] = [0.001, 0.0, 0.0, 0.001, 0.0, 0.0];

    /// Build a font from its dictionary.
    ///
    /// The CMap comes from a `CMap` entry (a CMap dictionary or the name of an
    /// Identity CMap), then from an `Encoding` entry naming an Identity CMap,
    /// and is Identity-H otherwise.
    pub fn new(dict: &Dictionary) -> Result<PSFont> {
        let font_name = String::from_utf8(dict.get(b"FontName")?.as_name()?.to_vec())?;
        let private = match dict.get_opt(b"Private") {
            Some(private) => PSPrivDict::new(private.as_dict()?)?,
            None => PSPrivDict::default(),
        };
        let char_strings = match dict.get_opt(b"CharStrings") {
            Some(char_strings) => PSCharStrings::new(char_strings.as_dict()?, private.len_iv)?,
            None => PSCharStrings::default(),
        };
        let font_matrix = match dict.get_opt(b"FontMatrix") {
            Some(_) => fixed_array(dict, b"FontMatrix")?,
            None => Self::DEFAULT_FONT_MATRIX,
        };
        let font_bbox = match dict.get_opt(b"FontBBox") {
            Some(_) => fixed_array(dict, b"FontBBox")?,
            None => [0.0; 4],
        };
        let cmap = font_cmap(dict, &font_name)?;

        Ok(PSFont {
            font_type: dict.get_opt(b"FontType").map(Object::as_i64).transpose()?.unwrap_or(1),
            paint_type: dict.get_opt(b"PaintType").map(Object::as_i64).transpose()?.unwrap_or(0),
            font_name,
            font_matrix,
            font_bbox,
            private,
            char_strings,
            cmap,
        })
    }

    pub fn cmap(&self) -> &PSCMap {
        &self.cmap
    }

    pub fn char_strings(&self) -> &PSCharStrings {
        &self.char_strings
    }

    pub fn cid(&self, code: SourceCode, n_bytes: CodeLen) -> Cid {
        self.cmap.cid(code, n_bytes)
    }

    /// Decrypted glyph program of `name`.
    pub fn charstring(&self, name: &str) -> Option<&[u8]> {
        self.char_strings.get(name)
    }

    /// Decrypted subroutine `index` of the Private dictionary.
    pub fn subr(&self, index: usize) -> Option<&[u8]> {
        self.private.subrs.get(index)
    }
}

fn fixed_array<const N: usize>(dict: &Dictionary, key: &[u8]) -> Result<[f32; N]> {
    let numbers = number_array(dict, key)?;
    let len = numbers.len();
    numbers.try_into().map_err(|_| {
        Error::InvalidFont(format!(
            "{} should hold {N} numbers, found {len}",
            String::from_utf8_lossy(key)
        ))
    })
}

fn identity_cmap(name: &[u8]) -> Option<PSCMap> {
    match name {
        b"Identity-H" => Some(PSCMap::identity(WritingMode::Horizontal)),
        b"Identity-V" => Some(PSCMap::identity(WritingMode::Vertical)),
        _ => None,
    }
}

fn font_cmap(dict: &Dictionary, font_name: &str) -> Result<PSCMap> {
    match dict.get_opt(b"CMap") {
        Some(Object::Dictionary(cmap)) => return PSCMap::from_dict(cmap),
        Some(Object::Name(name)) => {
            return identity_cmap(name).ok_or_else(|| {
                Error::InvalidFont(format!("unknown predefined CMap {}", String::from_utf8_lossy(name)))
            });
        }
        Some(other) => {
            return Err(Error::ObjectType {
                expected: "Dictionary",
                found: other.enum_variant(),
            });
        }
        None => {}
    }
    let encoding = dict.get_opt(b"Encoding").and_then(|encoding| encoding.as_name().ok());
    if let Some(cmap) = encoding.and_then(identity_cmap) {
        return Ok(cmap);
    }
    debug!("font {font_name} has no CMap, using Identity-H");
    Ok(PSCMap::identity(WritingMode::Horizontal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary;
    use crate::encryption::{CHARSTRING_KEY, encrypt};

    fn type1_dict() -> Dictionary {
        dictionary! {
            "FontName" => Object::Name(b"Test-Regular".to_vec()),
            "FontType" => 1,
            "FontBBox" => vec![Object::Integer(-50), Object::Integer(-200), Object::Integer(1000), Object::Integer(900)],
            "Private" => dictionary! {
                "Subrs" => vec![Object::string_literal(encrypt([0x0bu8], CHARSTRING_KEY, 4))],
            },
            "CharStrings" => dictionary! {
                "A" => Object::string_literal(encrypt([0x8bu8, 0xf8, 0x88, 0x0d, 0x0e], CHARSTRING_KEY, 4)),
            },
        }
    }

    #[test]
    fn reads_font_dictionary() {
        let font = PSFont::new(&type1_dict()).unwrap();
        assert_eq!(font.font_name, "Test-Regular");
        assert_eq!(font.font_type, 1);
        assert_eq!(font.paint_type, 0);
        assert_eq!(font.font_matrix, PSFont::DEFAULT_FONT_MATRIX);
        assert_eq!(font.font_bbox, [-50.0, -200.0, 1000.0, 900.0]);
        assert_eq!(font.charstring("A"), Some(&[0x8b, 0xf8, 0x88, 0x0d, 0x0e][..]));
        assert_eq!(font.charstring("B"), None);
        assert_eq!(font.subr(0), Some(&[0x0b][..]));
        assert_eq!(font.char_strings().len(), 1);
    }

    #[test]
    fn default_cmap_is_identity_h() {
        let font = PSFont::new(&type1_dict()).unwrap();
        assert_eq!(font.cmap().name(), "Identity-H");
        assert_eq!(font.cid(0x0102, 2), 0x0102);
    }

    #[test]
    fn encoding_selects_identity_v() {
        let mut dict = type1_dict();
        dict.set("Encoding", Object::Name(b"Identity-V".to_vec()));
        let font = PSFont::new(&dict).unwrap();
        assert_eq!(font.cmap().wmode(), WritingMode::Vertical);
    }

    #[test]
    fn embedded_cmap_dictionary() {
        let mut dict = type1_dict();
        dict.set(
            "CMap",
            dictionary! {
                "CMapName" => Object::Name(b"Embedded".to_vec()),
                "CodeSpaceRange" => vec![Object::hex(vec![0x00u8]), Object::hex(vec![0xffu8])],
                "CIDRange" => vec![Object::hex(vec![0x20u8]), Object::hex(vec![0x7eu8]), Object::Integer(1)],
            },
        );
        let font = PSFont::new(&dict).unwrap();
        assert_eq!(font.cmap().name(), "Embedded");
        assert_eq!(font.cid(0x41, 1), 34);
    }

    #[test]
    fn bad_font_matrix_is_an_error() {
        let mut dict = type1_dict();
        dict.set("FontMatrix", vec![Object::Real(0.001)]);
        assert!(matches!(PSFont::new(&dict), Err(Error::InvalidFont(_))));
    }

    #[test]
    fn missing_font_name_is_an_error() {
        let mut dict = type1_dict();
        dict.remove(b"FontName");
        assert!(matches!(PSFont::new(&dict), Err(Error::DictKey(_))));
    }
}

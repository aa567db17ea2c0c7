use crate::cmap_section::{CMapSection, Cid, CodeLen, SourceCode, into_dictionary, keys};
use crate::code_map::{CodeMap, CodeMapBuilder};
use crate::codec::{bytes_to_units, units_to_bytes};
use crate::parser::{ParserInput, cmap_parser};
use crate::ranges::{CharRange, CharTarget, CharToCharMap, CidChar, CidRange, CodeRange};
use crate::{Dictionary, Error, Object, Result};

use encoding_rs::UTF_16BE;
use std::fs;
use std::path::Path;
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value of the `CMapType` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CMapType {
    /// Types 0 and 1: codes select CIDs.
    Cid,
    /// Type 2: codes select Unicode text.
    ToUnicode,
}

impl CMapType {
    fn from_i64(value: i64) -> CMapType {
        match value {
            0 | 1 => CMapType::Cid,
            2 => CMapType::ToUnicode,
            other => {
                warn!("unknown CMapType {other}, reading as a CID-keyed CMap");
                CMapType::Cid
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WritingMode {
    #[default]
    Horizontal,
    Vertical,
}

impl WritingMode {
    fn from_i64(value: i64) -> WritingMode {
        match value {
            0 => WritingMode::Horizontal,
            1 => WritingMode::Vertical,
            other => {
                warn!("unknown WMode {other}, using horizontal writing");
                WritingMode::Horizontal
            }
        }
    }

    fn identity_name(self) -> &'static str {
        match self {
            WritingMode::Horizontal => "Identity-H",
            WritingMode::Vertical => "Identity-V",
        }
    }
}

/// Character collection a CID-keyed CMap refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CidSystemInfo {
    pub registry: String,
    pub ordering: String,
    pub supplement: i64,
}

impl CidSystemInfo {
    fn from_object(object: &Object) -> Result<CidSystemInfo> {
        // Some CMaps carry an array with one dictionary per collection.
        let dict = match object {
            Object::Array(array) => array
                .first()
                .ok_or_else(|| Error::DictKey(String::from_utf8_lossy(keys::CID_SYSTEM_INFO).into_owned()))?
                .as_dict()?,
            other => other.as_dict()?,
        };
        Ok(CidSystemInfo {
            registry: String::from_utf8(dict.get(b"Registry")?.as_str()?.to_vec())?,
            ordering: String::from_utf8(dict.get(b"Ordering")?.as_str()?.to_vec())?,
            supplement: dict.get(b"Supplement")?.as_i64()?,
        })
    }
}

/// A loaded CMap resource: its metadata plus the frozen [`CodeMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct PSCMap {
    name: String,
    cmap_type: CMapType,
    version: Option<f32>,
    wmode: WritingMode,
    cid_system_info: Option<CidSystemInfo>,
    use_cmap: Option<String>,
    code_map: CodeMap,
}

impl PSCMap {
    const REPLACEMENT_CHAR: u16 = 0xfffd;

    /// Build a CMap from its resource dictionary.
    ///
    /// A `UseCMap` entry naming `Identity-H` or `Identity-V` is resolved
    /// here; any other parent has to be supplied through
    /// [`PSCMap::with_parent`].
    pub fn from_dict(dict: &Dictionary) -> Result<PSCMap> {
        Self::build(dict, Self::usecmap_builder(dict)?)
    }

    /// Build a CMap that inherits every range of `parent`, as `usecmap` does.
    /// The child's own ranges take priority.
    pub fn with_parent(dict: &Dictionary, parent: &PSCMap) -> Result<PSCMap> {
        let mut builder = CodeMap::builder();
        builder.extend_from(parent.code_map());
        Ok(Self::build(dict, builder)?.inherit(parent))
    }

    /// Read a CMap program and build the CMap it defines.
    ///
    /// Mapping sections are applied in program order, so among overlapping
    /// entries the one written last wins, whatever its section kind.
    pub fn parse(program: &[u8]) -> Result<PSCMap> {
        let (dict, mappings) = read_program(program)?;
        let mut builder = Self::usecmap_builder(&dict)?;
        add_sections(mappings, &mut builder)?;
        Self::build(&dict, builder)
    }

    /// [`PSCMap::parse`] for a program that names `parent` in `usecmap`.
    pub fn parse_with_parent(program: &[u8], parent: &PSCMap) -> Result<PSCMap> {
        let (dict, mappings) = read_program(program)?;
        let mut builder = CodeMap::builder();
        builder.extend_from(parent.code_map());
        add_sections(mappings, &mut builder)?;
        Ok(Self::build(&dict, builder)?.inherit(parent))
    }

    /// Read a CMap program from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PSCMap> {
        let program = fs::read(path)?;
        Self::parse(&program)
    }

    /// `Identity-H` or `Identity-V`: two-byte codes equal to their CIDs.
    pub fn identity(wmode: WritingMode) -> PSCMap {
        let codes = CodeRange::TWO_BYTE;
        let mut builder = CodeMap::builder();
        builder.add_code_ranges([codes]).add_cid_ranges([CidRange::new(codes, 0)]);
        PSCMap {
            name: wmode.identity_name().to_string(),
            cmap_type: CMapType::Cid,
            version: None,
            wmode,
            cid_system_info: Some(CidSystemInfo {
                registry: "Adobe".to_string(),
                ordering: "Identity".to_string(),
                supplement: 0,
            }),
            use_cmap: None,
            code_map: builder.build(),
        }
    }

    fn usecmap_builder(dict: &Dictionary) -> Result<CodeMapBuilder> {
        let mut builder = CodeMap::builder();
        if let Some(parent) = dict.get_opt(keys::USE_CMAP) {
            match parent.as_name()? {
                b"Identity-H" => {
                    builder.extend_from(Self::identity(WritingMode::Horizontal).code_map());
                }
                b"Identity-V" => {
                    builder.extend_from(Self::identity(WritingMode::Vertical).code_map());
                }
                other => warn!(
                    "parent CMap {} is not loaded, its ranges are ignored",
                    String::from_utf8_lossy(other)
                ),
            }
        }
        Ok(builder)
    }

    fn inherit(mut self, parent: &PSCMap) -> PSCMap {
        if self.use_cmap.is_none() {
            self.use_cmap = Some(parent.name.clone());
        }
        if self.cid_system_info.is_none() {
            self.cid_system_info = parent.cid_system_info.clone();
        }
        self
    }

    fn build(dict: &Dictionary, mut builder: CodeMapBuilder) -> Result<PSCMap> {
        let name = String::from_utf8(dict.get(keys::CMAP_NAME)?.as_name()?.to_vec())?;
        let version = dict.get_opt(keys::CMAP_VERSION).map(Object::as_f32).transpose()?;
        let wmode = match dict.get_opt(keys::WMODE) {
            Some(wmode) => WritingMode::from_i64(wmode.as_i64()?),
            None => WritingMode::default(),
        };
        let cid_system_info = dict
            .get_opt(keys::CID_SYSTEM_INFO)
            .map(CidSystemInfo::from_object)
            .transpose()?;
        let use_cmap = dict
            .get_opt(keys::USE_CMAP)
            .map(|parent| Ok::<_, Error>(String::from_utf8(parent.as_name()?.to_vec())?))
            .transpose()?;

        add_ranges(dict, &mut builder)?;
        let code_map = builder.build();

        let cmap_type = match dict.get_opt(keys::CMAP_TYPE) {
            Some(cmap_type) => CMapType::from_i64(cmap_type.as_i64()?),
            None if code_map.cid_ranges().is_empty() && !code_map.char_ranges().is_empty() => CMapType::ToUnicode,
            None => CMapType::Cid,
        };
        debug!("loaded CMap {name} ({cmap_type:?}, {wmode:?})");

        Ok(PSCMap {
            name,
            cmap_type,
            version,
            wmode,
            cid_system_info,
            use_cmap,
            code_map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cmap_type(&self) -> CMapType {
        self.cmap_type
    }

    pub fn version(&self) -> Option<f32> {
        self.version
    }

    pub fn wmode(&self) -> WritingMode {
        self.wmode
    }

    pub fn cid_system_info(&self) -> Option<&CidSystemInfo> {
        self.cid_system_info.as_ref()
    }

    /// Name of the parent CMap, if any.
    pub fn use_cmap(&self) -> Option<&str> {
        self.use_cmap.as_deref()
    }

    pub fn code_map(&self) -> &CodeMap {
        &self.code_map
    }

    pub fn cid(&self, code: SourceCode, n_bytes: CodeLen) -> Cid {
        self.code_map.cid(code, n_bytes)
    }

    pub fn encode_cid(&self, cid: Cid) -> Result<Vec<u8>> {
        self.code_map.encode_cid(cid)
    }

    /// CIDs of every code in `bytes`.
    pub fn decode_cids(&self, bytes: &[u8]) -> Vec<Cid> {
        self.code_map.cids(bytes).collect()
    }

    /// Text of every code in `bytes`. Codes without a mapping become U+FFFD.
    pub fn decode_text(&self, bytes: &[u8]) -> Result<String> {
        let mut utf16 = Vec::with_capacity(bytes.len() * 2);
        for (code, n_bytes) in self.code_map.codes(bytes) {
            let units = self.code_map.unicode(code, n_bytes)?;
            if units == [0] {
                debug!("code <{code:X}> has no Unicode mapping");
                utf16.extend(Self::REPLACEMENT_CHAR.to_be_bytes());
            } else {
                utf16.extend(units_to_bytes(&units));
            }
        }
        let (text, _) = UTF_16BE.decode_without_bom_handling(&utf16);
        Ok(text.into_owned())
    }
}

fn read_program(program: &[u8]) -> Result<(Dictionary, Vec<CMapSection>)> {
    let sections = cmap_parser::parse(ParserInput::new_extra(program, "cmap"))?;
    let (mappings, metadata): (Vec<_>, Vec<_>) = sections.into_iter().partition(CMapSection::is_mapping);
    Ok((into_dictionary(metadata), mappings))
}

fn add_sections(sections: Vec<CMapSection>, builder: &mut CodeMapBuilder) -> Result<()> {
    for section in sections {
        add_ranges(&into_dictionary(vec![section]), builder)?;
    }
    Ok(())
}

/// Within one dictionary, single-code entries are added after the ranges of
/// their kind and so take priority over them.
fn add_ranges(dict: &Dictionary, builder: &mut CodeMapBuilder) -> Result<()> {
    builder
        .add_code_ranges(code_ranges(dict)?)
        .add_cid_ranges(cid_ranges(dict, keys::CID_RANGE)?)
        .add_cid_chars(cid_chars(dict, keys::CID_CHAR)?)
        .add_notdef_ranges(cid_ranges(dict, keys::NOTDEF_RANGE)?)
        .add_notdef_chars(cid_chars(dict, keys::NOTDEF_CHAR)?);
    add_bf_ranges(dict, builder)?;
    builder.add_char_maps(bf_chars(dict)?);
    Ok(())
}

/// Operands of a range entry, split into lines of `arity` objects.
fn lines<'a>(dict: &'a Dictionary, key: &[u8], arity: usize) -> Result<std::slice::ChunksExact<'a, Object>> {
    let operands: &[Object] = match dict.get_opt(key) {
        Some(operands) => operands.as_array()?,
        None => &[],
    };
    if operands.len() % arity != 0 {
        return Err(Error::InvalidCodeRange(format!(
            "{} has {} operands, expected a multiple of {arity}",
            String::from_utf8_lossy(key),
            operands.len()
        )));
    }
    Ok(operands.chunks_exact(arity))
}

fn cid_operand(object: &Object) -> Result<Cid> {
    let value = object.as_i64()?;
    Cid::try_from(value).map_err(|_| Error::InvalidCodeRange(format!("CID {value} is out of range")))
}

fn char_target(object: &Object) -> Result<CharTarget> {
    match object {
        Object::String(bytes, _) => Ok(CharTarget::Unicode(bytes_to_units(bytes))),
        Object::Name(name) => Ok(CharTarget::Name(String::from_utf8(name.clone())?)),
        other => Err(Error::ObjectType {
            expected: "String",
            found: other.enum_variant(),
        }),
    }
}

fn code_ranges(dict: &Dictionary) -> Result<Vec<CodeRange>> {
    lines(dict, keys::CODESPACE_RANGE, 2)?
        .map(|line| CodeRange::from_bytes(line[0].as_str()?, line[1].as_str()?))
        .collect()
}

fn cid_ranges(dict: &Dictionary, key: &[u8]) -> Result<Vec<CidRange>> {
    lines(dict, key, 3)?
        .map(|line| {
            let codes = CodeRange::from_bytes(line[0].as_str()?, line[1].as_str()?)?;
            Ok(CidRange::new(codes, cid_operand(&line[2])?))
        })
        .collect()
}

fn cid_chars(dict: &Dictionary, key: &[u8]) -> Result<Vec<CidChar>> {
    lines(dict, key, 2)?
        .map(|line| CidChar::from_bytes(line[0].as_str()?, cid_operand(&line[1])?))
        .collect()
}

fn bf_chars(dict: &Dictionary) -> Result<Vec<CharToCharMap>> {
    lines(dict, keys::BF_CHAR, 2)?
        .map(|line| CharToCharMap::from_bytes(line[0].as_str()?, char_target(&line[1])?))
        .collect()
}

/// bfrange lines with an array destination give every code its own string,
/// so they become single-code mappings.
fn add_bf_ranges(dict: &Dictionary, builder: &mut CodeMapBuilder) -> Result<()> {
    for line in lines(dict, keys::BF_RANGE, 3)? {
        let codes = CodeRange::from_bytes(line[0].as_str()?, line[1].as_str()?)?;
        match &line[2] {
            Object::Array(targets) => {
                if targets.len() as u64 <= u64::from(codes.span()) {
                    warn!(
                        "bfrange <{:X}> <{:X}> has {} destinations for {} codes",
                        codes.start(),
                        codes.end(),
                        targets.len(),
                        u64::from(codes.span()) + 1
                    );
                }
                let maps = (codes.start()..=codes.end())
                    .zip(targets)
                    .map(|(code, target)| CharToCharMap::new(code, codes.n_bytes(), char_target(target)?))
                    .collect::<Result<Vec<_>>>()?;
                builder.add_char_maps(maps);
            }
            target => {
                builder.add_char_ranges([CharRange::new(codes, char_target(target)?)]);
            }
        }
    }
    Ok(())
}

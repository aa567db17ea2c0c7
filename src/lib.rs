mod object;
pub use crate::object::{Dictionary, Object, StringFormat};

mod cmap;
mod cmap_section;
mod code_map;
mod codec;
pub mod encryption;
mod error;
mod font;
mod parser;
mod ranges;

pub use cmap::{CMapType, CidSystemInfo, PSCMap, WritingMode};
pub use cmap_section::{CMapParseError, Cid, CodeLen, SourceCode, keys};
pub use code_map::{CodeMap, CodeMapBuilder, Codes, sort_codespace_ranges};
pub use codec::{MAX_CODE_LEN, bytes_to_code, code_len, code_to_bytes};
pub use error::{Error, Result};
pub use font::{PSCharStrings, PSFont, PSPrivDict, PSSubrs};
pub use parser::direct_object;
pub use ranges::{CharRange, CharTarget, CharToCharMap, CidChar, CidRange, CodeRange};

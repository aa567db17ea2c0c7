use thiserror::Error;

use crate::cmap_section::CMapParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An Object has the wrong type, e.g. the Object is an Array where a Name would be expected.
    #[error("object has wrong type; expected type {expected} but found type {found}")]
    ObjectType {
        expected: &'static str,
        found: &'static str,
    },
    /// Dictionary key was not found.
    #[error("missing required dictionary key \"{0}\"")]
    DictKey(String),
    /// A range handed to the builder violates the range invariants.
    #[error("invalid code range: {0}")]
    InvalidCodeRange(String),
    /// Neither the requested value nor the not-def value 0 has a mapping.
    /// The CMap is incomplete.
    #[error("no mapping for the default character; CMap fallback exhausted")]
    CMapFallbackExhausted,
    /// The matching range maps to a glyph name, which has no numeric value.
    #[error("unsupported mapping kind: {0}")]
    UnsupportedMapping(&'static str),
    /// A font dictionary entry has the right type but an unusable value.
    #[error("invalid font: {0}")]
    InvalidFont(String),
    /// Failed to read a CMap program.
    #[error("couldn't parse CMap program: {0}")]
    Parse(#[from] CMapParseError),
    /// Decoding byte vector to UTF8 String failed.
    #[error("invalid UTF-8 in name or string")]
    UTF8,
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_err: std::string::FromUtf8Error) -> Self {
        Error::UTF8
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_err: std::str::Utf8Error) -> Self {
        Error::UTF8
    }
}

use crate::cmap_section::{BfTarget, CMapParseError, CMapSection, Cid, CodeLen, SourceChar, SourceCode, SourceRange};
use crate::codec::bytes_to_code;
use crate::parser::{_direct_object, comment, dict_dup, eol, hex_bytes, hex_char, integer, name, space, NomResult, ParserInput};
use crate::Object;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{map, map_opt, opt, verify};
use nom::error::ParseError;
use nom::multi::{fold_many0, fold_many1, many0, many1, many_m_n};
use nom::Parser;
use nom::{
    character::complete::digit1,
    sequence::{delimited, separated_pair, terminated},
};

impl<E> From<nom::Err<E>> for CMapParseError {
    fn from(err: nom::Err<E>) -> Self {
        match err {
            nom::Err::Incomplete(_) => CMapParseError::Incomplete,
            // normally nom::Err::Error is a recoverable error, but CMapParseError is the return type
            // so we assume that there are no more parsing branches to check
            nom::Err::Failure(_) | nom::Err::Error(_) => CMapParseError::Error,
        }
    }
}

pub(crate) fn parse(stream_content: ParserInput) -> Result<Vec<CMapSection>, CMapParseError> {
    let result = cmap_stream(stream_content);
    let result = result.map_err(CMapParseError::from)?;
    Ok(result.1)
}

fn cmap_stream(input: ParserInput) -> NomResult<Vec<CMapSection>> {
    delimited(
        cidinit_procset,
        cmap_resource_dictionary,
        (tag(&b"end"[..]), multispace0),
    ).parse(input)
}

fn space0(input: ParserInput) -> NomResult<()> {
    fold_many0(alt((tag(&b" "[..]), tag("\t"))), || {}, |_, _| ()).parse(input)
}

fn space1(input: ParserInput) -> NomResult<()> {
    fold_many1(alt((tag(&b" "[..]), tag("\t"))), || {}, |_, _| ()).parse(input)
}

fn multispace0(input: ParserInput) -> NomResult<()> {
    let space = tag(&b" "[..]).map(|_| ());
    let tab = tag("\t").map(|_| ());
    let eol = eol.map(|_| ());
    fold_many0(alt((space, tab, eol, comment)), || {}, |_, _| ()).parse(input)
}

fn multispace1(input: ParserInput) -> NomResult<()> {
    let space = tag(&b" "[..]).map(|_| ());
    let tab = tag("\t").map(|_| ());
    let eol = eol.map(|_| ());
    fold_many1(alt((space, tab, eol, comment)), || {}, |_, _| ()).parse(input)
}

fn cidinit_procset(input: ParserInput) -> NomResult<()> {
    (
        opt(tag("\u{FEFF}".as_bytes())),
        multispace0,
        tag(&b"/CIDInit"[..]),
        space0,
        alt((tag(&b"/ProcSet"[..]), tag(&b"/Procset"[..]))),
        space1,
        tag(&b"findresource"[..]),
        space1,
        tag(&b"begin"[..]),
        multispace1,
    ).parse(input).map(|(i, _)| (i, ()))
}

fn cmap_resource_dictionary(input: ParserInput) -> NomResult<Vec<CMapSection>> {
    let begin_parser = (digit1, space1, tag(&b"dict"[..]), space1, tag(&b"begin"[..]), multispace1);
    let end_parser = (tag(&b"end"[..]), multispace1);
    delimited(begin_parser, cmap_data, end_parser).parse(input)
}

fn cmap_data(input: ParserInput) -> NomResult<Vec<CMapSection>> {
    let cmap_end = (
        tag(&b"endcmap"[..]),
        multispace1,
        tag(&b"CMapName"[..]),
        space1,
        tag(&b"currentdict"[..]),
        space1,
        tag(&b"/CMap"[..]),
        space1,
        tag(&b"defineresource"[..]),
        space1,
        tag(&b"pop"[..]),
        multispace1,
    );
    delimited((tag(&b"begincmap"[..]), multispace1), cmap_entries, cmap_end).parse(input)
}

/// Metadata, `usecmap` and mapping sections may come in any order.
fn cmap_entries(input: ParserInput) -> NomResult<Vec<CMapSection>> {
    many1(alt((
        use_cmap,
        metadata_entry,
        codespace_range_section,
        cid_range_section,
        cid_char_section,
        notdef_range_section,
        notdef_char_section,
        bf_char_section,
        bf_range_section,
    ))).parse(input)
}

fn use_cmap(input: ParserInput) -> NomResult<CMapSection> {
    map(
        terminated(name, (space0, tag(&b"usecmap"[..]), multispace1)),
        CMapSection::UseCMap,
    ).parse(input)
}

/// `/Key value def`. `/CIDSystemInfo` may also be written as `n dict dup begin ... end`.
fn metadata_entry(input: ParserInput) -> NomResult<CMapSection> {
    let value = alt((terminated(map(dict_dup, Object::Dictionary), space), _direct_object));
    map(
        terminated(separated_pair(name, space, value), (tag(&b"def"[..]), multispace1)),
        |(key, value)| CMapSection::Entry(key, value),
    ).parse(input)
}

/// `n beginX` line entries `endX`. Some real-world CMaps contain empty sections
/// like `0 beginbfchar endbfchar`, those are accepted.
fn mapping_section<'a, O>(
    begin: &'static [u8], end: &'static [u8], mut line: impl FnMut(ParserInput<'a>) -> NomResult<'a, O>,
) -> impl FnMut(ParserInput<'a>) -> NomResult<'a, Vec<O>> {
    move |input| {
        let (input, _) = (digit1, space1, tag(begin), multispace1).parse(input)?;
        let (input, lines) = many0(delimited(space0, &mut line, multispace1)).parse(input)?;
        let (input, _) = (tag(end), multispace1).parse(input)?;
        Ok((input, lines))
    }
}

fn codespace_range_section(input: ParserInput) -> NomResult<CMapSection> {
    map(
        mapping_section(b"begincodespacerange", b"endcodespacerange", code_range_pair),
        CMapSection::CsRange,
    ).parse(input)
}

fn cid_range_section(input: ParserInput) -> NomResult<CMapSection> {
    map(
        mapping_section(b"begincidrange", b"endcidrange", cid_range_line),
        CMapSection::CidRange,
    ).parse(input)
}

fn cid_char_section(input: ParserInput) -> NomResult<CMapSection> {
    map(
        mapping_section(b"begincidchar", b"endcidchar", cid_char_line),
        CMapSection::CidChar,
    ).parse(input)
}

fn notdef_range_section(input: ParserInput) -> NomResult<CMapSection> {
    map(
        mapping_section(b"beginnotdefrange", b"endnotdefrange", cid_range_line),
        CMapSection::NotDefRange,
    ).parse(input)
}

fn notdef_char_section(input: ParserInput) -> NomResult<CMapSection> {
    map(
        mapping_section(b"beginnotdefchar", b"endnotdefchar", cid_char_line),
        CMapSection::NotDefChar,
    ).parse(input)
}

fn bf_char_section(input: ParserInput) -> NomResult<CMapSection> {
    map(mapping_section(b"beginbfchar", b"endbfchar", bf_char_line), CMapSection::BfChar).parse(input)
}

fn bf_range_section(input: ParserInput) -> NomResult<CMapSection> {
    map(mapping_section(b"beginbfrange", b"endbfrange", bf_range_line), CMapSection::BfRange).parse(input)
}

fn code_range_pair(input: ParserInput) -> NomResult<SourceRange> {
    let (rest_of_input, ((code_begin, code_len_beg), (code_end, code_len_end))) =
        separated_pair(source_code, space0, source_code).parse(input)?;
    if code_len_beg != code_len_end {
        create_code_len_err(rest_of_input)
    } else {
        Ok((rest_of_input, (code_begin, code_end, code_len_beg)))
    }
}

fn create_code_len_err<'a, T, E: ParseError<ParserInput<'a>>>(input: ParserInput<'a>) -> Result<T, nom::Err<E>> {
    Err(nom::Err::Failure(nom::error::make_error(
        input,
        nom::error::ErrorKind::LengthValue,
    )))
}

fn source_code(input: ParserInput) -> NomResult<(SourceCode, CodeLen)> {
    let (rest_of_input, bytes) = delimited(tag(&b"<"[..]), many_m_n(1, 4, hex_char), tag(&b">"[..])).parse(input)?;
    Ok((rest_of_input, (bytes_to_code(&bytes), bytes.len() as CodeLen)))
}

fn cid(input: ParserInput) -> NomResult<Cid> {
    map_opt(integer, |value| Cid::try_from(value).ok()).parse(input)
}

fn cid_range_line(input: ParserInput) -> NomResult<(SourceRange, Cid)> {
    separated_pair(code_range_pair, space0, cid).parse(input)
}

fn cid_char_line(input: ParserInput) -> NomResult<(SourceChar, Cid)> {
    separated_pair(source_code, space0, cid).parse(input)
}

fn target_string(input: ParserInput) -> NomResult<Vec<u8>> {
    verify(hex_bytes, |bytes: &[u8]| !bytes.is_empty()).parse(input)
}

fn bf_char_line(input: ParserInput) -> NomResult<(SourceChar, BfTarget)> {
    separated_pair(
        source_code,
        space0,
        alt((map(target_string, BfTarget::HexString), map(name, BfTarget::Name))),
    ).parse(input)
}

fn bf_range_line(input: ParserInput) -> NomResult<(SourceRange, BfTarget)> {
    separated_pair(
        code_range_pair,
        space0,
        alt((
            map(target_string, BfTarget::HexString),
            map(range_target_array, BfTarget::ArrayOfHexStrings),
            map(name, BfTarget::Name),
        )),
    ).parse(input)
}

fn range_target_array(input: ParserInput) -> NomResult<Vec<Vec<u8>>> {
    delimited(
        (tag(&b"["[..]), multispace0),
        many1(terminated(target_string, multispace0)),
        tag(&b"]"[..]),
    ).parse(input)
}

use pscmap::{PSCMap, Result};
use std::io::Write;
use tempfile::NamedTempFile;

/// A CID-keyed CMap in the layout Adobe distributes: one byte ASCII codes
/// next to two byte Shift-JIS style codes.
#[allow(dead_code)]
pub const TEST_RKSJ_H: &[u8] = b"%!PS-Adobe-3.0 Resource-CMap
%%DocumentNeededResources: ProcSet (CIDInit)
%%IncludeResource: ProcSet (CIDInit)
%%BeginResource: CMap (Test-RKSJ-H)
%%EndComments

/CIDInit /ProcSet findresource begin

12 dict begin

begincmap

/CIDSystemInfo 3 dict dup begin
  /Registry (Adobe) def
  /Ordering (Japan1) def
  /Supplement 2 def
end def

/CMapName /Test-RKSJ-H def
/CMapVersion 11.001 def
/CMapType 1 def

/XUID [1 10 25343] def

/WMode 0 def

2 begincodespacerange
  <00>   <80>
  <8140> <9ffc>
endcodespacerange

1 beginnotdefrange
<00> <1f> 231
endnotdefrange

2 begincidrange
<20> <7e> 231
<8140> <817e> 633
endcidrange

1 begincidchar
<80> 1
endcidchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end

%%EndResource
%%EOF
";

#[allow(dead_code)]
pub fn write_program(program: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(program)?;
    file.flush()?;
    Ok(file)
}

#[allow(dead_code)]
pub fn load_cmap(program: &[u8]) -> Result<PSCMap> {
    let file = write_program(program)?;
    PSCMap::load(file.path())
}

use pscmap::{CMapParseError, CMapType, Error, PSCMap, WritingMode};

mod utils;
use utils::{TEST_RKSJ_H, load_cmap, write_program};

#[test]
fn load_cid_keyed_cmap() {
    let _ = env_logger::try_init();
    let cmap = load_cmap(TEST_RKSJ_H).unwrap();
    assert_eq!(cmap.name(), "Test-RKSJ-H");
    assert_eq!(cmap.cmap_type(), CMapType::Cid);
    assert_eq!(cmap.wmode(), WritingMode::Horizontal);
    assert_eq!(cmap.version(), Some(11.001));
    assert_eq!(cmap.use_cmap(), None);

    let info = cmap.cid_system_info().unwrap();
    assert_eq!(info.registry, "Adobe");
    assert_eq!(info.ordering, "Japan1");
    assert_eq!(info.supplement, 2);

    assert_eq!(cmap.code_map().max_code_length(), 2);
    assert_eq!(cmap.code_map().codespace_ranges().len(), 2);
}

#[test]
fn decode_mixed_width_codes() {
    let cmap = PSCMap::parse(TEST_RKSJ_H).unwrap();
    // 'A', a two byte code, a control code, and the single mapped code <80>
    let text = [0x41, 0x81, 0x41, 0x05, 0x80];
    assert_eq!(cmap.decode_cids(&text), vec![264, 634, 231, 1]);

    let codes: Vec<_> = cmap.code_map().codes(&text).collect();
    assert_eq!(codes, vec![(0x41, 1), (0x8141, 2), (0x05, 1), (0x80, 1)]);
}

#[test]
fn encode_cids_back_to_codes() {
    let cmap = PSCMap::parse(TEST_RKSJ_H).unwrap();
    assert_eq!(cmap.encode_cid(264).unwrap(), vec![0x41]);
    assert_eq!(cmap.encode_cid(634).unwrap(), vec![0x81, 0x41]);
    assert_eq!(cmap.encode_cid(1).unwrap(), vec![0x80]);
    // no CID range produces CID 0
    assert!(matches!(cmap.encode_cid(5000), Err(Error::CMapFallbackExhausted)));
}

#[test]
fn codes_outside_codespace_are_read_one_byte_at_a_time() {
    let cmap = PSCMap::parse(TEST_RKSJ_H).unwrap();
    // 0xa0 is in no codespace range, 0xff 0x41 neither
    assert_eq!(cmap.code_map().code_length(&[0xa0]), None);
    assert_eq!(cmap.decode_cids(&[0xa0, 0xff, 0x41]), vec![0, 0, 264]);
}

#[test]
fn usecmap_with_loaded_parent() {
    let parent = PSCMap::parse(
        b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (Japan1) /Supplement 6 >> def
/CMapName /Test-H def
1 begincodespacerange
<2121> <7e7e>
endcodespacerange
1 begincidrange
<2121> <217e> 633
endcidrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
",
    )
    .unwrap();
    let child_program = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/Test-H usecmap
/CMapName /Test-V def
/WMode 1 def
1 begincidrange
<2121> <2122> 7887
endcidrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";
    let child = PSCMap::parse_with_parent(child_program, &parent).unwrap();
    assert_eq!(child.name(), "Test-V");
    assert_eq!(child.wmode(), WritingMode::Vertical);
    assert_eq!(child.use_cmap(), Some("Test-H"));
    assert_eq!(child.cid_system_info(), parent.cid_system_info());
    assert_eq!(child.decode_cids(&[0x21, 0x21, 0x21, 0x23]), vec![7887, 635]);

    // without the parent only the child's own ranges exist
    let orphan = PSCMap::parse(child_program).unwrap();
    assert_eq!(orphan.use_cmap(), Some("Test-H"));
    assert_eq!(orphan.cid(0x2123, 2), 0);
    assert_eq!(orphan.cid(0x2121, 2), 7887);
}

#[test]
fn usecmap_identity_is_resolved() {
    let cmap = PSCMap::parse(
        b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/Identity-H usecmap
/CMapName /Custom-H def
1 begincidchar
<0041> 5
endcidchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
",
    )
    .unwrap();
    assert_eq!(cmap.cid(0x0041, 2), 5);
    assert_eq!(cmap.cid(0x1234, 2), 0x1234);
    assert_eq!(cmap.decode_cids(&[0x00, 0x41, 0x30, 0x42]), vec![5, 0x3042]);
}

#[test]
fn identity_cmaps() {
    let horizontal = PSCMap::identity(WritingMode::Horizontal);
    let vertical = PSCMap::identity(WritingMode::Vertical);
    assert_eq!(horizontal.name(), "Identity-H");
    assert_eq!(vertical.name(), "Identity-V");
    assert_eq!(vertical.wmode(), WritingMode::Vertical);
    for code in [0x0000, 0x0041, 0x3042, 0xffff] {
        assert_eq!(horizontal.cid(code, 2), code);
        assert_eq!(horizontal.encode_cid(code).unwrap(), vec![(code >> 8) as u8, code as u8]);
    }
}

#[test]
fn invalid_programs() {
    assert!(matches!(
        PSCMap::parse(b"not a cmap"),
        Err(Error::Parse(CMapParseError::Error))
    ));
    // a program has to name itself
    let unnamed = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<00> <ff>
endcodespacerange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";
    assert!(matches!(PSCMap::parse(unnamed), Err(Error::DictKey(_))));
}

#[test]
fn load_missing_file() {
    let file = write_program(TEST_RKSJ_H).unwrap();
    let path = file.path().to_path_buf();
    drop(file);
    assert!(matches!(PSCMap::load(path), Err(Error::IO(_))));
}

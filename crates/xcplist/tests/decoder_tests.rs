use xcplist::{decode, decode_str, Dictionary, ErrorKind, PlistValue, XcplistError};

const XML_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
);

fn xml(body: &str) -> String {
    format!("{XML_HEADER}<plist version=\"1.0\">\n{body}\n</plist>\n")
}

fn s(text: &str) -> PlistValue {
    PlistValue::from(text)
}

fn ascii_fixture() -> &'static str {
    include_str!("fixtures/ascii_project.pbxproj")
}

// ============================================================================
// XML dialect
// ============================================================================

#[test]
fn decode_xml_flat_dictionary() {
    let dict = decode_str(&xml(
        "<dict>\n\t<key>archiveVersion</key>\n\t<string>1.0</string>\n</dict>",
    ))
    .unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict["archiveVersion"], s("1.0"));
}

#[test]
fn decode_xml_nested_containers() {
    let dict = decode_str(&xml(
        "<dict>
  <key>hash</key>
  <dict><key>a hash</key><string>in a hash</string></dict>
  <key>array</key>
  <array>
    <string>string in an array</string>
    <dict><key>a hash</key><string>in an array</string></dict>
  </array>
</dict>",
    ))
    .unwrap();

    let hash = dict["hash"].as_dictionary().unwrap();
    assert_eq!(hash["a hash"], s("in a hash"));

    let array = dict["array"].as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0], s("string in an array"));
    assert_eq!(array[1].as_dictionary().unwrap()["a hash"], s("in an array"));
}

#[test]
fn decode_xml_empty_containers() {
    let dict = decode_str(&xml(
        "<dict><key>a</key><dict/><key>b</key><array></array><key>c</key><string/></dict>",
    ))
    .unwrap();
    assert_eq!(dict["a"], PlistValue::Dictionary(Dictionary::new()));
    assert_eq!(dict["b"], PlistValue::Array(vec![]));
    assert_eq!(dict["c"], s(""));
}

#[test]
fn decode_xml_unescapes_entities() {
    let dict = decode_str(&xml(
        "<dict><key>&lt;k&gt;</key><string>a &amp; b &#x1F600; &quot;q&quot;</string></dict>",
    ))
    .unwrap();
    assert_eq!(dict["<k>"], s("a & b \u{1F600} \"q\""));
}

#[test]
fn decode_xml_preserves_unicode_and_whitespace() {
    let dict = decode_str(&xml(
        "<dict><key>café</key><string>  før yoµ 😀\n</string></dict>",
    ))
    .unwrap();
    assert_eq!(dict["café"], s("  før yoµ 😀\n"));
}

#[test]
fn decode_xml_preserves_key_order() {
    let dict = decode_str(&xml(
        "<dict><key>z</key><string>1</string><key>a</key><string>2</string><key>m</key><string>3</string></dict>",
    ))
    .unwrap();
    let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn decode_xml_without_plist_wrapper() {
    let dict = decode_str("<dict><key>a</key><string>b</string></dict>").unwrap();
    assert_eq!(dict["a"], s("b"));
}

#[test]
fn decode_xml_skips_comments_and_cdata() {
    let dict = decode_str(&xml(
        "<dict><!-- note --><key>a</key><string><![CDATA[<raw & text>]]></string></dict>",
    ))
    .unwrap();
    assert_eq!(dict["a"], s("<raw & text>"));
}

// ============================================================================
// Duplicate keys: last value wins, first position kept
// ============================================================================

#[test]
fn decode_xml_duplicate_key_last_wins() {
    let dict = decode_str(&xml(
        "<dict><key>a</key><string>first</string><key>b</key><string>x</string><key>a</key><string>second</string></dict>",
    ))
    .unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict["a"], s("second"));
    assert_eq!(dict.get_index_of("a"), Some(0));
}

#[test]
fn decode_ascii_duplicate_key_last_wins() {
    let dict = decode_str("{ a = first; b = x; a = second; }").unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict["a"], s("second"));
    assert_eq!(dict.get_index_of("a"), Some(0));
}

// ============================================================================
// Disallowed value types
// ============================================================================

#[test]
fn decode_rejects_integer_value() {
    let err = decode_str(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">
<plist version=\"1.0\">
<dict>
  <key>uhoh</key>
  <integer>42</integer>
</dict>
</plist>
",
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn decode_rejects_integer_inside_array() {
    let err = decode_str(&xml(
        "<dict>\n  <key>uhoh</key>\n  <array>\n    <integer>42</integer>\n  </array>\n</dict>",
    ))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn decode_rejects_every_other_scalar_type() {
    for element in [
        "<real>1.5</real>",
        "<true/>",
        "<false/>",
        "<date>2024-01-01T00:00:00Z</date>",
        "<data>AAAA</data>",
    ] {
        let err = decode_str(&xml(&format!("<dict><key>k</key>{element}</dict>"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type, "{element} should be a type error");
    }
}

#[test]
fn decode_rejects_non_dictionary_root() {
    let err = decode_str(&xml("<array><string>a</string></array>")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = decode_str("( a, b )").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn decode_ascii_rejects_data() {
    let err = decode_str("{ blob = <0fbd7771>; }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn decode_unterminated_xml_is_a_parse_error() {
    let err = decode_str(&format!("{XML_HEADER}<plist version=\"1.0\">\n<dict>\n<key>a</key>"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_mismatched_tags_is_a_parse_error() {
    let err = decode_str(&xml("<dict><key>a</key><string>b</dict></string>")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_key_without_value_is_a_parse_error() {
    let err = decode_str(&xml("<dict><key>a</key></dict>")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_unknown_element_is_a_parse_error() {
    let err = decode_str(&xml("<dict><key>a</key><bogus/></dict>")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_unterminated_ascii_reports_line() {
    let err = decode_str("{\n  a = b;\n  c = (\n    d,\n").unwrap_err();
    match err {
        XcplistError::Parse { line, .. } => assert!(line >= 4, "line was {line}"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn decode_ascii_missing_semicolon() {
    let err = decode_str("{ a = b }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_ascii_trailing_garbage() {
    let err = decode_str("{ a = b; } }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn decode_empty_input() {
    assert_eq!(decode(b"").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(decode(b"  \n// only a comment\n").unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn decode_binary_plist_is_unsupported() {
    let err = decode(b"bplist00\xd1\x01\x02").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("binary"));
}

#[test]
fn decode_ascii_invalid_utf8_is_a_type_error() {
    let err = decode(b"{ a = \"\xCA\"; }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn decode_xml_invalid_utf8_is_a_type_error() {
    let err = decode(b"<plist><dict><key>a</key><string>\xCA</string></dict></plist>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

// ============================================================================
// ASCII dialect
// ============================================================================

#[test]
fn decode_ascii_project_file() {
    let dict = decode_str(ascii_fixture()).unwrap();
    assert!(dict.contains_key("archiveVersion"));
    assert_eq!(dict["archiveVersion"], s("1"));
    assert_eq!(dict["objectVersion"], s("46"));
    assert_eq!(dict["classes"], PlistValue::Dictionary(Dictionary::new()));
    assert_eq!(dict["rootObject"], s("E5FBB2D11635ED34009E96B0"));

    let objects = dict["objects"].as_dictionary().unwrap();
    assert_eq!(objects.len(), 6);

    let build_file = objects["E5FBB2E51635ED34009E96B0"].as_dictionary().unwrap();
    assert_eq!(build_file["isa"], s("PBXBuildFile"));
    assert_eq!(build_file["fileRef"], s("E5FBB2E41635ED34009E96B0"));

    let plist_ref = objects["E5FBB2E81635ED34009E96B0"].as_dictionary().unwrap();
    assert_eq!(plist_ref["path"], s("Cocoa Application-Info.plist"));
    assert_eq!(plist_ref["sourceTree"], s("<group>"));

    let group = objects["E5FBB2CF1635ED34009E96B0"].as_dictionary().unwrap();
    assert_eq!(
        group["children"],
        PlistValue::Array(vec![
            s("E5FBB2E41635ED34009E96B0"),
            s("E5FBB2E81635ED34009E96B0"),
        ])
    );

    let debug = objects["E5FBB3001635ED35009E96B0"].as_dictionary().unwrap();
    let settings = debug["buildSettings"].as_dictionary().unwrap();
    assert_eq!(settings["PRODUCT_NAME"], s("$(TARGET_NAME)"));
    assert_eq!(
        settings["GCC_PREPROCESSOR_DEFINITIONS"],
        PlistValue::Array(vec![s("DEBUG=1"), s("$(inherited)")])
    );
}

#[test]
fn decode_ascii_keeps_numbers_as_strings() {
    let dict = decode_str("{ version = 1.0; count = 42; flag = YES; }").unwrap();
    assert_eq!(dict["version"], s("1.0"));
    assert_eq!(dict["count"], s("42"));
    assert_eq!(dict["flag"], s("YES"));
}

#[test]
fn decode_ascii_arrays_with_and_without_trailing_comma() {
    let dict = decode_str("{ a = (x, y,); b = (x, y); c = (); }").unwrap();
    assert_eq!(dict["a"], PlistValue::Array(vec![s("x"), s("y")]));
    assert_eq!(dict["b"], PlistValue::Array(vec![s("x"), s("y")]));
    assert_eq!(dict["c"], PlistValue::Array(vec![]));
}

#[test]
fn decode_ascii_with_utf8_bom() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice("{ name = \"caf\u{e9}\"; }".as_bytes());
    let dict = decode(&bytes).unwrap();
    assert_eq!(dict["name"], s("café"));
}

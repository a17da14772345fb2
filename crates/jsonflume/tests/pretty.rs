//! Snapshots of the pretty-printer's layout.
//!
//! The layout uses literal tabs, so the snapshots capture the escaped debug
//! form where every byte is visible.

mod common;

use common::pump;

fn prettify(input: &str) -> String {
    String::from_utf8(pump(input.as_bytes(), true).unwrap()).unwrap()
}

#[test]
fn snapshot_object_with_array() {
    insta::assert_debug_snapshot!(
        prettify(r#"{"a":[1,2]}"#),
        @r#""{\n\t\"a\" : [\n\t\t1,\n\t\t2\n\t]\n}""#
    );
}

#[test]
fn snapshot_nested_document() {
    insta::assert_debug_snapshot!(
        prettify(r#"{"name":"demo","items":[{"id":1},{"id":2}],"ok":true}"#),
        @r#""{\n\t\"name\" : \"demo\",\n\t\"items\" : [\n\t\t{\n\t\t\t\"id\" : 1\n\t\t},\n\t\t{\n\t\t\t\"id\" : 2\n\t\t}\n\t],\n\t\"ok\" : true\n}""#
    );
}

#[test]
fn snapshot_scalars_in_an_array() {
    insta::assert_debug_snapshot!(
        prettify(r#"[0.5,-3,"s",null]"#),
        @r#""[\n\t0.5,\n\t-3,\n\t\"s\",\n\tnull\n]""#
    );
}

#[test]
fn exact_bytes_match_the_tab_layout() {
    assert_eq!(prettify(r#"{"a":[1,2]}"#), "{\n\t\"a\" : [\n\t\t1,\n\t\t2\n\t]\n}");
}

#[test]
fn empty_containers_keep_their_newline() {
    assert_eq!(prettify("{}"), "{\n}");
    assert_eq!(prettify("[]"), "[\n]");
}

#[test]
fn pretty_parses_back_to_the_same_document() {
    let input = r#"{"a":[1,2],"b":{"c":[true,null,"x"]}}"#;
    let pretty = prettify(input);
    let minified = pump(pretty.as_bytes(), false).unwrap();
    assert_eq!(minified, input.as_bytes());
}

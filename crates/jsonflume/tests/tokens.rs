//! End-to-end token stream scenarios over the public API.

mod common;

use common::{pump, tokens};
use jsonflume::{JsonError, JsonParser, JsonToken};

#[test]
fn whitespace_and_mixed_values() {
    // " \t\r\n[1012e0, {\"hey\" : 1.2} ]"
    let input = b" \t\r\n[1012e0, {\"hey\" : 1.2} ]";
    let mut parser = JsonParser::new(&input[..]);

    assert_eq!(parser.next_token().unwrap(), JsonToken::StartArray);
    assert_eq!(parser.next_token().unwrap(), JsonToken::Float);
    assert_eq!(parser.get_double().unwrap(), 1012.0);
    assert_eq!(parser.get_integer().unwrap(), 1012);
    assert_eq!(parser.next_token().unwrap(), JsonToken::StartObject);
    assert_eq!(parser.next_token().unwrap(), JsonToken::FieldName);
    assert_eq!(parser.current_name().unwrap(), "hey");
    assert_eq!(parser.next_token().unwrap(), JsonToken::Float);
    assert_eq!(parser.get_double().unwrap(), 1.2);
    assert_eq!(parser.next_token().unwrap(), JsonToken::EndObject);
    assert_eq!(parser.next_token().unwrap(), JsonToken::EndArray);
    assert_eq!(parser.next_token().unwrap(), JsonToken::NotAvailable);
}

#[test]
fn max_i64_is_an_integer_token() {
    let mut parser = JsonParser::new(&br#"{"a":9223372036854775807}"#[..]);
    parser.next_token().unwrap();
    assert_eq!(parser.next_token().unwrap(), JsonToken::FieldName);
    assert_eq!(parser.current_name().unwrap(), "a");
    assert_eq!(parser.next_token().unwrap(), JsonToken::Integer);
    assert_eq!(parser.get_integer().unwrap(), 9223372036854775807);
}

#[test]
fn overflowing_integer_becomes_a_float() {
    let mut parser = JsonParser::new(&br#"{"a":9999999999999999999}"#[..]);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert_eq!(parser.next_token().unwrap(), JsonToken::Float);
    assert_eq!(parser.get_double().unwrap(), 1e19);
}

#[test]
fn leading_zero_message() {
    let mut parser = JsonParser::new(&b"[01]"[..]);
    parser.next_token().unwrap();
    let err = parser.next_token().unwrap_err();
    assert_eq!(err.to_string(), "Leading zeroes are not allowed");
}

#[test]
fn unicode_escape_decodes_to_utf8() {
    let mut parser = JsonParser::new(&br#""\u00E9""#[..]);
    parser.next_token().unwrap();
    assert_eq!(parser.get_raw_string(), &[0xC3, 0xA9]);
    assert_eq!(parser.get_string().unwrap(), "\u{e9}");
}

#[test]
fn token_balance_over_a_real_document() {
    let input = br#"
        {
            "menu": {
                "id": "file",
                "popup": {
                    "menuitem": [
                        {"value": "New", "onclick": "CreateNewDoc()"},
                        {"value": "Open", "onclick": "OpenDoc()"}
                    ]
                },
                "flags": [true, false, null],
                "sizes": [1, 2.25, -7, 0]
            }
        }"#;
    let stream = tokens(input).unwrap();
    let opens = stream.iter().filter(|t| t.is_start()).count();
    let closes = stream.iter().filter(|t| t.is_end()).count();
    assert_eq!(opens, closes);
    assert_eq!(opens, 7);

    // And the nesting is matched, never merely balanced
    let mut depth = 0i64;
    for token in &stream {
        if token.is_start() {
            depth += 1;
        } else if token.is_end() {
            depth -= 1;
            assert!(depth >= 0);
        }
    }
    assert_eq!(depth, 0);
}

#[test]
fn generated_bytes_reparse_to_the_same_stream() {
    let input = br#"{"a":[1,2.5,"x"],"b":{"c":null,"d":[true,false]},"e":-12}"#;
    let minified = pump(input, false).unwrap();
    assert_eq!(minified, input);
    assert_eq!(tokens(&minified).unwrap(), tokens(input).unwrap());
}

#[test]
fn pretty_then_minify_is_identity() {
    let input = br#"{"a":[1,2],"b":{"c":"text","d":[{},[]]},"e":0.25}"#;
    let pretty = pump(input, true).unwrap();
    let minified = pump(&pretty, false).unwrap();
    assert_eq!(minified, pump(input, false).unwrap());
}

#[test]
fn skip_leaves_the_stream_consumable() {
    let mut parser = JsonParser::new(&br#"[[1, {"a": [2]}], "after"]"#[..]);
    parser.next_token().unwrap(); // outer [
    parser.next_token().unwrap(); // inner [
    parser.skip_children().unwrap();
    assert_eq!(parser.current_token(), JsonToken::EndArray);
    assert_eq!(parser.next_token().unwrap(), JsonToken::String);
    assert_eq!(parser.get_string().unwrap(), "after");
    assert_eq!(parser.next_token().unwrap(), JsonToken::EndArray);
    assert_eq!(parser.next_token().unwrap(), JsonToken::NotAvailable);
}

#[test]
fn eof_inside_container_is_an_error() {
    for input in ["[1, 2", "{\"a\": 1", "[", "{", "[[]", "{\"a\":{}"] {
        let result = tokens(input.as_bytes());
        assert!(
            matches!(result, Err(JsonError::Syntax(_))),
            "expected unclosed error for {input:?}"
        );
    }
}

#[test]
fn eof_at_top_level_is_not_available() {
    assert_eq!(tokens(b"").unwrap(), []);
    assert_eq!(tokens(b"  \n ").unwrap(), []);
    assert_eq!(tokens(b"null").unwrap(), [JsonToken::Null]);
}

#[test]
fn rejected_relaxations() {
    // Trailing commas, NaN/Infinity literals, comments, bare words
    for input in [
        "[1,]",
        "{\"a\":1,}",
        "NaN",
        "Infinity",
        "-Infinity",
        "// x",
        "[1 /*c*/]",
        "'single'",
    ] {
        assert!(tokens(input.as_bytes()).is_err(), "accepted {input:?}");
    }
}

#[test]
fn deeply_nested_streaming_is_unbounded() {
    // The streaming layer has no depth limit; only the tree does
    let mut input = Vec::new();
    input.extend(std::iter::repeat_n(b'[', 1000));
    input.extend(std::iter::repeat_n(b']', 1000));
    let stream = tokens(&input).unwrap();
    assert_eq!(stream.len(), 2000);
}

#[test]
fn documents_larger_than_the_read_buffer() {
    let mut input = Vec::from(&b"["[..]);
    for i in 0..20_000 {
        if i > 0 {
            input.push(b',');
        }
        input.extend_from_slice(format!("{i}").as_bytes());
    }
    input.push(b']');
    assert!(input.len() > jsonflume::READ_BUFFER_SIZE);

    let mut parser = JsonParser::new(&input[..]);
    assert_eq!(parser.next_token().unwrap(), JsonToken::StartArray);
    for i in 0..20_000i64 {
        assert_eq!(parser.next_token().unwrap(), JsonToken::Integer);
        assert_eq!(parser.get_integer().unwrap(), i);
    }
    assert_eq!(parser.next_token().unwrap(), JsonToken::EndArray);
}

#[test]
fn strings_spanning_refills() {
    let long = "abc\u{e9}".repeat(40_000);
    let input = format!("[\"{long}\", \"tail\"]");
    let mut parser = JsonParser::new(input.as_bytes());
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert_eq!(parser.get_string().unwrap(), long);
    parser.next_token().unwrap();
    assert_eq!(parser.get_string().unwrap(), "tail");
}

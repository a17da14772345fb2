//! Helpers shared by the integration tests.
#![allow(dead_code)]

use jsonflume::{JsonGenerator, JsonParser, JsonToken, Result};

/// Streams `input` through a parser into a generator, compact or pretty.
/// This is the canonical reformatting pump; every token kind passes through.
pub fn pump(input: &[u8], prettify: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut parser = JsonParser::new(input);
        let mut generator = if prettify {
            JsonGenerator::pretty(&mut out)
        } else {
            JsonGenerator::new(&mut out)
        };
        loop {
            match parser.next_token()? {
                JsonToken::NotAvailable => break,
                JsonToken::StartObject => generator.start_object()?,
                JsonToken::EndObject => generator.end_object()?,
                JsonToken::StartArray => generator.start_array()?,
                JsonToken::EndArray => generator.end_array()?,
                JsonToken::FieldName => {
                    generator.write_field_name_bytes(parser.current_name_raw())?;
                }
                JsonToken::String => generator.write_string_bytes(parser.get_raw_string())?,
                JsonToken::Integer => generator.write_i64(parser.get_integer()?)?,
                JsonToken::Float => generator.write_f64(parser.get_double()?)?,
                JsonToken::True => generator.write_bool(true)?,
                JsonToken::False => generator.write_bool(false)?,
                JsonToken::Null => generator.write_null()?,
            }
        }
        generator.flush()?;
    }
    Ok(out)
}

/// Collects the full token stream of `input`.
pub fn tokens(input: &[u8]) -> Result<Vec<JsonToken>> {
    let mut parser = JsonParser::new(input);
    let mut tokens = Vec::new();
    loop {
        match parser.next_token()? {
            JsonToken::NotAvailable => return Ok(tokens),
            token => tokens.push(token),
        }
    }
}

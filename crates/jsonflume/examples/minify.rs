//! Reformat a JSON file by streaming it token-by-token.
//!
//! Usage: `minify <input> <output> [--prettify]`
//!
//! Exits 0 on success and 1 with the parse error on stderr otherwise.

use std::fs::File;
use std::process::ExitCode;
use std::time::Instant;

use jsonflume::{JsonGenerator, JsonParser, JsonToken, ReadSource, Result, WriteSink};

fn pump(input: File, output: File, prettify: bool) -> Result<usize> {
    let mut parser = JsonParser::new(ReadSource::new(input));
    let mut generator = if prettify {
        JsonGenerator::pretty(WriteSink::new(output))
    } else {
        JsonGenerator::new(WriteSink::new(output))
    };

    let mut count = 0usize;
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
        count += 1;
    }
    generator.flush()?;
    Ok(count)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let (paths, flags): (Vec<&String>, Vec<&String>) =
        args[1..].iter().partition(|a| !a.starts_with("--"));
    let prettify = flags.iter().any(|f| f.as_str() == "--prettify");
    if paths.len() != 2 || flags.iter().any(|f| f.as_str() != "--prettify") {
        eprintln!("usage: minify <input> <output> [--prettify]");
        return ExitCode::FAILURE;
    }

    let input = match File::open(paths[0]) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot open {}: {e}", paths[0]);
            return ExitCode::FAILURE;
        }
    };
    let output = match File::create(paths[1]) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot create {}: {e}", paths[1]);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    match pump(input, output, prettify) {
        Ok(count) => {
            eprintln!(
                "{count} tokens in {} microseconds",
                start.elapsed().as_micros()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to parse file: {e}");
            ExitCode::FAILURE
        }
    }
}

//! Benchmark – token streaming and numeric formatting throughput.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonflume::{JsonGenerator, JsonParser, JsonToken};

/// Produce a deterministic JSON document of roughly `target_len` bytes with
/// a realistic mix of objects, arrays, strings, and numbers.
fn make_json_payload(target_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(target_len + 256);
    let mut generator = JsonGenerator::new(&mut out);
    generator.start_array().unwrap();
    let mut i = 0u64;
    // A fixed-increment walk keeps the document identical run to run
    while i == 0 || (i as usize) * 96 < target_len {
        generator.start_object().unwrap();
        generator.write_field("id", i as i64).unwrap();
        generator.write_field("name", "record-with-a-reasonable-name").unwrap();
        generator.write_field("score", (i as f64) * 0.3125 + 0.1).unwrap();
        generator.write_field("active", i % 3 == 0).unwrap();
        generator.write_field_name("tags").unwrap();
        generator.start_array().unwrap();
        generator.write_i64((i * 7919) as i64).unwrap();
        generator.write_f64(1.0 / (i + 1) as f64).unwrap();
        generator.end_array().unwrap();
        generator.end_object().unwrap();
        i += 1;
    }
    generator.end_array().unwrap();
    generator.flush().unwrap();
    drop(generator);
    out
}

fn count_tokens(payload: &[u8]) -> usize {
    let mut parser = JsonParser::new(payload);
    let mut count = 0;
    while parser.next_token().unwrap() != JsonToken::NotAvailable {
        count += 1;
    }
    count
}

fn reformat(payload: &[u8], prettify: bool) -> usize {
    let mut out = Vec::with_capacity(payload.len() * 2);
    let mut parser = JsonParser::new(payload);
    let mut generator = if prettify {
        JsonGenerator::pretty(&mut out)
    } else {
        JsonGenerator::new(&mut out)
    };
    loop {
        match parser.next_token().unwrap() {
            JsonToken::NotAvailable => break,
            JsonToken::StartObject => generator.start_object().unwrap(),
            JsonToken::EndObject => generator.end_object().unwrap(),
            JsonToken::StartArray => generator.start_array().unwrap(),
            JsonToken::EndArray => generator.end_array().unwrap(),
            JsonToken::FieldName => generator
                .write_field_name_bytes(parser.current_name_raw())
                .unwrap(),
            JsonToken::String => generator
                .write_string_bytes(parser.get_raw_string())
                .unwrap(),
            JsonToken::Integer => generator.write_i64(parser.get_integer().unwrap()).unwrap(),
            JsonToken::Float => generator.write_f64(parser.get_double().unwrap()).unwrap(),
            JsonToken::True => generator.write_bool(true).unwrap(),
            JsonToken::False => generator.write_bool(false).unwrap(),
            JsonToken::Null => generator.write_null().unwrap(),
        }
    }
    generator.flush().unwrap();
    drop(generator);
    out.len()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_tokens");
    for size in [16 * 1024, 256 * 1024, 1024 * 1024] {
        let payload = make_json_payload(size);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| count_tokens(black_box(payload)));
        });
    }
    group.finish();
}

fn bench_reformat(c: &mut Criterion) {
    let payload = make_json_payload(256 * 1024);
    let mut group = c.benchmark_group("reformat");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("minify", |b| {
        b.iter(|| reformat(black_box(&payload), false));
    });
    group.bench_function("prettify", |b| {
        b.iter(|| reformat(black_box(&payload), true));
    });
    group.finish();
}

fn bench_doubles(c: &mut Criterion) {
    // Deterministic bit patterns spanning the full exponent range
    let mut state = 0x1234_5678_9abc_def0u64;
    let values: Vec<f64> = (0..4096)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            f64::from_bits(state % 0x7FEF_FFFF_FFFF_FFFF + 1)
        })
        .collect();

    let mut texts = Vec::new();
    {
        let mut generator = JsonGenerator::new(&mut texts);
        generator.start_array().unwrap();
        for &v in &values {
            generator.write_f64(v).unwrap();
        }
        generator.end_array().unwrap();
        generator.flush().unwrap();
    }

    let mut group = c.benchmark_group("doubles");
    group.bench_function("format_4096", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(texts.len());
            let mut generator = JsonGenerator::new(&mut out);
            generator.start_array().unwrap();
            for &v in &values {
                generator.write_f64(black_box(v)).unwrap();
            }
            generator.end_array().unwrap();
            generator.flush().unwrap();
            drop(generator);
            out.len()
        });
    });
    group.bench_function("parse_4096", |b| {
        b.iter(|| {
            let mut parser = JsonParser::new(black_box(&texts[..]));
            let mut sum = 0.0;
            loop {
                match parser.next_token().unwrap() {
                    JsonToken::Float | JsonToken::Integer => sum += parser.get_double().unwrap(),
                    JsonToken::NotAvailable => break,
                    _ => {}
                }
            }
            sum
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_reformat, bench_doubles);
criterion_main!(benches);

//! Numeric round-trip properties over the public API: every finite double
//! must survive format → parse bitwise, and every i64 must come back as the
//! same `Integer` token.

use jsonflume::{JsonGenerator, JsonParser, JsonToken};

/// SplitMix64; deterministic so failures reproduce.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

fn format_one(value: f64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut generator = JsonGenerator::new(&mut out);
    generator.write_f64(value).unwrap();
    generator.flush().unwrap();
    drop(generator);
    out
}

fn parse_double(text: &[u8]) -> f64 {
    let mut parser = JsonParser::new(text);
    let token = parser.next_token().unwrap();
    assert!(
        token == JsonToken::Float || token == JsonToken::Integer,
        "unexpected token {token:?} for {}",
        String::from_utf8_lossy(text)
    );
    parser.get_double().unwrap()
}

fn assert_round_trip(value: f64) {
    let text = format_one(value);
    let recovered = parse_double(&text);
    assert_eq!(
        recovered.to_bits(),
        value.to_bits(),
        "{value:e} printed as {} but recovered as {recovered:e}",
        String::from_utf8_lossy(&text)
    );
}

#[test]
fn corner_doubles_round_trip() {
    for value in [
        1e23,
        1.123456e23,
        f64::MAX,
        f64::MIN_POSITIVE,
        f64::from_bits(1), // smallest subnormal
        -65.613616999999977,
        7.2057594037927933e16,
        1.0e-308,
        0.1e-308,
        0.01e-307,
        1.79769e308,
        2.22507e-308,
        -1.79769e308,
        -2.22507e-308,
        1e-308,
        0.0,
        -0.0,
        1.7955348806030474e19,
        1.0154032828453354e19,
        2.267954527701348e60,
        9934509011495037000.0,
        29018956725463772.0,
        6.0807728793355840e15,
        1.4752497761390908e16,
        0.1,
        0.2,
        0.3,
        1.0 / 3.0,
    ] {
        if value == 0.0 {
            // "0" and "-0" come back as integer zero; only the text matters
            let text = format_one(value);
            let expect: &[u8] = if value.to_bits() >> 63 != 0 { b"-0" } else { b"0" };
            assert_eq!(text, expect);
            continue;
        }
        assert_round_trip(value);
        assert_round_trip(-value);
    }
}

#[test]
fn random_doubles_round_trip() {
    let mut rng = Rng(123_456);
    for _ in 0..100_000 {
        let bits = rng.next() % 0x7FEF_FFFF_FFFF_FFFF + 1;
        let value = f64::from_bits(bits);
        assert_round_trip(value);
        assert_round_trip(-value);
    }
}

#[test]
fn random_subnormals_round_trip() {
    let mut rng = Rng(99);
    for _ in 0..20_000 {
        let bits = rng.next() % ((1 << 52) - 1) + 1;
        assert_round_trip(f64::from_bits(bits));
    }
}

/// Full-scale million-case sweep; slow in debug builds.
#[test]
#[ignore = "million-case sweep; run with --ignored --release"]
fn million_random_doubles_round_trip() {
    let mut rng = Rng(123_456);
    for _ in 0..1_000_000 {
        let bits = rng.next() % 0x7FEF_FFFF_FFFF_FFFF + 1;
        assert_round_trip(f64::from_bits(bits));
    }
}

fn assert_integer_round_trip(value: i64) {
    let mut out = Vec::new();
    let mut generator = JsonGenerator::new(&mut out);
    generator.write_i64(value).unwrap();
    generator.flush().unwrap();
    drop(generator);
    let mut parser = JsonParser::new(&out[..]);
    assert_eq!(parser.next_token().unwrap(), JsonToken::Integer);
    assert_eq!(parser.get_integer().unwrap(), value);
}

#[test]
fn integers_round_trip() {
    for value in [
        0,
        1,
        -1,
        7,
        -42,
        101,
        9999,
        1_000_000_007,
        i64::from(i32::MAX),
        i64::from(i32::MIN),
        i64::MAX,
        i64::MIN,
        i64::MAX - 1,
        i64::MIN + 1,
        999_999_999_999_999_999,
        1_000_000_000_000_000_000,
    ] {
        assert_integer_round_trip(value);
    }
    let mut rng = Rng(7);
    for _ in 0..50_000 {
        assert_integer_round_trip(rng.next() as i64);
    }
}

#[test]
fn seventeen_digit_inputs_parse_correctly_rounded() {
    // Fixed-format strings exercise the slow raise-to-power path
    let mut rng = Rng(2024);
    for _ in 0..20_000 {
        let bits = rng.next() % 0x7FEF_FFFF_FFFF_FFFF + 1;
        let value = f64::from_bits(bits);
        let text = format!("{value:.16e}");
        let expected: f64 = text.parse().unwrap();
        let recovered = parse_double(text.as_bytes());
        assert_eq!(
            recovered.to_bits(),
            expected.to_bits(),
            "mis-rounded {text}"
        );
    }
}

#[test]
fn extreme_magnitudes_saturate() {
    assert_eq!(parse_double(b"1e400"), f64::INFINITY);
    assert_eq!(parse_double(b"-1e400"), f64::NEG_INFINITY);
    assert_eq!(parse_double(b"1e-400"), 0.0);
    assert_eq!(parse_double(b"2e308"), f64::INFINITY);
    assert_eq!(parse_double(b"1e999999999999"), f64::INFINITY);
    assert_eq!(parse_double(b"1e-999999999999"), 0.0);
    assert_eq!(parse_double(b"4.9406564584124654e-324").to_bits(), 1);
    assert_eq!(parse_double(b"2.4703282292062327e-324"), 0.0);
    assert_eq!(
        parse_double(b"1.7976931348623157e308"),
        f64::MAX
    );
    assert_eq!(parse_double(b"1.7976931348623159e308"), f64::INFINITY);
}

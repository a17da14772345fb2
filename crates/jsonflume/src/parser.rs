//! The pull-style streaming parser.
//!
//! [`JsonParser`] reads bytes through a fixed-size buffer and turns them
//! into a stream of [`JsonToken`]s on demand; [`JsonParser::next_token`] is
//! the only mutator. The structural grammar is enforced incrementally from
//! `(current_token, top_of_stack)` rather than an explicit state table.
//!
//! # Examples
//!
//! ```
//! use jsonflume::{JsonParser, JsonToken};
//!
//! let mut parser = JsonParser::new(&b"[1, 2.5, \"three\"]"[..]);
//! let mut tokens = Vec::new();
//! loop {
//!     match parser.next_token()? {
//!         JsonToken::NotAvailable => break,
//!         token => tokens.push(token),
//!     }
//! }
//! assert_eq!(
//!     tokens,
//!     [
//!         JsonToken::StartArray,
//!         JsonToken::Integer,
//!         JsonToken::Float,
//!         JsonToken::String,
//!         JsonToken::EndArray,
//!     ]
//! );
//! # Ok::<(), jsonflume::JsonError>(())
//! ```

use crate::error::{JsonError, Result};
use crate::numeric::{decimal_length, parse::raise_to_pow_ten, POW10_U64};
use crate::source::ByteSource;
use crate::token::JsonToken;

/// Size of the parser's read buffer.
pub const READ_BUFFER_SIZE: usize = 32 * 1024;

const SATURATION_THRESHOLD: u64 = i64::MAX as u64 / 10;

/// A pull-style JSON token reader over a [`ByteSource`].
///
/// String and name views returned by the accessors stay valid until the
/// next call to [`next_token`](Self::next_token); copy them for a longer
/// lifetime.
pub struct JsonParser<S> {
    source: S,
    buf: Box<[u8]>,
    size: usize,
    offset: usize,
    token: JsonToken,
    int_value: i64,
    double_value: f64,
    name: Vec<u8>,
    string: Vec<u8>,
    tag_stack: Vec<JsonToken>,
}

impl<S: ByteSource> JsonParser<S> {
    /// Creates a parser reading from `source`. Pass `&mut source` to keep
    /// ownership at the call site.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: vec![0; READ_BUFFER_SIZE].into_boxed_slice(),
            size: 0,
            offset: 0,
            token: JsonToken::NotAvailable,
            int_value: 0,
            double_value: 0.0,
            name: Vec::new(),
            string: Vec::new(),
            tag_stack: Vec::with_capacity(32),
        }
    }

    /// The token most recently produced by [`next_token`](Self::next_token).
    #[must_use]
    pub fn current_token(&self) -> JsonToken {
        self.token
    }

    /// The most recently parsed field name. Populated while the current
    /// token is `FieldName` and kept until the next field name is parsed.
    pub fn current_name(&self) -> Result<&str> {
        std::str::from_utf8(&self.name).map_err(|_| JsonError::InvalidUtf8)
    }

    /// The raw bytes of the most recently parsed field name.
    #[must_use]
    pub fn current_name_raw(&self) -> &[u8] {
        &self.name
    }

    /// The current `String` token's decoded text.
    pub fn get_string(&self) -> Result<&str> {
        if self.token != JsonToken::String {
            return Err(self.mismatch("a string"));
        }
        std::str::from_utf8(&self.string).map_err(|_| JsonError::InvalidUtf8)
    }

    /// The current `String` token's decoded bytes, verbatim. Multi-byte
    /// UTF-8 input passes through this path unvalidated.
    #[must_use]
    pub fn get_raw_string(&self) -> &[u8] {
        &self.string
    }

    /// The current numeric token as an `i64`. A `Float` truncates.
    pub fn get_integer(&self) -> Result<i64> {
        match self.token {
            JsonToken::Integer => Ok(self.int_value),
            JsonToken::Float => Ok(self.double_value as i64),
            _ => Err(self.mismatch("an integer")),
        }
    }

    /// The current numeric token as an `f64`. An `Integer` widens.
    pub fn get_double(&self) -> Result<f64> {
        match self.token {
            JsonToken::Float => Ok(self.double_value),
            JsonToken::Integer => Ok(self.int_value as f64),
            _ => Err(self.mismatch("a double")),
        }
    }

    /// The current `True`/`False` token as a `bool`.
    pub fn get_boolean(&self) -> Result<bool> {
        match self.token {
            JsonToken::True => Ok(true),
            JsonToken::False => Ok(false),
            _ => Err(self.mismatch("a boolean")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> JsonError {
        JsonError::TypeMismatch {
            expected,
            actual: self.token.description(),
        }
    }

    /// Advances to the next token, skipping over field names.
    pub fn next_value(&mut self) -> Result<JsonToken> {
        while self.next_token()? == JsonToken::FieldName {}
        Ok(self.token)
    }

    /// From a `StartObject` or `StartArray`, consumes tokens up to and
    /// including the matching close; from any other token, does nothing.
    pub fn skip_children(&mut self) -> Result<()> {
        match self.token {
            JsonToken::StartObject => self.skip_pair(JsonToken::StartObject, JsonToken::EndObject),
            JsonToken::StartArray => self.skip_pair(JsonToken::StartArray, JsonToken::EndArray),
            _ => Ok(()),
        }
    }

    fn skip_pair(&mut self, start: JsonToken, end: JsonToken) -> Result<()> {
        let mut depth = 1u32;
        while depth > 0 {
            let token = self.next_token()?;
            if token == start {
                depth += 1;
            } else if token == end {
                depth -= 1;
            } else if token == JsonToken::NotAvailable {
                break;
            }
        }
        Ok(())
    }

    /// Parses the next token from the stream.
    ///
    /// Returns `NotAvailable` at end of input when no container is open;
    /// end of input inside a container is an error.
    pub fn next_token(&mut self) -> Result<JsonToken> {
        let mut after_comma = false;
        if self.token == JsonToken::FieldName {
            match self.next_significant() {
                Some(b':') => {}
                _ => return Err(JsonError::Syntax("Expected a colon, but none was found")),
            }
        } else if !self.tag_stack.is_empty() && !self.token.is_start() {
            // Between values inside a container: a comma or a close
            match self.next_significant() {
                Some(b']') => return self.parse_close_array(),
                Some(b'}') => return self.parse_close_object(),
                Some(b',') => after_comma = true,
                Some(_) => {
                    return Err(JsonError::Syntax(
                        "Expected a comma before the next value, but none was found",
                    ))
                }
                None => {
                    return Err(JsonError::Syntax(
                        "Unexpected end of input inside an unclosed object or array",
                    ))
                }
            }
        }

        if self.token != JsonToken::FieldName
            && self.tag_stack.last() == Some(&JsonToken::StartObject)
        {
            // Inside an object a value must be introduced by its name
            return match self.next_significant() {
                Some(b'"') => {
                    let mut name = std::mem::take(&mut self.name);
                    let result = self.parse_string_into(&mut name);
                    self.name = name;
                    result?;
                    Ok(self.found(JsonToken::FieldName))
                }
                Some(b'}') => {
                    if after_comma {
                        Err(JsonError::Syntax("Trailing commas are not allowed"))
                    } else {
                        self.parse_close_object()
                    }
                }
                Some(_) => Err(JsonError::Syntax("Expected a quoted field name")),
                None => Err(JsonError::Syntax(
                    "Unexpected end of input inside an unclosed object or array",
                )),
            };
        }

        loop {
            let Some(c) = self.read_byte() else {
                if self.tag_stack.is_empty() {
                    return Ok(self.found(JsonToken::NotAvailable));
                }
                return Err(JsonError::Syntax(
                    "Unexpected end of input inside an unclosed object or array",
                ));
            };
            if is_whitespace(c) {
                continue;
            }
            return match c {
                b'-' => self.parse_negative_number(),
                b'0'..=b'9' => self.parse_number(c, false),
                b'"' => {
                    let mut string = std::mem::take(&mut self.string);
                    let result = self.parse_string_into(&mut string);
                    self.string = string;
                    result?;
                    Ok(self.found(JsonToken::String))
                }
                b't' => {
                    self.expect_literal(b"rue", "Invalid token beginning with t")?;
                    Ok(self.found(JsonToken::True))
                }
                b'f' => {
                    self.expect_literal(b"alse", "Invalid token beginning with f")?;
                    Ok(self.found(JsonToken::False))
                }
                b'n' => {
                    self.expect_literal(b"ull", "Invalid token beginning with n")?;
                    Ok(self.found(JsonToken::Null))
                }
                b'{' => {
                    self.tag_stack.push(JsonToken::StartObject);
                    Ok(self.found(JsonToken::StartObject))
                }
                b'}' => {
                    if after_comma {
                        Err(JsonError::Syntax("Trailing commas are not allowed"))
                    } else {
                        self.parse_close_object()
                    }
                }
                b'[' => {
                    self.tag_stack.push(JsonToken::StartArray);
                    Ok(self.found(JsonToken::StartArray))
                }
                b']' => {
                    if after_comma {
                        Err(JsonError::Syntax("Trailing commas are not allowed"))
                    } else {
                        self.parse_close_array()
                    }
                }
                _ => Err(JsonError::InvalidToken(c)),
            };
        }
    }

    // ------------------------------------------------------------ strings

    fn parse_string_into(&mut self, out: &mut Vec<u8>) -> Result<()> {
        out.clear();
        loop {
            // Copy the run of plain bytes in one go. Anything with the high
            // bit set passes through verbatim.
            let run_start = self.offset;
            let mut stopper = 0u8;
            let mut stopped = false;
            while self.offset < self.size {
                let c = self.buf[self.offset];
                if c < 0x20 || c == b'"' || c == b'\\' {
                    stopper = c;
                    stopped = true;
                    break;
                }
                self.offset += 1;
            }
            if self.offset > run_start {
                out.extend_from_slice(&self.buf[run_start..self.offset]);
            }
            if !stopped {
                if !self.load_more() {
                    return Err(JsonError::Syntax("String was not terminated"));
                }
                continue;
            }

            self.offset += 1;
            if stopper == b'"' {
                if !self.next_is_delimiter() {
                    return Err(JsonError::Syntax("Invalid character after a string"));
                }
                return Ok(());
            }
            if stopper != b'\\' {
                return Err(JsonError::UnescapedControl(stopper));
            }
            let Some(escape) = self.read_byte() else {
                return Err(JsonError::Syntax("String was not terminated"));
            };
            match escape {
                b'"' | b'\\' | b'/' => out.push(escape),
                b'b' => out.push(0x08),
                b'f' => out.push(0x0C),
                b'n' => out.push(b'\n'),
                b'r' => out.push(b'\r'),
                b't' => out.push(b'\t'),
                b'u' => {
                    // Each escape is treated as an independent code point;
                    // surrogate halves are not combined.
                    let code = self.parse_hex_code()?;
                    if code < 0x80 {
                        out.push(code as u8);
                    } else if code < 0x800 {
                        out.push(0xC0 | (code >> 6) as u8);
                        out.push(0x80 | (code & 0x3F) as u8);
                    } else {
                        out.push(0xE0 | (code >> 12) as u8);
                        out.push(0x80 | ((code >> 6) & 0x3F) as u8);
                        out.push(0x80 | (code & 0x3F) as u8);
                    }
                }
                _ => return Err(JsonError::InvalidEscape(escape)),
            }
        }
    }

    fn parse_hex_code(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(c) = self.read_byte() else {
                return Err(JsonError::Syntax("String was not terminated"));
            };
            if c.is_ascii_digit() {
                code = code * 16 + u32::from(c - b'0');
            } else {
                let upper = c & !0x20;
                if !(b'A'..=b'F').contains(&upper) {
                    return Err(JsonError::InvalidHexDigit(c));
                }
                code = code * 16 + u32::from(upper - b'A') + 10;
            }
        }
        Ok(code)
    }

    // ------------------------------------------------------------ numbers

    fn parse_negative_number(&mut self) -> Result<JsonToken> {
        match self.read_byte() {
            Some(c) if c.is_ascii_digit() => self.parse_number(c, true),
            _ => Err(JsonError::Syntax("Invalid number")),
        }
    }

    fn parse_number(&mut self, first: u8, negative: bool) -> Result<JsonToken> {
        // Accumulate up to 19 digits; afterwards round to nearest even on
        // the first dropped digit and only track the decimal exponent. The
        // extra '8' when negative lets i64::MIN through.
        let last_digit = if negative { b'8' } else { b'7' };
        let mut significand = 0u64;
        let mut rounded = false;
        let mut pow_ten = 0i64;
        let mut is_float = false;

        let mut peeked;
        if first == b'0' {
            peeked = self.peek_byte();
            if let Some(d) = peeked {
                if d.is_ascii_digit() {
                    return Err(JsonError::Syntax("Leading zeroes are not allowed"));
                }
            }
        } else {
            significand = u64::from(first - b'0');
            loop {
                peeked = self.peek_byte();
                let Some(d) = peeked else { break };
                if !d.is_ascii_digit() {
                    break;
                }
                if significand < SATURATION_THRESHOLD
                    || (significand == SATURATION_THRESHOLD && d <= last_digit)
                {
                    significand = significand * 10 + u64::from(d - b'0');
                } else {
                    if !rounded && (d > b'5' || (d == b'5' && significand & 1 == 1)) {
                        significand += 1;
                    }
                    rounded = true;
                    pow_ten += 1;
                }
                self.offset += 1;
            }
        }

        if peeked == Some(b'.') {
            is_float = true;
            let mut any_fraction_digits = false;
            loop {
                peeked = self.advance_and_peek();
                let Some(d) = peeked else { break };
                if !d.is_ascii_digit() {
                    break;
                }
                any_fraction_digits = true;
                if !rounded
                    && (significand < SATURATION_THRESHOLD
                        || (significand == SATURATION_THRESHOLD && d <= last_digit))
                {
                    significand = significand * 10 + u64::from(d - b'0');
                    pow_ten -= 1;
                } else {
                    if !rounded && (d > b'5' || (d == b'5' && significand & 1 == 1)) {
                        significand += 1;
                    }
                    rounded = true;
                }
            }
            if !any_fraction_digits {
                return Err(JsonError::Syntax("Expected a digit after the decimal point"));
            }
        }

        if matches!(peeked, Some(b'e' | b'E')) {
            is_float = true;
            self.offset += 1;
            peeked = self.peek_byte();
            let mut exponent_negative = false;
            match peeked {
                Some(b'+') => peeked = self.advance_and_peek(),
                Some(b'-') => {
                    exponent_negative = true;
                    peeked = self.advance_and_peek();
                }
                _ => {}
            }
            let mut any_exponent_digits = false;
            let mut exponent = 0i64;
            while let Some(d) = peeked {
                if !d.is_ascii_digit() {
                    break;
                }
                any_exponent_digits = true;
                if exponent < 1_000_000_000 {
                    exponent = exponent * 10 + i64::from(d - b'0');
                }
                peeked = self.advance_and_peek();
            }
            if !any_exponent_digits {
                return Err(JsonError::Syntax("Invalid exponent"));
            }
            pow_ten += if exponent_negative { -exponent } else { exponent };
        }

        if let Some(d) = peeked {
            if !is_delimiter(d) {
                return Err(JsonError::Syntax("Invalid JSON number"));
            }
        }

        if !is_float {
            if !rounded {
                // The saturation bound kept this in range
                self.int_value = if negative {
                    (significand as i64).wrapping_neg()
                } else {
                    significand as i64
                };
                return Ok(self.found(JsonToken::Integer));
            }
            if pow_ten > 0 && pow_ten < 20 {
                if let Some(scaled) = significand.checked_mul(POW10_U64[pow_ten as usize]) {
                    if scaled <= i64::MAX as u64 {
                        self.int_value = if negative {
                            -(scaled as i64)
                        } else {
                            scaled as i64
                        };
                        return Ok(self.found(JsonToken::Integer));
                    }
                }
            }
        }

        let magnitude = if significand == 0 {
            0.0
        } else {
            let total = pow_ten + i64::from(decimal_length(significand));
            if total <= -324 {
                0.0
            } else if total >= 310 {
                f64::INFINITY
            } else {
                raise_to_pow_ten(significand, pow_ten as i32)
            }
        };
        self.double_value = if negative { -magnitude } else { magnitude };
        Ok(self.found(JsonToken::Float))
    }

    // ------------------------------------------------------------ plumbing

    fn parse_close_array(&mut self) -> Result<JsonToken> {
        match self.tag_stack.pop() {
            Some(JsonToken::StartArray) => Ok(self.found(JsonToken::EndArray)),
            Some(_) => Err(JsonError::Syntax("Unexpected end of array")),
            None => Err(JsonError::Syntax("Close bracket outside of any array")),
        }
    }

    fn parse_close_object(&mut self) -> Result<JsonToken> {
        match self.tag_stack.pop() {
            Some(JsonToken::StartObject) => Ok(self.found(JsonToken::EndObject)),
            Some(_) => Err(JsonError::Syntax("Unexpected end of object")),
            None => Err(JsonError::Syntax("Close brace outside of any object")),
        }
    }

    fn expect_literal(&mut self, rest: &[u8], message: &'static str) -> Result<()> {
        for &expected in rest {
            if self.read_byte() != Some(expected) {
                return Err(JsonError::Syntax(message));
            }
        }
        if !self.next_is_delimiter() {
            return Err(JsonError::Syntax(message));
        }
        Ok(())
    }

    fn found(&mut self, token: JsonToken) -> JsonToken {
        self.token = token;
        token
    }

    fn load_more(&mut self) -> bool {
        self.offset = 0;
        self.size = self.source.fill(&mut self.buf);
        self.size > 0
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.offset >= self.size && !self.load_more() {
            return None;
        }
        let c = self.buf[self.offset];
        self.offset += 1;
        Some(c)
    }

    fn peek_byte(&mut self) -> Option<u8> {
        if self.offset >= self.size && !self.load_more() {
            return None;
        }
        Some(self.buf[self.offset])
    }

    fn advance_and_peek(&mut self) -> Option<u8> {
        self.offset += 1;
        self.peek_byte()
    }

    fn next_significant(&mut self) -> Option<u8> {
        loop {
            let c = self.read_byte()?;
            if !is_whitespace(c) {
                return Some(c);
            }
        }
    }

    fn next_is_delimiter(&mut self) -> bool {
        match self.peek_byte() {
            Some(c) => is_delimiter(c),
            None => true,
        }
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_delimiter(c: u8) -> bool {
    matches!(c, b',' | b':' | b']' | b'}') || is_whitespace(c)
}

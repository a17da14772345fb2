//! The push-style streaming generator.
//!
//! [`JsonGenerator`] buffers output in a fixed-size buffer and enforces the
//! same structural grammar as the parser, mirrored: a value inside an object
//! needs a pending field name, closes must match opens, and separators are
//! inserted from the last written token.
//!
//! # Examples
//!
//! ```
//! use jsonflume::JsonGenerator;
//!
//! let mut out = Vec::new();
//! let mut generator = JsonGenerator::new(&mut out);
//! generator.start_array()?;
//! generator.write_i64(1)?;
//! generator.write_string("two")?;
//! generator.write_null()?;
//! generator.end_array()?;
//! generator.flush()?;
//! drop(generator);
//! assert_eq!(out, br#"[1,"two",null]"#);
//! # Ok::<(), jsonflume::JsonError>(())
//! ```

use crate::error::{JsonError, Result};
use crate::numeric::format::{format_double, MAX_DOUBLE_LENGTH};
use crate::numeric::write_signed;
use crate::source::ByteSink;
use crate::token::JsonToken;

/// Size of the generator's write buffer.
pub const WRITE_BUFFER_SIZE: usize = 32 * 1024;

/// A push-style JSON token writer over a [`ByteSink`].
///
/// Dropping the generator flushes whatever is buffered; a write failure at
/// that point is only observable as lost output, so call
/// [`flush`](Self::flush) first when the outcome matters.
pub struct JsonGenerator<W: ByteSink> {
    sink: W,
    buf: Box<[u8]>,
    size: usize,
    token: JsonToken,
    tag_stack: Vec<JsonToken>,
    indent: Vec<u8>,
    pretty: bool,
}

impl<W: ByteSink> JsonGenerator<W> {
    /// Creates a generator producing compact output.
    pub fn new(sink: W) -> Self {
        Self::with_pretty_print(sink, false)
    }

    /// Creates a generator that pretty-prints with tab indentation and
    /// ` : ` name separators.
    pub fn pretty(sink: W) -> Self {
        Self::with_pretty_print(sink, true)
    }

    fn with_pretty_print(sink: W, pretty: bool) -> Self {
        Self {
            sink,
            buf: vec![0; WRITE_BUFFER_SIZE].into_boxed_slice(),
            size: 0,
            token: JsonToken::NotAvailable,
            tag_stack: Vec::with_capacity(32),
            indent: b"\n".to_vec(),
            pretty,
        }
    }

    /// Writes out all buffered bytes and flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.sink.flush()
    }

    /// Opens an object.
    pub fn start_object(&mut self) -> Result<()> {
        self.prepare_write_value()?;
        self.token = JsonToken::StartObject;
        self.tag_stack.push(JsonToken::StartObject);
        self.write_byte(b'{')?;
        if self.pretty {
            self.indent.push(b'\t');
        }
        Ok(())
    }

    /// Closes the innermost object.
    pub fn end_object(&mut self) -> Result<()> {
        if self.tag_stack.last() != Some(&JsonToken::StartObject) {
            return Err(JsonError::Syntax(
                "Tried to close an object while outside of an object",
            ));
        }
        if self.token == JsonToken::FieldName {
            return Err(JsonError::Syntax(
                "Tried to close an object with a dangling field name",
            ));
        }
        self.tag_stack.pop();
        self.token = JsonToken::EndObject;
        if self.pretty {
            self.indent.pop();
            self.write_indent()?;
        }
        self.write_byte(b'}')
    }

    /// Opens an array.
    pub fn start_array(&mut self) -> Result<()> {
        self.prepare_write_value()?;
        self.token = JsonToken::StartArray;
        self.tag_stack.push(JsonToken::StartArray);
        self.write_byte(b'[')?;
        if self.pretty {
            self.indent.push(b'\t');
        }
        Ok(())
    }

    /// Closes the innermost array.
    pub fn end_array(&mut self) -> Result<()> {
        if self.tag_stack.last() != Some(&JsonToken::StartArray) {
            return Err(JsonError::Syntax(
                "Tried to close an array while outside of an array",
            ));
        }
        self.tag_stack.pop();
        self.token = JsonToken::EndArray;
        if self.pretty {
            self.indent.pop();
            self.write_indent()?;
        }
        self.write_byte(b']')
    }

    /// Writes an object member name. Only legal directly inside an object,
    /// and only when the previous name already received its value.
    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.write_field_name_bytes(name.as_bytes())
    }

    /// Byte-slice variant of [`write_field_name`](Self::write_field_name)
    /// for verbatim passthrough of parsed names.
    pub fn write_field_name_bytes(&mut self, name: &[u8]) -> Result<()> {
        if self.tag_stack.last() != Some(&JsonToken::StartObject) {
            return Err(JsonError::Syntax(
                "Tried to write a field name outside of an object",
            ));
        }
        if self.token == JsonToken::FieldName {
            return Err(JsonError::Syntax("Tried to write two field names in a row"));
        }
        if self.token != JsonToken::StartObject {
            self.write_byte(b',')?;
        }
        if self.pretty {
            self.write_indent()?;
        }
        self.token = JsonToken::FieldName;
        self.encode_string(name)?;
        if self.pretty {
            self.write_bytes(b" : ")
        } else {
            self.write_byte(b':')
        }
    }

    /// Writes a double in its shortest round-trip form. Non-finite values
    /// are an error since JSON cannot represent them.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(JsonError::NonFiniteNumber);
        }
        self.prepare_write_value()?;
        self.token = JsonToken::Float;
        let mut tmp = [0u8; MAX_DOUBLE_LENGTH];
        let n = format_double(value, &mut tmp);
        self.write_bytes(&tmp[..n])
    }

    /// Writes a signed integer.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.prepare_write_value()?;
        self.token = JsonToken::Integer;
        let mut tmp = [0u8; 21];
        let start = write_signed(value, &mut tmp);
        self.write_bytes(&tmp[start..])
    }

    /// Writes `true` or `false`.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.prepare_write_value()?;
        if value {
            self.token = JsonToken::True;
            self.write_bytes(b"true")
        } else {
            self.token = JsonToken::False;
            self.write_bytes(b"false")
        }
    }

    /// Writes `null`.
    pub fn write_null(&mut self) -> Result<()> {
        self.prepare_write_value()?;
        self.token = JsonToken::Null;
        self.write_bytes(b"null")
    }

    /// Writes a string value with the required escaping.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_string_bytes(value.as_bytes())
    }

    /// Byte-slice variant of [`write_string`](Self::write_string). Bytes
    /// with the high bit set pass through verbatim; the producer is
    /// responsible for handing over valid UTF-8.
    pub fn write_string_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.prepare_write_value()?;
        self.token = JsonToken::String;
        self.encode_string(value)
    }

    /// Writes a field name followed by its value.
    pub fn write_field<V: WriteValue>(&mut self, name: &str, value: V) -> Result<()> {
        self.write_field_name(name)?;
        value.write_to(self)
    }

    fn prepare_write_value(&mut self) -> Result<()> {
        if let Some(&parent) = self.tag_stack.last() {
            if parent == JsonToken::StartObject && self.token != JsonToken::FieldName {
                return Err(JsonError::Syntax(
                    "Tried to write a value without giving it a field name",
                ));
            }
            if parent == JsonToken::StartArray {
                if self.token != JsonToken::StartArray {
                    self.write_byte(b',')?;
                }
                if self.pretty {
                    self.write_indent()?;
                }
            }
        }
        Ok(())
    }

    fn encode_string(&mut self, value: &[u8]) -> Result<()> {
        static HEX: &[u8; 16] = b"0123456789ABCDEF";
        self.write_byte(b'"')?;
        let mut run_start = 0;
        for (i, &c) in value.iter().enumerate() {
            // High-bit bytes fall through with the plain run
            if c >= 0x20 && c != b'"' && c != b'\\' {
                continue;
            }
            if i > run_start {
                self.write_bytes(&value[run_start..i])?;
            }
            run_start = i + 1;
            match c {
                b'"' => self.write_bytes(b"\\\"")?,
                b'\\' => self.write_bytes(b"\\\\")?,
                0x08 => self.write_bytes(b"\\b")?,
                0x0C => self.write_bytes(b"\\f")?,
                b'\n' => self.write_bytes(b"\\n")?,
                b'\r' => self.write_bytes(b"\\r")?,
                b'\t' => self.write_bytes(b"\\t")?,
                _ => {
                    let escape = [
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[(c >> 4) as usize],
                        HEX[(c & 0xF) as usize],
                    ];
                    self.write_bytes(&escape)?;
                }
            }
        }
        if value.len() > run_start {
            self.write_bytes(&value[run_start..])?;
        }
        self.write_byte(b'"')
    }

    fn write_indent(&mut self) -> Result<()> {
        let indent = std::mem::take(&mut self.indent);
        let result = self.write_bytes(&indent);
        self.indent = indent;
        result
    }

    fn write_byte(&mut self, c: u8) -> Result<()> {
        if self.size >= self.buf.len() {
            self.flush_buffer()?;
        }
        self.buf[self.size] = c;
        self.size += 1;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.size + bytes.len() <= self.buf.len() {
            self.buf[self.size..self.size + bytes.len()].copy_from_slice(bytes);
            self.size += bytes.len();
            return Ok(());
        }
        // Split across a flush
        let first = self.buf.len() - self.size;
        self.buf[self.size..].copy_from_slice(&bytes[..first]);
        self.size = self.buf.len();
        self.flush_buffer()?;
        let rest = &bytes[first..];
        if rest.len() >= self.buf.len() {
            return self.sink.write(rest);
        }
        self.buf[..rest.len()].copy_from_slice(rest);
        self.size = rest.len();
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.size > 0 {
            let size = self.size;
            self.size = 0;
            self.sink.write(&self.buf[..size])?;
        }
        Ok(())
    }
}

impl<W: ByteSink> Drop for JsonGenerator<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// A scalar the generator knows how to print, so `write_field` can take any
/// of them directly.
pub trait WriteValue {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()>;
}

impl WriteValue for f64 {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()> {
        generator.write_f64(self)
    }
}

impl WriteValue for i64 {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()> {
        generator.write_i64(self)
    }
}

impl WriteValue for i32 {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()> {
        generator.write_i64(i64::from(self))
    }
}

impl WriteValue for bool {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()> {
        generator.write_bool(self)
    }
}

impl WriteValue for &str {
    fn write_to<W: ByteSink>(self, generator: &mut JsonGenerator<W>) -> Result<()> {
        generator.write_string(self)
    }
}

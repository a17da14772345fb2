//! An in-memory JSON tree bridging the parser and generator.
//!
//! [`JsonNode`] is a tagged union over the seven JSON value shapes. Object
//! members keep their insertion order and lookups scan linearly, returning
//! the first match. Trees are built by draining a parser and written back by
//! driving a generator, both bounded by [`DEFAULT_MAX_DEPTH`].
//!
//! # Examples
//!
//! ```
//! use jsonflume::{JsonNode, JsonParser};
//!
//! let mut parser = JsonParser::new(&br#"{"size": 3, "tags": ["a", "b"]}"#[..]);
//! let node = JsonNode::read(&mut parser)?;
//! assert_eq!(node.get_integer("size")?, 3);
//! assert_eq!(node.get("tags").unwrap().len(), 2);
//! assert_eq!(node.to_string(), r#"{"size":3,"tags":["a","b"]}"#);
//! # Ok::<(), jsonflume::JsonError>(())
//! ```

use std::fmt;

use crate::error::{JsonError, Result};
use crate::generator::JsonGenerator;
use crate::parser::JsonParser;
use crate::source::{ByteSink, ByteSource};
use crate::token::JsonToken;

/// Recursion bound for tree reads and writes.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// One JSON value: a scalar, an array, or an insertion-ordered object.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonNode {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<JsonNode>),
    Object(Vec<(String, JsonNode)>),
}

impl JsonNode {
    /// Reads one complete value from `parser`, leaving the parser advanced
    /// one token past it.
    ///
    /// A parser that has not produced a token yet is kick-started with one
    /// [`next_token`](JsonParser::next_token) call first.
    pub fn read<S: ByteSource>(parser: &mut JsonParser<S>) -> Result<Self> {
        Self::read_with_depth(parser, DEFAULT_MAX_DEPTH)
    }

    /// [`read`](Self::read) with an explicit depth bound.
    pub fn read_with_depth<S: ByteSource>(
        parser: &mut JsonParser<S>,
        max_depth: usize,
    ) -> Result<Self> {
        if parser.current_token() == JsonToken::NotAvailable {
            parser.next_token()?;
        }
        read_value(parser, max_depth)
    }

    /// Writes this value's token sequence into `generator`.
    pub fn write<W: ByteSink>(&self, generator: &mut JsonGenerator<W>) -> Result<()> {
        self.write_with_depth(generator, DEFAULT_MAX_DEPTH)
    }

    /// [`write`](Self::write) with an explicit depth bound.
    pub fn write_with_depth<W: ByteSink>(
        &self,
        generator: &mut JsonGenerator<W>,
        max_depth: usize,
    ) -> Result<()> {
        match self {
            Self::Null => generator.write_null(),
            Self::Boolean(value) => generator.write_bool(*value),
            Self::Integer(value) => generator.write_i64(*value),
            Self::Float(value) => generator.write_f64(*value),
            Self::String(value) => generator.write_string(value),
            Self::Array(elements) => {
                if max_depth == 0 {
                    return Err(JsonError::DepthExceeded(DEFAULT_MAX_DEPTH));
                }
                generator.start_array()?;
                for element in elements {
                    element.write_with_depth(generator, max_depth - 1)?;
                }
                generator.end_array()
            }
            Self::Object(members) => {
                if max_depth == 0 {
                    return Err(JsonError::DepthExceeded(DEFAULT_MAX_DEPTH));
                }
                generator.start_object()?;
                for (name, value) in members {
                    generator.write_field_name(name)?;
                    value.write_with_depth(generator, max_depth - 1)?;
                }
                generator.end_object()
            }
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Element or member count for containers, 1 for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(elements) => elements.len(),
            Self::Object(members) => members.len(),
            _ => 1,
        }
    }

    /// `true` when a container has nothing in it. Scalars are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Array(elements) => elements.is_empty(),
            Self::Object(members) => members.is_empty(),
            _ => false,
        }
    }

    /// Moves this value out, leaving `Null` behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Null => "a null node",
            Self::Boolean(_) => "a boolean node",
            Self::Integer(_) => "an integer node",
            Self::Float(_) => "a float node",
            Self::String(_) => "a string node",
            Self::Array(_) => "an array node",
            Self::Object(_) => "an object node",
        }
    }

    fn mismatch(&self, expected: &'static str) -> JsonError {
        JsonError::TypeMismatch {
            expected,
            actual: self.description(),
        }
    }

    /// This node as an `i64`; floats truncate.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Float(value) => Ok(*value as i64),
            _ => Err(self.mismatch("an integer")),
        }
    }

    /// Like [`as_integer`](Self::as_integer), but `Null` yields `default`.
    pub fn as_integer_or(&self, default: i64) -> Result<i64> {
        if self.is_null() {
            return Ok(default);
        }
        self.as_integer()
    }

    /// This node as an `f64`; integers widen.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Self::Float(value) => Ok(*value),
            Self::Integer(value) => Ok(*value as f64),
            _ => Err(self.mismatch("a double")),
        }
    }

    /// Like [`as_double`](Self::as_double), but `Null` yields `default`.
    pub fn as_double_or(&self, default: f64) -> Result<f64> {
        if self.is_null() {
            return Ok(default);
        }
        self.as_double()
    }

    /// This node as a `bool`.
    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Self::Boolean(value) => Ok(*value),
            _ => Err(self.mismatch("a boolean")),
        }
    }

    /// Like [`as_boolean`](Self::as_boolean), but `Null` yields `default`.
    pub fn as_boolean_or(&self, default: bool) -> Result<bool> {
        if self.is_null() {
            return Ok(default);
        }
        self.as_boolean()
    }

    /// This node as a string slice.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(value) => Ok(value),
            _ => Err(self.mismatch("a string")),
        }
    }

    /// Like [`as_str`](Self::as_str), but `Null` yields `default`.
    pub fn as_str_or<'a>(&'a self, default: &'a str) -> Result<&'a str> {
        if self.is_null() {
            return Ok(default);
        }
        self.as_str()
    }

    /// First member with this name, if the node is an object that has one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        match self {
            Self::Object(members) => members
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Mutable companion of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonNode> {
        match self {
            Self::Object(members) => members
                .iter_mut()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// The member named `key`, appended as `Null` when missing. Anything
    /// other than an object is first replaced by an empty object.
    pub fn entry(&mut self, key: &str) -> &mut JsonNode {
        if !matches!(self, Self::Object(_)) {
            *self = Self::Object(Vec::new());
        }
        let Self::Object(members) = self else {
            unreachable!()
        };
        if let Some(index) = members.iter().position(|(name, _)| name == key) {
            return &mut members[index].1;
        }
        members.push((key.to_owned(), JsonNode::Null));
        &mut members.last_mut().expect("just pushed").1
    }

    /// Appends to the array, replacing any non-array value by an empty
    /// array first, and returns the new element.
    pub fn push(&mut self, node: JsonNode) -> &mut JsonNode {
        if !matches!(self, Self::Array(_)) {
            *self = Self::Array(Vec::new());
        }
        let Self::Array(elements) = self else {
            unreachable!()
        };
        elements.push(node);
        elements.last_mut().expect("just pushed")
    }

    /// Strict lookup sugar: `self[key]` as an integer.
    pub fn get_integer(&self, key: &str) -> Result<i64> {
        self.get(key).unwrap_or(&JsonNode::Null).as_integer()
    }

    /// Defaulting lookup sugar: missing or `Null` yields `default`.
    pub fn get_integer_or(&self, key: &str, default: i64) -> Result<i64> {
        self.get(key).unwrap_or(&JsonNode::Null).as_integer_or(default)
    }

    /// Strict lookup sugar: `self[key]` as a double.
    pub fn get_double(&self, key: &str) -> Result<f64> {
        self.get(key).unwrap_or(&JsonNode::Null).as_double()
    }

    /// Defaulting lookup sugar: missing or `Null` yields `default`.
    pub fn get_double_or(&self, key: &str, default: f64) -> Result<f64> {
        self.get(key).unwrap_or(&JsonNode::Null).as_double_or(default)
    }

    /// Strict lookup sugar: `self[key]` as a boolean.
    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        self.get(key).unwrap_or(&JsonNode::Null).as_boolean()
    }

    /// Defaulting lookup sugar: missing or `Null` yields `default`.
    pub fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        self.get(key).unwrap_or(&JsonNode::Null).as_boolean_or(default)
    }

    /// Strict lookup sugar: `self[key]` as a string slice.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(node) => node.as_str(),
            None => Err(JsonNode::Null.mismatch("a string")),
        }
    }

    /// Defaulting lookup sugar: missing or `Null` yields `default`.
    pub fn get_string_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        match self.get(key) {
            Some(node) => node.as_str_or(default),
            None => Ok(default),
        }
    }

    /// The array elements in order; empty for anything but an array.
    pub fn elements(&self) -> impl Iterator<Item = &JsonNode> {
        let elements = match self {
            Self::Array(elements) => elements.as_slice(),
            _ => &[],
        };
        elements.iter()
    }

    /// The object members in insertion order; empty for anything but an
    /// object.
    pub fn members(&self) -> impl Iterator<Item = (&str, &JsonNode)> {
        let members = match self {
            Self::Object(members) => members.as_slice(),
            _ => &[],
        };
        members.iter().map(|(name, value)| (name.as_str(), value))
    }
}

fn read_value<S: ByteSource>(parser: &mut JsonParser<S>, depth: usize) -> Result<JsonNode> {
    let node = match parser.current_token() {
        JsonToken::Integer => JsonNode::Integer(parser.get_integer()?),
        JsonToken::Float => JsonNode::Float(parser.get_double()?),
        JsonToken::True => JsonNode::Boolean(true),
        JsonToken::False => JsonNode::Boolean(false),
        JsonToken::Null => JsonNode::Null,
        JsonToken::String => JsonNode::String(parser.get_string()?.to_owned()),
        JsonToken::StartArray => {
            if depth == 0 {
                return Err(JsonError::DepthExceeded(DEFAULT_MAX_DEPTH));
            }
            let mut elements = Vec::new();
            let mut current = parser.next_token()?;
            while current != JsonToken::EndArray {
                elements.push(read_value(parser, depth - 1)?);
                current = parser.current_token();
            }
            JsonNode::Array(elements)
        }
        JsonToken::StartObject => {
            if depth == 0 {
                return Err(JsonError::DepthExceeded(DEFAULT_MAX_DEPTH));
            }
            let mut members = Vec::new();
            let mut current = parser.next_token()?;
            while current == JsonToken::FieldName {
                let name = parser.current_name()?.to_owned();
                parser.next_token()?;
                members.push((name, read_value(parser, depth - 1)?));
                current = parser.current_token();
            }
            JsonNode::Object(members)
        }
        _ => return Ok(JsonNode::Null),
    };
    parser.next_token()?;
    Ok(node)
}

impl fmt::Display for JsonNode {
    /// Compact JSON text of this tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::new();
        {
            let mut generator = JsonGenerator::new(&mut out);
            self.write(&mut generator).map_err(|_| fmt::Error)?;
            generator.flush().map_err(|_| fmt::Error)?;
        }
        f.write_str(&String::from_utf8_lossy(&out))
    }
}

impl From<bool> for JsonNode {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for JsonNode {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for JsonNode {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for JsonNode {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for JsonNode {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for JsonNode {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<JsonNode>> for JsonNode {
    fn from(elements: Vec<JsonNode>) -> Self {
        Self::Array(elements)
    }
}

//! Streaming JSON (RFC 8259) reader and writer.
//!
//! The crate exposes two cooperating layers over fixed-size buffers, so
//! throughput is independent of document size:
//!
//! - [`JsonParser`] — a pull-style token iterator over a [`ByteSource`].
//! - [`JsonGenerator`] — a push-style token writer over a [`ByteSink`].
//! - [`JsonNode`] — a thin in-memory tree that consumes and produces the same
//!   token stream for sub-documents.
//!
//! Numbers are exact: doubles are printed in their shortest round-trip form
//! (a Ryū-style formatter over 128-bit power-of-ten tables) and parsed with
//! correct rounding, so `parse(format(x)) == x` bitwise for every finite
//! `f64`.
//!
//! # Examples
//!
//! ```
//! use jsonflume::{JsonParser, JsonToken};
//!
//! let mut parser = JsonParser::new(&br#"{"answer": 42}"#[..]);
//! assert_eq!(parser.next_token()?, JsonToken::StartObject);
//! assert_eq!(parser.next_token()?, JsonToken::FieldName);
//! assert_eq!(parser.current_name()?, "answer");
//! assert_eq!(parser.next_token()?, JsonToken::Integer);
//! assert_eq!(parser.get_integer()?, 42);
//! assert_eq!(parser.next_token()?, JsonToken::EndObject);
//! assert_eq!(parser.next_token()?, JsonToken::NotAvailable);
//! # Ok::<(), jsonflume::JsonError>(())
//! ```
//!
//! ```
//! use jsonflume::JsonGenerator;
//!
//! let mut out = Vec::new();
//! let mut generator = JsonGenerator::new(&mut out);
//! generator.start_object()?;
//! generator.write_field("pi", 3.141592653589793)?;
//! generator.end_object()?;
//! generator.flush()?;
//! drop(generator);
//! assert_eq!(out, br#"{"pi":3.141592653589793}"#);
//! # Ok::<(), jsonflume::JsonError>(())
//! ```

mod error;
mod generator;
mod node;
mod numeric;
mod parser;
mod source;
mod token;

pub use error::{JsonError, Result};
pub use generator::{JsonGenerator, WriteValue, WRITE_BUFFER_SIZE};
pub use node::{JsonNode, DEFAULT_MAX_DEPTH};
pub use parser::{JsonParser, READ_BUFFER_SIZE};
pub use source::{ByteSink, ByteSource, ReadSource, WriteSink};
pub use token::JsonToken;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JsonError>;

/// Any failure raised while parsing, generating, or traversing JSON.
///
/// All parse and structural errors are fail-fast: the first violation ends
/// the current operation and the parser or generator is left in an
/// unspecified state.
#[derive(Debug, Error)]
pub enum JsonError {
    /// A structural or numeric grammar violation.
    #[error("{0}")]
    Syntax(&'static str),
    /// A byte that cannot start a JSON value.
    #[error("invalid token starting with byte {0:#04x}")]
    InvalidToken(u8),
    /// An unknown character after a backslash in a string.
    #[error("invalid escape code {0:#04x}")]
    InvalidEscape(u8),
    /// A non-hex character inside a `\u` escape.
    #[error("invalid hex digit {0:#04x}")]
    InvalidHexDigit(u8),
    /// A raw control character inside a string.
    #[error("unescaped control character {0:#04x}")]
    UnescapedControl(u8),
    /// String bytes that are not valid UTF-8. The wire path forwards
    /// high-bit bytes verbatim; validation happens in the `&str` accessors.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    /// A typed accessor used on the wrong token or node kind.
    #[error("attempted to read {actual} as {expected}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Tree read or write recursion deeper than the configured bound.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthExceeded(usize),
    /// `f64::NAN` or an infinity handed to the generator. JSON has no
    /// representation for them.
    #[error("cannot serialize a non-finite number")]
    NonFiniteNumber,
    /// A sink write failure. Source failures are not errors; they surface
    /// as end of input.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

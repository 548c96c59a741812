//! Error types for Sigma reading, writing and coercion.
//!
//! Every failure is synchronous and aborts the whole read or write; there is no
//! partial-result mode. Errors raised while parsing carry the byte offset at which
//! the reader noticed the problem.
//!
//! ## Error Categories
//!
//! - **Syntax**: malformed token or structure, wrong delimiter
//! - **Encoding**: invalid UTF-8 on input, out-of-range code point or unwritable
//!   temporal value on output
//! - **Literals**: numbers, escapes, constants, temporal literals, binary payloads
//! - **Records**: unknown, unregistered or unparsable type names, unknown fields,
//!   failed assignments
//! - **Coercion**: lossy narrowing and unsupported conversions
//!
//! ## Examples
//!
//! ```rust
//! use sigma::{from_str, Error, Value};
//!
//! let result = from_str::<Value>("&x");
//! match result {
//!     Err(err @ Error::InvalidConstant { .. }) => {
//!         assert_eq!(err.position(), Some(2));
//!         assert!(err.to_string().contains("invalid constant"));
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the Sigma reader, writer and coercion engine.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed token or structure
    #[error("Syntax error at byte {pos}: {msg}")]
    Syntax { pos: usize, msg: String },

    /// Invalid UTF-8 on input, or output the reader could not read back
    #[error("Encoding error at byte {pos}: {msg}")]
    Encoding { pos: usize, msg: String },

    #[error("Syntax error at byte {pos}: invalid number '{token}'")]
    InvalidNumber { pos: usize, token: String },

    #[error("Syntax error at byte {pos}: invalid escape sequence '\\{escape}'")]
    InvalidEscape { pos: usize, escape: String },

    #[error("Syntax error at byte {pos}: invalid constant '&{found}'")]
    InvalidConstant { pos: usize, found: String },

    /// Temporal literal with an out-of-range component
    #[error("Syntax error at byte {pos}: invalid time or date")]
    InvalidDateTime { pos: usize },

    #[error("Syntax error at byte {pos}: invalid time zone '{zone}'")]
    InvalidTimeZone { pos: usize, zone: String },

    /// More than nine fractional-second digits
    #[error("Syntax error at byte {pos}: invalid fraction of a second")]
    InvalidFraction { pos: usize },

    #[error("Syntax error at byte {pos}: invalid base64 data: {msg}")]
    InvalidBase64 { pos: usize, msg: String },

    /// The stream ended before a fixed-length binary payload was complete
    #[error("Unexpected end of input at byte {pos} in binary data: expected {expected} bytes, found {found}")]
    TruncatedBinary {
        pos: usize,
        expected: usize,
        found: usize,
    },

    /// Record tag with no registered type, raised while reading
    #[error("Reader error at byte {pos}: type '{name}' is not registered")]
    UnknownType { pos: usize, name: String },

    /// Record value whose type has no registered name, raised while writing
    #[error("No record type registered for {0}")]
    UnregisteredType(String),

    /// Registration under a name the reader cannot parse as a record tag
    #[error("invalid record type name '{0}'")]
    InvalidTypeName(String),

    #[error("Reader error at byte {pos}: unable to find property {type_name}.{field}")]
    UnknownField {
        pos: usize,
        type_name: String,
        field: String,
    },

    /// A field value could not be coerced or assigned
    #[error("Reader error at byte {pos}: unable to set property {type_name}.{field}: {source}")]
    FieldAssignment {
        pos: usize,
        type_name: String,
        field: String,
        #[source]
        source: Box<Error>,
    },

    #[error("unable to convert {value} to type '{target}' without loss of precision")]
    PrecisionLoss { value: String, target: String },

    #[error("unable to coerce {found} to type '{target}'")]
    UnsupportedCoercion { found: String, target: String },

    /// Unconsumed input after a complete value
    #[error("Syntax error at byte {pos}: end of input expected")]
    TrailingInput { pos: usize },

    /// Custom error raised through the serde bridge
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at the given byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::Error;
    ///
    /// let err = Error::syntax(12, "']' expected but '}' found");
    /// assert!(err.to_string().contains("byte 12"));
    /// ```
    pub fn syntax(pos: usize, msg: &str) -> Self {
        Error::Syntax {
            pos,
            msg: msg.to_string(),
        }
    }

    pub fn encoding(pos: usize, msg: &str) -> Self {
        Error::Encoding {
            pos,
            msg: msg.to_string(),
        }
    }

    /// Creates a precision-loss error for a narrowing that would drop digits or overflow.
    pub fn precision_loss<V: fmt::Display>(value: V, target: &str) -> Self {
        Error::PrecisionLoss {
            value: value.to_string(),
            target: target.to_string(),
        }
    }

    /// Creates an unsupported-coercion error naming both the source and the target type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::Error;
    ///
    /// let err = Error::unsupported_coercion("null", "f64");
    /// assert!(err.to_string().contains("unable to coerce null"));
    /// ```
    pub fn unsupported_coercion(found: &str, target: &str) -> Self {
        Error::UnsupportedCoercion {
            found: found.to_string(),
            target: target.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the byte offset attached to this error, if it was raised while parsing
    /// or encoding.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { pos, .. }
            | Error::Encoding { pos, .. }
            | Error::InvalidNumber { pos, .. }
            | Error::InvalidEscape { pos, .. }
            | Error::InvalidConstant { pos, .. }
            | Error::InvalidDateTime { pos }
            | Error::InvalidTimeZone { pos, .. }
            | Error::InvalidFraction { pos }
            | Error::InvalidBase64 { pos, .. }
            | Error::TruncatedBinary { pos, .. }
            | Error::UnknownType { pos, .. }
            | Error::UnknownField { pos, .. }
            | Error::FieldAssignment { pos, .. }
            | Error::TrailingInput { pos } => Some(*pos),
            Error::Io(_)
            | Error::UnregisteredType(_)
            | Error::InvalidTypeName(_)
            | Error::PrecisionLoss { .. }
            | Error::UnsupportedCoercion { .. }
            | Error::Custom(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_reported_for_reader_errors() {
        assert_eq!(Error::InvalidFraction { pos: 19 }.position(), Some(19));
        assert_eq!(Error::syntax(3, "oops").position(), Some(3));
        assert_eq!(Error::UnregisteredType("Foo".into()).position(), None);
    }

    #[test]
    fn test_field_assignment_keeps_source() {
        use std::error::Error as _;

        let err = Error::FieldAssignment {
            pos: 10,
            type_name: "model".into(),
            field: "i".into(),
            source: Box::new(Error::precision_loss("1.5", "i32")),
        };
        let msg = err.to_string();
        assert!(msg.contains("unable to set property model.i"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_messages_match_reader_fragments() {
        let err = Error::InvalidTimeZone {
            pos: 4,
            zone: "Australia/Bogansville".into(),
        };
        assert!(err.to_string().contains("invalid time zone"));

        let err = Error::UnknownType {
            pos: 6,
            name: "model".into(),
        };
        assert!(err.to_string().contains("type 'model' is not registered"));
    }
}

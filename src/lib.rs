//! # sigma
//!
//! A reader and writer for Sigma, a compact self-describing text serialization format.
//!
//! ## What is Sigma?
//!
//! Sigma encodes dynamically typed values as UTF-8 text. Every value announces its
//! own kind with its first character, so documents can be read without a schema and
//! written back without loss:
//!
//! ```text
//! {"id"=42,"price"=19.990,"seen"=@2019-01-01T12:31:47+11:00[Australia/Hobart],"tags"=["a","b"],"ok"=&t}
//! ```
//!
//! ## Key Features
//!
//! - **Exact Numbers**: decimals keep every digit they were written with
//! - **Rich Scalars**: binary blobs, six kinds of date/time value, IANA time zones
//! - **Any Map Key**: map keys are values, not just strings
//! - **Named Records**: `point{x=1,y=2}` maps onto registered Rust types by name
//! - **Serde Bridge**: [`to_value`] and [`from_value`] connect any serde type
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sigma = "0.1"
//! ```
//!
//! ### Reading and Writing Values
//!
//! ```rust
//! use sigma::{from_str, to_string, Value};
//!
//! let value: Value = from_str(r#"[1, 2.50, "three", &n]"#).unwrap().unwrap();
//! assert_eq!(to_string(&value).unwrap(), r#"[1,2.50,"three",&n]"#);
//!
//! // typed reads go through the coercion engine
//! let numbers: Vec<u8> = from_str("[1,2,3]").unwrap().unwrap();
//! assert_eq!(numbers, vec![1, 2, 3]);
//! ```
//!
//! ### Records
//!
//! ```rust
//! use sigma::{from_str, sigma_record, to_string, Types};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! sigma_record!(Point { x, y });
//! Types::register::<Point>("point").unwrap();
//!
//! let text = to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, "point{x=1,y=2}");
//!
//! let point: Point = from_str("POINT { X = 3 }").unwrap().unwrap();
//! assert_eq!(point, Point { x: 3, y: 0 });
//! ```
//!
//! ### Dynamic Values with sigma! Macro
//!
//! ```rust
//! use sigma::{sigma, Value};
//!
//! let data = sigma!({
//!     "name" => "Alice",
//!     "tags" => ["rust", "sigma"]
//! });
//! assert_eq!(data.as_map().map(|m| m.len()), Some(2));
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types; every read error carries the byte
//!   offset where it was detected
//! - Fixed-length binary payloads are never pre-allocated from the declared length
//!
//! ## Wire Format
//!
//! The wire grammar is documented in [`grammar`].
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - reading and writing values
//! - **`records.rs`** - registering record types
//! - **`dynamic_values.rs`** - working with `Value` trees and the serde bridge
//!
//! Run any example with: `cargo run --example <name>`

#[macro_use]
pub mod macros;

mod coerce;
pub mod de;
pub mod error;
pub mod grammar;
pub mod map;
pub mod number;
pub mod options;
pub mod record;
pub mod ser;
pub mod temporal;
pub mod types;
pub mod utf8;
pub mod value;

pub use coerce::{coerce, Coerce};
pub use de::{from_value, Reader};
pub use error::{Error, Result};
pub use map::SigmaMap;
pub use number::Number;
pub use options::WriterOptions;
pub use record::{Field, Record, RecordValue};
pub use ser::{to_value, Writer};
pub use temporal::{OffsetTime, Temporal};
pub use types::{RecordType, Types};
pub use value::{Bytes, ToValue, Value};

use std::io;

/// Serialize any `T: ToValue` to a Sigma string.
///
/// # Examples
///
/// ```rust
/// use sigma::to_string;
///
/// assert_eq!(to_string(&vec![1, 2, 3]).unwrap(), "[1,2,3]");
/// assert_eq!(to_string("a\"b").unwrap(), r#""a\"b""#);
/// ```
///
/// # Errors
///
/// Fails for unregistered records, and with [`Error::Encoding`] when raw binary
/// output is not valid UTF-8; use [`to_vec`] or [`WriterOptions::base64`] for
/// arbitrary bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + ToValue,
{
    to_string_with_options(value, WriterOptions::default())
}

/// Serialize any `T: ToValue` to a Sigma string with custom options.
///
/// # Examples
///
/// ```rust
/// use sigma::{to_string_with_options, Bytes, WriterOptions};
///
/// let blob = Bytes(vec![0xDE, 0xAD]);
/// assert_eq!(to_string_with_options(&blob, WriterOptions::base64()).unwrap(), "*3q0");
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: WriterOptions) -> Result<String>
where
    T: ?Sized + ToValue,
{
    let bytes = to_vec_with_options(value, options)?;
    String::from_utf8(bytes).map_err(|err| {
        Error::encoding(
            err.utf8_error().valid_up_to(),
            "output is not valid UTF-8; write raw binary to bytes or use base64",
        )
    })
}

/// Serialize any `T: ToValue` to a byte vector.
///
/// # Errors
///
/// Fails for records whose type is not registered.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + ToValue,
{
    to_vec_with_options(value, WriterOptions::default())
}

fn to_vec_with_options<T>(value: &T, options: WriterOptions) -> Result<Vec<u8>>
where
    T: ?Sized + ToValue,
{
    let mut buffer = Vec::with_capacity(128);
    to_writer_with_options(&mut buffer, value, options)?;
    Ok(buffer)
}

/// Serialize any `T: ToValue` to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use sigma::{to_writer, Bytes};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Bytes(b"abc".to_vec())).unwrap();
/// assert_eq!(buffer, b"|3|abc");
/// ```
///
/// # Errors
///
/// Returns an error if conversion fails or writing to the stream fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + ToValue,
{
    to_writer_with_options(writer, value, WriterOptions::default())
}

/// Serialize any `T: ToValue` to an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if conversion fails or writing to the stream fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: WriterOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + ToValue,
{
    let value = value.to_value()?;
    Writer::with_options(writer, options).write(&value)
}

/// Read one Sigma value from a string and coerce it to `T`.
///
/// Returns `Ok(None)` when the input holds no value (empty or whitespace only).
///
/// # Examples
///
/// ```rust
/// use sigma::{from_str, Value};
///
/// let n: i64 = from_str("-17").unwrap().unwrap();
/// assert_eq!(n, -17);
///
/// assert!(from_str::<i64>("1.5").is_err());
/// assert_eq!(from_str::<Value>("").unwrap(), None);
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid Sigma or the value cannot be coerced
/// to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Coerce>(s: &str) -> Result<Option<T>> {
    from_slice(s.as_bytes())
}

/// Read one Sigma value from bytes and coerce it to `T`.
///
/// Unlike [`from_str`], the input may contain raw binary payloads.
///
/// # Errors
///
/// Returns an error if the input is not valid Sigma or the value cannot be coerced
/// to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: Coerce>(v: &[u8]) -> Result<Option<T>> {
    Reader::from_slice(v).read()?.map(coerce::<T>).transpose()
}

/// Read one Sigma value from an I/O stream and coerce it to `T`.
///
/// The stream is wrapped in a [`std::io::BufReader`].
///
/// # Examples
///
/// ```rust
/// use sigma::from_reader;
/// use std::io::Cursor;
///
/// let flags: Vec<bool> = from_reader(Cursor::new(b"[&t,&f]")).unwrap().unwrap();
/// assert_eq!(flags, vec![true, false]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid Sigma, or the value
/// cannot be coerced to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<Option<T>>
where
    R: io::Read,
    T: Coerce,
{
    Reader::new(io::BufReader::new(reader))
        .read()?
        .map(coerce::<T>)
        .transpose()
}

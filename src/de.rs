//! Sigma reading.
//!
//! This module provides the [`Reader`], a recursive-descent parser that turns a
//! Sigma byte stream into a [`Value`] tree, and [`from_value`], which feeds a
//! `Value` into any serde `Deserialize` type.
//!
//! ## Overview
//!
//! - **One code point of lookahead**: the reader decodes UTF-8 itself, one code point
//!   at a time, and dispatches on that single character
//! - **No backtracking**: tokens end at whitespace or one of `= , { } [ ]`
//! - **Raw binary**: `|len|` payloads are read as raw octets, bypassing UTF-8
//! - **Byte offsets**: every error carries the number of bytes consumed so far
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use sigma::{from_str, Value};
//!
//! let value: Value = from_str(r#"{"a"=6,"b"=&f,"c"=@2019-01-01}"#).unwrap().unwrap();
//! assert_eq!(value.as_map().map(|m| m.len()), Some(3));
//!
//! // empty input is "no value", not an error
//! assert_eq!(from_str::<Value>("   ").unwrap(), None);
//! ```

use crate::record::{Assign, RecordValue};
use crate::temporal::{Temporal, TemporalError, TemporalParts};
use crate::{utf8, Error, Number, Result, SigmaMap, Types, Value};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::io::{self, Read};

fn is_separator(c: char) -> bool {
    matches!(c, '=' | ',' | '{' | '}' | '[' | ']')
}

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether `name` reads back whole as a record tag: a letter or `_`, then any run
/// of characters other than whitespace and `= , { } [ ]`.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().map_or(false, is_identifier_start)
        && chars.all(|c| !is_separator(c) && !is_ws(c))
}

/// The Sigma reader.
///
/// Holds the input stream, the decoded lookahead character and the byte position.
/// A reader parses exactly one value; create one per document.
///
/// The reader pulls one byte at a time from its source, so wrap unbuffered sources
/// such as files or sockets in a [`std::io::BufReader`].
pub struct Reader<R> {
    input: R,
    c: Option<char>,
    pos: usize,
}

impl<'a> Reader<&'a [u8]> {
    #[must_use]
    pub fn from_slice(input: &'a [u8]) -> Self {
        Reader::new(input)
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(input: &'a str) -> Self {
        Reader::new(input.as_bytes())
    }
}

impl<R: Read> Reader<R> {
    #[must_use]
    pub fn new(input: R) -> Self {
        Reader {
            input,
            c: None,
            pos: 0,
        }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads one complete value.
    ///
    /// Returns `Ok(None)` when the input is empty or only whitespace. Anything other
    /// than whitespace after the value is an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::{Error, Reader, Value};
    ///
    /// let mut reader = Reader::from_str("[1, 2, 3]");
    /// assert!(matches!(reader.read().unwrap(), Some(Value::List(_))));
    ///
    /// let mut reader = Reader::from_str("&t &f");
    /// assert!(matches!(reader.read(), Err(Error::TrailingInput { .. })));
    /// ```
    pub fn read(&mut self) -> Result<Option<Value>> {
        self.advance()?;
        self.skip_ws()?;
        if self.c.is_none() {
            return Ok(None);
        }
        let value = self.read_value()?;
        self.skip_ws()?;
        if self.c.is_some() {
            return Err(Error::TrailingInput { pos: self.pos });
        }
        Ok(Some(value))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(buf[0]));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Decodes the next code point into the lookahead.
    fn advance(&mut self) -> Result<()> {
        let lead = match self.read_byte()? {
            Some(b) => b,
            None => {
                self.c = None;
                return Ok(());
            }
        };
        let len = utf8::sequence_length(lead);
        if len == 0 {
            return Err(Error::encoding(
                self.pos,
                &format!("invalid UTF-8 leading byte 0x{:02X}", lead),
            ));
        }
        let mut acc = lead as u32;
        for _ in 1..len {
            match self.read_byte()? {
                Some(b) => acc = utf8::accumulate(acc, b),
                None => return Err(Error::encoding(self.pos, "truncated UTF-8 sequence")),
            }
        }
        let cp = utf8::strip_tag(acc, len);
        match char::from_u32(cp) {
            Some(ch) => {
                self.c = Some(ch);
                Ok(())
            }
            None => Err(Error::encoding(
                self.pos,
                &format!("invalid code point U+{:X}", cp),
            )),
        }
    }

    fn consume(&mut self, ch: char) -> Result<bool> {
        if self.c == Some(ch) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume_or_error(&mut self, ch: char) -> Result<()> {
        if self.consume(ch)? {
            Ok(())
        } else {
            Err(Error::syntax(
                self.pos,
                &format!("'{}' expected but {} found", ch, self.describe()),
            ))
        }
    }

    fn is_digit(&self) -> bool {
        matches!(self.c, Some('0'..='9'))
    }

    fn consume_digit(&mut self) -> Result<u32> {
        match self.c.and_then(|c| c.to_digit(10)) {
            Some(d) => {
                self.advance()?;
                Ok(d)
            }
            None => Err(Error::syntax(
                self.pos,
                &format!("digit expected but {} found", self.describe()),
            )),
        }
    }

    fn consume_two_digits(&mut self) -> Result<u32> {
        Ok(self.consume_digit()? * 10 + self.consume_digit()?)
    }

    fn describe(&self) -> String {
        match self.c {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        }
    }

    fn is_separator(&self) -> bool {
        self.c.map_or(true, is_separator)
    }

    fn is_ws(&self) -> bool {
        self.c.map_or(false, is_ws)
    }

    fn skip_ws(&mut self) -> Result<()> {
        while self.is_ws() {
            self.advance()?;
        }
        Ok(())
    }

    /// Maximal run of code points up to whitespace, a separator or end of input.
    fn read_token(&mut self) -> Result<String> {
        let mut token = String::new();
        while let Some(ch) = self.c {
            if self.is_separator() || self.is_ws() {
                break;
            }
            token.push(ch);
            self.advance()?;
        }
        Ok(token)
    }

    fn read_value(&mut self) -> Result<Value> {
        match self.c {
            Some('"') => self.read_string().map(Value::String),
            Some('[') => self.read_list().map(Value::List),
            Some('{') => self.read_map().map(Value::Map),
            Some('+' | '-' | '0'..='9') => self.read_number().map(Value::Number),
            Some('@') => self.read_temporal().map(Value::Temporal),
            Some('|') => self.read_bytes().map(Value::Binary),
            Some('*') => self.read_base64().map(Value::Binary),
            Some('&') => self.read_constant(),
            Some(c) if is_identifier_start(c) => self.read_record().map(Value::Record),
            Some(c) => Err(Error::syntax(
                self.pos,
                &format!("unexpected character '{}'", c),
            )),
            None => Err(Error::syntax(self.pos, "value expected but end of input found")),
        }
    }

    fn read_constant(&mut self) -> Result<Value> {
        self.advance()?; // &
        let value = match self.c {
            Some('n') => Value::Null,
            Some('t') => Value::Bool(true),
            Some('f') => Value::Bool(false),
            other => {
                return Err(Error::InvalidConstant {
                    pos: self.pos,
                    found: other.map(String::from).unwrap_or_default(),
                })
            }
        };
        self.advance()?;
        Ok(value)
    }

    fn read_number(&mut self) -> Result<Number> {
        let token = self.read_token()?;
        token.parse().map_err(|_| Error::InvalidNumber {
            pos: self.pos,
            token,
        })
    }

    fn read_string(&mut self) -> Result<String> {
        self.advance()?; // "
        let mut s = String::new();
        loop {
            match self.c {
                None => return Err(Error::syntax(self.pos, "unterminated string")),
                Some('"') => {
                    self.advance()?;
                    return Ok(s);
                }
                Some('\\') => {
                    self.advance()?;
                    match self.c {
                        Some('"') => s.push('"'),
                        Some('\\') => s.push('\\'),
                        Some('n') => s.push('\n'),
                        Some('r') => s.push('\r'),
                        Some('t') => s.push('\t'),
                        Some('u') => {
                            self.advance()?;
                            s.push(self.read_unicode_escape()?);
                            continue;
                        }
                        Some(other) => {
                            return Err(Error::InvalidEscape {
                                pos: self.pos,
                                escape: other.to_string(),
                            })
                        }
                        None => return Err(Error::syntax(self.pos, "unterminated string")),
                    }
                    self.advance()?;
                }
                Some(ch) => {
                    s.push(ch);
                    self.advance()?;
                }
            }
        }
    }

    fn read_hex_digit(&mut self) -> Result<u32> {
        match self.c.and_then(|c| c.to_digit(16)) {
            Some(d) => {
                self.advance()?;
                Ok(d)
            }
            None => Err(Error::syntax(
                self.pos,
                &format!("invalid hex digit {}", self.describe()),
            )),
        }
    }

    fn read_hex_unit(&mut self) -> Result<u32> {
        let mut unit = 0;
        for _ in 0..4 {
            unit = (unit << 4) | self.read_hex_digit()?;
        }
        Ok(unit)
    }

    /// Reads the four hex digits after `\u`, combining a surrogate pair written as
    /// two consecutive escapes.
    fn read_unicode_escape(&mut self) -> Result<char> {
        let unit = self.read_hex_unit()?;
        let cp = match unit {
            0xD800..=0xDBFF => {
                if !(self.consume('\\')? && self.consume('u')?) {
                    return Err(self.lone_surrogate(unit));
                }
                let low = self.read_hex_unit()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.lone_surrogate(unit));
                }
                0x1_0000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.lone_surrogate(unit)),
            _ => unit,
        };
        char::from_u32(cp).ok_or_else(|| self.lone_surrogate(unit))
    }

    fn lone_surrogate(&self, unit: u32) -> Error {
        Error::InvalidEscape {
            pos: self.pos,
            escape: format!("u{:04X}", unit),
        }
    }

    fn read_list(&mut self) -> Result<Vec<Value>> {
        self.advance()?; // [
        let mut list = Vec::new();
        self.skip_ws()?;
        if !self.consume(']')? {
            loop {
                self.skip_ws()?;
                list.push(self.read_value()?);
                self.skip_ws()?;
                if !self.consume(',')? {
                    break;
                }
            }
            self.consume_or_error(']')?;
        }
        Ok(list)
    }

    fn read_map(&mut self) -> Result<SigmaMap> {
        self.advance()?; // {
        let mut map = SigmaMap::new();
        self.skip_ws()?;
        if !self.consume('}')? {
            loop {
                self.skip_ws()?;
                let key = self.read_value()?;
                self.skip_ws()?;
                self.consume_or_error('=')?;
                self.skip_ws()?;
                let value = self.read_value()?;
                self.skip_ws()?;
                map.insert(key, value);
                if !self.consume(',')? {
                    break;
                }
            }
            self.consume_or_error('}')?;
        }
        Ok(map)
    }

    /// `|len|` followed by exactly `len` raw bytes.
    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.advance()?; // |
        if !self.is_digit() {
            return Err(Error::syntax(
                self.pos,
                &format!("digit expected but {} found", self.describe()),
            ));
        }
        let mut len: usize = 0;
        while let Some(d) = self.c.and_then(|c| c.to_digit(10)) {
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add(d as usize))
                .ok_or_else(|| Error::syntax(self.pos, "binary length out of range"))?;
            self.advance()?;
        }
        // the closing '|' is the current lookahead; the payload starts at the next byte
        if self.c != Some('|') {
            return Err(Error::syntax(
                self.pos,
                &format!("'|' expected but {} found", self.describe()),
            ));
        }
        let mut payload = Vec::new();
        let found = (&mut self.input).take(len as u64).read_to_end(&mut payload)?;
        self.pos += found;
        if found < len {
            return Err(Error::TruncatedBinary {
                pos: self.pos,
                expected: len,
                found,
            });
        }
        self.advance()?;
        Ok(payload)
    }

    fn read_base64(&mut self) -> Result<Vec<u8>> {
        self.advance()?; // *
        let token = self.read_token()?;
        STANDARD_NO_PAD
            .decode(token.as_bytes())
            .map_err(|err| Error::InvalidBase64 {
                pos: self.pos,
                msg: err.to_string(),
            })
    }

    fn read_temporal(&mut self) -> Result<Temporal> {
        enum State {
            Leading,
            Time(u32),
            Offset,
            Done,
        }

        self.advance()?; // @
        let mut parts = TemporalParts::default();
        let mut state = State::Leading;
        loop {
            state = match state {
                // yyyy or hh
                State::Leading => {
                    let lead = self.consume_two_digits()?;
                    if self.consume(':')? {
                        State::Time(lead)
                    } else {
                        let year = lead * 100 + self.consume_two_digits()?;
                        self.consume_or_error('-')?;
                        let month = self.consume_two_digits()?;
                        self.consume_or_error('-')?;
                        let day = self.consume_two_digits()?;
                        parts.date = Some((year, month, day));
                        if self.consume('T')? {
                            let hour = self.consume_two_digits()?;
                            self.consume_or_error(':')?;
                            State::Time(hour)
                        } else {
                            State::Done
                        }
                    }
                }
                // mm:ss[.fffffffff], hour already read
                State::Time(hour) => {
                    let minute = self.consume_two_digits()?;
                    self.consume_or_error(':')?;
                    let second = self.consume_two_digits()?;
                    let nanos = self.read_fraction()?;
                    parts.time = Some((hour, minute, second, nanos));
                    if matches!(self.c, Some('+' | '-' | 'Z')) {
                        State::Offset
                    } else {
                        State::Done
                    }
                }
                State::Offset => {
                    if self.consume('Z')? {
                        parts.offset = Some((false, 0, 0));
                    } else {
                        let negative = self.c == Some('-');
                        self.advance()?;
                        let hours = self.consume_two_digits()?;
                        self.consume_or_error(':')?;
                        let minutes = self.consume_two_digits()?;
                        parts.offset = Some((negative, hours, minutes));
                    }
                    if self.c == Some('[') && parts.date.is_none() {
                        return Err(Error::syntax(
                            self.pos,
                            "time zone not allowed on a time without a date",
                        ));
                    }
                    if self.consume('[')? {
                        parts.zone = Some(self.read_token()?);
                        self.consume_or_error(']')?;
                    }
                    State::Done
                }
                State::Done => break,
            };
        }

        let pos = self.pos;
        parts.build().map_err(|err| match err {
            TemporalError::Invalid => Error::InvalidDateTime { pos },
            TemporalError::UnknownZone(zone) => Error::InvalidTimeZone { pos, zone },
        })
    }

    /// Fractional seconds as nanoseconds; `.7` is 700,000,000.
    fn read_fraction(&mut self) -> Result<u32> {
        if !self.consume('.')? {
            return Ok(0);
        }
        let mut multiplier = 100_000_000;
        let mut nanos = self.consume_digit()? * multiplier;
        while self.is_digit() {
            multiplier /= 10;
            if multiplier == 0 {
                return Err(Error::InvalidFraction { pos: self.pos });
            }
            nanos += self.consume_digit()? * multiplier;
        }
        Ok(nanos)
    }

    fn read_record(&mut self) -> Result<RecordValue> {
        let name = self.read_token()?;
        self.skip_ws()?;
        self.consume_or_error('{')?;
        let record_type = Types::resolve_by_name(&name).ok_or_else(|| Error::UnknownType {
            pos: self.pos,
            name: name.clone(),
        })?;
        tracing::trace!(name = %name, rust_type = record_type.rust_name(), "reading record");

        let mut record = RecordValue::from_boxed(record_type.create());
        self.skip_ws()?;
        if !self.consume('}')? {
            loop {
                self.read_record_field(&mut record, record_type.name())?;
                if !self.consume(',')? {
                    break;
                }
            }
            self.consume_or_error('}')?;
        }
        Ok(record)
    }

    fn read_record_field(&mut self, record: &mut RecordValue, type_name: &str) -> Result<()> {
        self.skip_ws()?;
        let field = self.read_token()?;
        if field.is_empty() {
            return Err(Error::syntax(
                self.pos,
                &format!("field name expected but {} found", self.describe()),
            ));
        }
        self.skip_ws()?;
        self.consume_or_error('=')?;
        self.skip_ws()?;
        let value = self.read_value()?;
        self.skip_ws()?;

        let failure = match record.assign(&field, value) {
            Assign::Done => return Ok(()),
            Assign::Unknown => {
                return Err(Error::UnknownField {
                    pos: self.pos,
                    type_name: type_name.to_string(),
                    field,
                })
            }
            Assign::ReadOnly => Error::custom("property is read-only"),
            Assign::Failed(err) => err,
        };
        Err(Error::FieldAssignment {
            pos: self.pos,
            type_name: type_name.to_string(),
            field,
            source: Box::new(failure),
        })
    }
}

/// Deserializes a `T` from a [`Value`] tree through serde.
///
/// Maps feed structs by key, strings and single-entry maps feed enums, and binary
/// values feed byte buffers. Records are presented as maps of their written fields.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use sigma::{from_str, from_value, Value};
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = from_str(r#"{"x"=1,"y"=2}"#).unwrap().unwrap();
/// let point: Point = from_value(value).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<Value, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: SigmaMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: Value,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::List(list)) => visitor.visit_seq(SeqDeserializer::new(list)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Map(map)) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

fn record_to_map(record: &RecordValue) -> Result<SigmaMap> {
    Ok(record
        .fields()?
        .into_iter()
        .map(|(name, value)| (Value::from(name), value))
        .collect())
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(i) = n.to_i64_exact() {
                    visitor.visit_i64(i)
                } else if let Some(u) = n.to_u128_exact().and_then(|u| u64::try_from(u).ok()) {
                    visitor.visit_u64(u)
                } else {
                    visitor.visit_f64(n.to_f64())
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Binary(b) => visitor.visit_byte_buf(b),
            Value::Temporal(t) => visitor.visit_string(t.to_string()),
            Value::List(list) => visitor.visit_seq(SeqDeserializer::new(list)),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Value::Record(record) => visitor.visit_map(MapDeserializer::new(record_to_map(&record)?)),
        }
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &self.value {
            Value::Number(n) => match n.to_i128_exact() {
                Some(i) => visitor.visit_i128(i),
                None => Err(Error::precision_loss(n, "i128")),
            },
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &self.value {
            Value::Number(n) => match n.to_u128_exact() {
                Some(u) => visitor.visit_u128(u),
                None => Err(Error::precision_loss(n, "u128")),
            },
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Map(map) if map.len() == 1 => match map.into_iter().next() {
                Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                }),
                None => Err(Error::custom("expected enum variant")),
            },
            _ => Err(Error::custom("expected enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn read(input: &str) -> Result<Option<Value>> {
        Reader::from_str(input).read()
    }

    #[test]
    fn test_constants() {
        assert_eq!(read("&t").unwrap(), Some(Value::Bool(true)));
        assert_eq!(read("&f").unwrap(), Some(Value::Bool(false)));
        assert_eq!(read("&n").unwrap(), Some(Value::Null));
        let err = read("&x").unwrap_err();
        assert!(err.to_string().contains("invalid constant"));
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_empty_input_is_no_value() {
        assert_eq!(read("").unwrap(), None);
        assert_eq!(read(" \t\r\n").unwrap(), None);
    }

    #[test]
    fn test_string_escapes() {
        let value = read(r#""a\"b\\c\nd\re\tfé€""#).unwrap().unwrap();
        assert_eq!(value.as_str(), Some("a\"b\\c\nd\re\tfé€"));
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let value = read(r#""\uD83D\uDE00""#).unwrap().unwrap();
        assert_eq!(value.as_str(), Some("😀"));
        assert!(matches!(read(r#""\uD83D""#), Err(Error::InvalidEscape { .. })));
    }

    #[test]
    fn test_invalid_escape() {
        let err = read(r#""\q""#).unwrap_err();
        assert!(matches!(err, Error::InvalidEscape { ref escape, .. } if escape == "q"));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(read("\"abc"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_fixed_binary() {
        assert_eq!(read("|3|abc").unwrap(), Some(Value::Binary(b"abc".to_vec())));
        assert_eq!(read("|0|").unwrap(), Some(Value::Binary(Vec::new())));
        // payload bytes are raw, not UTF-8 decoded
        let mut input = b"[|2|".to_vec();
        input.extend_from_slice(&[0xFF, 0x80]);
        input.push(b']');
        let value = Reader::from_slice(&input).read().unwrap().unwrap();
        assert_eq!(value, Value::List(vec![Value::Binary(vec![0xFF, 0x80])]));
    }

    #[test]
    fn test_truncated_binary() {
        let err = read("|10|abc").unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedBinary {
                expected: 10,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_base64_binary() {
        assert_eq!(read("*").unwrap(), Some(Value::Binary(Vec::new())));
        assert_eq!(
            read("*VGhlIHF1aWNrIGJyb3duIGZveA").unwrap(),
            Some(Value::Binary(b"The quick brown fox".to_vec()))
        );
        assert!(matches!(read("*!!!"), Err(Error::InvalidBase64 { .. })));
    }

    #[test]
    fn test_numbers_keep_digits() {
        let value = read("-1.23e-97").unwrap().unwrap();
        assert_eq!(value, Value::Number("-1.23e-97".parse().unwrap()));
        assert_eq!(read("0").unwrap(), Some(Value::from(0)));
        assert!(matches!(read("1.2.3"), Err(Error::InvalidNumber { .. })));
        assert!(matches!(read("-"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_list_and_map_whitespace() {
        assert_eq!(read("[ \n ]").unwrap(), Some(Value::List(Vec::new())));
        let value = read("{ 1 = [ 2 , 3 ] , \"k\" = { } }").unwrap().unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(
            map.get(&Value::from(1)),
            Some(&Value::List(vec![Value::from(2), Value::from(3)]))
        );
        assert_eq!(map.get(&Value::from("k")), Some(&Value::Map(SigmaMap::new())));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(read("[1 2]"), Err(Error::Syntax { .. })));
        assert!(matches!(read("{1}"), Err(Error::Syntax { .. })));
        assert!(matches!(read("[1,"), Err(Error::Syntax { .. })));
        assert!(matches!(read("&t x"), Err(Error::TrailingInput { .. })));
        assert!(matches!(read("?"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_temporal_shapes() {
        let date = read("@2019-01-01").unwrap().unwrap();
        assert!(matches!(date, Value::Temporal(Temporal::Date(_))));

        let time = read("@12:31:47.7").unwrap().unwrap();
        match time {
            Value::Temporal(Temporal::Time(t)) => {
                assert_eq!(chrono::Timelike::nanosecond(&t), 700_000_000)
            }
            other => panic!("unexpected value: {:?}", other),
        }

        assert!(matches!(
            read("@12:31:47+11:00").unwrap(),
            Some(Value::Temporal(Temporal::OffsetTime(_)))
        ));
        assert!(matches!(
            read("@2019-01-01T12:31:47").unwrap(),
            Some(Value::Temporal(Temporal::DateTime(_)))
        ));
        assert!(matches!(
            read("@2019-01-01T12:31:47Z").unwrap(),
            Some(Value::Temporal(Temporal::OffsetDateTime(_)))
        ));
        assert!(matches!(
            read("@2019-01-01T12:31:47+11:00[Australia/Hobart]").unwrap(),
            Some(Value::Temporal(Temporal::ZonedDateTime(_)))
        ));
    }

    #[test]
    fn test_temporal_errors() {
        assert!(matches!(
            read("@12:00:00.1234567891"),
            Err(Error::InvalidFraction { .. })
        ));
        assert!(matches!(read("@2019-02-29"), Err(Error::InvalidDateTime { .. })));
        assert!(matches!(read("@25:00:00"), Err(Error::InvalidDateTime { .. })));
        let err = read("@2019-01-01T00:00:00+10:00[Australia/Bogansville]").unwrap_err();
        assert!(err.to_string().contains("time zone"));
        assert!(matches!(read("@2019/01/01"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_unregistered_record_type() {
        let err = read("de_tests_unknown{a=1}").unwrap_err();
        assert!(err.to_string().contains("is not registered"));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Reader::from_slice(&[b'"', 0xFF, b'"']).read().unwrap_err();
        assert!(matches!(err, Error::Encoding { pos: 2, .. }));
    }

    #[test]
    fn test_from_value_struct_and_enum() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Shape {
            Dot,
            Circle { r: f64 },
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Drawing {
            name: String,
            shapes: Vec<Shape>,
            note: Option<String>,
        }

        let value = read(r#"{"name"="d","shapes"=["Dot",{"Circle"={"r"=1.5}}],"note"=&n}"#)
            .unwrap()
            .unwrap();
        let drawing: Drawing = from_value(value).unwrap();
        assert_eq!(
            drawing,
            Drawing {
                name: "d".into(),
                shapes: vec![Shape::Dot, Shape::Circle { r: 1.5 }],
                note: None,
            }
        );
    }
}

//! Sigma writing.
//!
//! This module provides the [`Writer`], which renders a [`Value`] tree as Sigma text
//! on any [`std::io::Write`] sink, and [`to_value`], which turns any serde
//! `Serialize` type into a `Value`.
//!
//! ## Overview
//!
//! The writer emits the compact form only: no whitespace is ever written.
//!
//! - **Strings**: `"` and `\` are escaped, so are `\n \r \t`; other control
//!   characters become `\u00XX`
//! - **Numbers**: canonical decimal form, exponent notation for very small or
//!   scaled values
//! - **Binary**: `|len|` plus raw bytes by default, or `*` plus unpadded base64 when
//!   raw binary is disabled
//! - **Records**: `name{field=value,...}` using the registered name
//!
//! ## Usage
//!
//! ```rust
//! use sigma::{to_string, to_string_with_options, Value, WriterOptions};
//!
//! let list = Value::List(vec![Value::from(1), Value::from("two"), Value::Null]);
//! assert_eq!(to_string(&list).unwrap(), r#"[1,"two",&n]"#);
//!
//! let bytes = Value::Binary(b"abc".to_vec());
//! assert_eq!(to_string(&bytes).unwrap(), "|3|abc");
//! assert_eq!(to_string_with_options(&bytes, WriterOptions::base64()).unwrap(), "*YWJj");
//! ```

use crate::{utf8, Error, Number, RecordValue, Result, SigmaMap, Temporal, Types, Value, WriterOptions};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde::{ser, Serialize};
use std::io::Write;

/// The Sigma writer.
///
/// Wraps an output sink. Each call to [`Writer::write`] emits one complete value;
/// the sink is not flushed.
pub struct Writer<W> {
    output: W,
    options: WriterOptions,
    written: usize,
}

impl<W: Write> Writer<W> {
    pub fn new(output: W) -> Self {
        Self::with_options(output, WriterOptions::default())
    }

    pub fn with_options(output: W, options: WriterOptions) -> Self {
        Writer {
            output,
            options,
            written: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    /// Writes `value` using this writer's options.
    ///
    /// # Errors
    ///
    /// [`Error::UnregisteredType`] for a record whose type has no registered name,
    /// [`Error::Encoding`] for a temporal value with no Sigma text form (see
    /// [`Temporal::unwritable_reason`]), [`Error::Io`] when the sink fails.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        let allow_raw_binary = self.options.allow_raw_binary;
        self.write_with(value, allow_raw_binary)
    }

    /// Writes `value`, overriding the binary encoding for this call only.
    pub fn write_with(&mut self, value: &Value, allow_raw_binary: bool) -> Result<()> {
        match value {
            Value::Null => self.write_str("&n"),
            Value::Bool(true) => self.write_str("&t"),
            Value::Bool(false) => self.write_str("&f"),
            Value::Number(n) => self.write_number(n),
            Value::String(s) => self.write_string(s),
            Value::Binary(b) => self.write_binary(b, allow_raw_binary),
            Value::Temporal(t) => self.write_temporal(t),
            Value::List(list) => self.write_list(list, allow_raw_binary),
            Value::Map(map) => self.write_map(map, allow_raw_binary),
            Value::Record(record) => self.write_record(record, allow_raw_binary),
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        let encoded = utf8::encode(ch as u32, &mut buf)?;
        self.output.write_all(encoded)?;
        self.written += encoded.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        s.chars().try_for_each(|ch| self.write_char(ch))
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_char('"')?;
        for ch in s.chars() {
            match ch {
                '"' => self.write_str("\\\"")?,
                '\\' => self.write_str("\\\\")?,
                '\n' => self.write_str("\\n")?,
                '\r' => self.write_str("\\r")?,
                '\t' => self.write_str("\\t")?,
                c if (c as u32) < 0x20 => self.write_str(&format!("\\u{:04X}", c as u32))?,
                c => self.write_char(c)?,
            }
        }
        self.write_char('"')
    }

    fn write_number(&mut self, n: &Number) -> Result<()> {
        self.write_str(&n.to_string())
    }

    fn write_temporal(&mut self, t: &Temporal) -> Result<()> {
        if let Some(reason) = t.unwritable_reason() {
            return Err(Error::encoding(
                self.written,
                &format!("cannot write {} {:?}: {}", t.kind(), t, reason),
            ));
        }
        self.write_char('@')?;
        self.write_str(&t.to_string())
    }

    fn write_binary(&mut self, bytes: &[u8], allow_raw_binary: bool) -> Result<()> {
        if allow_raw_binary {
            self.write_str(&format!("|{}|", bytes.len()))?;
            self.write_raw(bytes)
        } else {
            self.write_char('*')?;
            let encoded = STANDARD_NO_PAD.encode(bytes);
            self.write_str(&encoded)
        }
    }

    fn write_list(&mut self, list: &[Value], allow_raw_binary: bool) -> Result<()> {
        self.write_char('[')?;
        for (i, element) in list.iter().enumerate() {
            if i > 0 {
                self.write_char(',')?;
            }
            self.write_with(element, allow_raw_binary)?;
        }
        self.write_char(']')
    }

    fn write_map(&mut self, map: &SigmaMap, allow_raw_binary: bool) -> Result<()> {
        self.write_char('{')?;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.write_char(',')?;
            }
            self.write_with(key, allow_raw_binary)?;
            self.write_char('=')?;
            self.write_with(value, allow_raw_binary)?;
        }
        self.write_char('}')
    }

    fn write_record(&mut self, record: &RecordValue, allow_raw_binary: bool) -> Result<()> {
        let record_type = Types::resolve_by_type_id(record.record_type_id())
            .ok_or_else(|| Error::UnregisteredType(record.rust_type_name().to_string()))?;
        self.write_str(record_type.name())?;
        self.write_char('{')?;
        for (i, (name, value)) in record.fields()?.iter().enumerate() {
            if i > 0 {
                self.write_char(',')?;
            }
            self.write_str(name)?;
            self.write_char('=')?;
            self.write_with(value, allow_raw_binary)?;
        }
        self.write_char('}')
    }
}

/// Converts any `Serialize` type into a [`Value`] tree.
///
/// Structs and maps become [`SigmaMap`]s in field order, sequences and tuples become
/// lists, byte buffers become binary, unit variants become strings and data-carrying
/// variants become single-entry maps keyed by the variant name.
///
/// # Errors
///
/// Fails for non-finite floating-point values, which have no Sigma number form.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use sigma::{to_value, Value};
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_map().and_then(|m| m.get(&Value::from("y"))), Some(&Value::from(2)));
/// ```
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Serde serializer that builds a [`Value`] instead of text.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: SigmaMap,
    current_key: Option<Value>,
    variant: Option<&'static str>,
}

fn float_value(v: f64) -> Result<Value> {
    Number::try_from(v)
        .map(Value::Number)
        .map_err(|_| Error::unsupported_coercion(&v.to_string(), "number"))
}

fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = SigmaMap::with_capacity(1);
            map.insert(Value::from(name), value);
            Value::Map(map)
        }
        None => value,
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        // through the shortest f32 text, so 0.1f32 stays 0.1
        v.to_string()
            .parse::<Number>()
            .map(Value::Number)
            .map_err(|_| Error::unsupported_coercion(&v.to_string(), "number"))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        float_value(v)
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(Some(variant), to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0), None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::List(self.vec))
    }
}

impl SerializeMap {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: SigmaMap::with_capacity(len),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Map(self.map))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // any value may be a key
        self.current_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

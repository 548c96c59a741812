//! Dynamic value representation for Sigma data.
//!
//! This module provides the [`Value`] enum which represents any value the reader can
//! produce or the writer can emit. It is the tree that sits between the wire format
//! and typed host values.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, number, string, binary, temporal, list, map or record
//! - [`Bytes`]: a byte buffer that converts to [`Value::Binary`] rather than a list
//! - [`ToValue`]: conversion of host values into a [`Value`] tree
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use sigma::{sigma, Value};
//!
//! let null = Value::Null;
//! let boolean = Value::from(true);
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let map = sigma!({ "name" => "Alice", "age" => 30 });
//! assert!(map.is_map());
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use sigma::Value;
//!
//! let value = Value::from(42);
//! let n = i64::try_from(value).unwrap();
//! assert_eq!(n, 42);
//!
//! // narrowing is exact or it fails
//! let value: Value = "4.5".parse::<sigma::Number>().unwrap().into();
//! assert!(i64::try_from(value).is_err());
//! ```

use crate::record::RecordValue;
use crate::temporal::{OffsetTime, Temporal};
use crate::{Error, Number, Result, SigmaMap};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::ops::Deref;

/// A dynamically-typed representation of any Sigma value.
///
/// Containers own their children exclusively; the grammar cannot express sharing or
/// cycles, and neither can this type.
///
/// # Examples
///
/// ```rust
/// use sigma::Value;
///
/// let list = Value::List(vec![Value::from(1), Value::from("two"), Value::Null]);
/// assert!(list.is_list());
/// assert_eq!(list.as_list().map(|l| l.len()), Some(3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Binary(Vec<u8>),
    Temporal(Temporal),
    List(Vec<Value>),
    Map(SigmaMap),
    Record(RecordValue),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Value::Temporal(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::Value;
    ///
    /// assert_eq!(Value::Bool(true).as_bool(), Some(true));
    /// assert_eq!(Value::from(42).as_bool(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is a number that converts exactly to `i64`, returns it.
    ///
    /// ```rust
    /// use sigma::{Number, Value};
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// let half: Number = "0.5".parse().unwrap();
    /// assert_eq!(Value::Number(half).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::to_i64_exact)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Value::Temporal(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&SigmaMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short description of the value's kind, used in coercion errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Temporal(t) => t.kind(),
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(r) => r.rust_type_name(),
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Binary(_) => 4,
            Value::Temporal(_) => 5,
            Value::List(_) => 6,
            Value::Map(_) => 7,
            Value::Record(_) => 8,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => n.hash(state),
            Value::String(s) => s.hash(state),
            Value::Binary(b) => b.hash(state),
            Value::Temporal(t) => t.hash(state),
            Value::List(list) => list.hash(state),
            // map equality ignores order, so only the size is stable
            Value::Map(map) => map.len().hash(state),
            Value::Record(record) => record.hash(state),
        }
    }
}

/// An owned byte buffer that converts to and from [`Value::Binary`].
///
/// `Vec<u8>` goes through the generic list conversions like any other `Vec<T>`, so
/// record fields holding binary data use `Bytes` instead.
///
/// ```rust
/// use sigma::{Bytes, ToValue, Value};
///
/// let bytes = Bytes::from(vec![1, 2, 3]);
/// assert_eq!(bytes.to_value().unwrap(), Value::Binary(vec![1, 2, 3]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    #[must_use]
    pub fn new() -> Self {
        Bytes(Vec::new())
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Bytes(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Bytes(value.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(value: Bytes) -> Self {
        value.0
    }
}

/// Conversion of a host value into a [`Value`] tree.
///
/// The writer accepts anything implementing `ToValue`. Conversion is fallible because
/// some host values have no Sigma form (a NaN float, for instance) and record getters
/// may fail.
pub trait ToValue {
    fn to_value(&self) -> Result<Value>;
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Result<Value> {
        (**self).to_value()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! impl_integer_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

impl_integer_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float_value {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = Error;

                fn try_from(value: $ty) -> Result<Self> {
                    Number::try_from(value)
                        .map(Value::Number)
                        .map_err(|_| Error::unsupported_coercion(&value.to_string(), "number"))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value> {
                    Value::try_from(*self)
                }
            }
        )*
    };
}

impl_float_value!(f32, f64);

impl ToValue for Number {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Number(self.clone()))
    }
}

impl ToValue for BigInt {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Number(Number::from(self.clone())))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }
}

impl ToValue for Bytes {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Binary(self.0.clone()))
    }
}

impl ToValue for Temporal {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Temporal(self.clone()))
    }
}

macro_rules! impl_temporal_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Temporal(Temporal::from(value))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::from(self.clone()))
                }
            }
        )*
    };
}

impl_temporal_value!(
    NaiveDate,
    NaiveTime,
    OffsetTime,
    NaiveDateTime,
    DateTime<FixedOffset>,
    DateTime<Tz>
);

impl ToValue for SigmaMap {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Map(self.clone()))
    }
}

impl ToValue for RecordValue {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Record(self.clone()))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value> {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Result<Value> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

fn map_to_value<'a, K, V, I>(entries: I) -> Result<Value>
where
    K: ToValue + 'a,
    V: ToValue + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| Ok::<_, Error>((k.to_value()?, v.to_value()?)))
        .collect::<Result<SigmaMap>>()
        .map(Value::Map)
}

impl<K: ToValue, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }
}

impl<K: ToValue, V: ToValue, S: BuildHasher> ToValue for IndexMap<K, V, S> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Binary(value.0)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Temporal> for Value {
    fn from(value: Temporal) -> Self {
        Value::Temporal(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<SigmaMap> for Value {
    fn from(value: SigmaMap) -> Self {
        Value::Map(value)
    }
}

impl From<RecordValue> for Value {
    fn from(value: RecordValue) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// Extraction goes through the coercion engine so narrowing rules stay in one place.
macro_rules! impl_try_from_value {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    crate::coerce(value)
                }
            }
        )*
    };
}

impl_try_from_value!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    Number, Bytes, Temporal
);

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.to_i64_exact() {
                    serializer.serialize_i64(i)
                } else if let Some(u) = n.to_u128_exact().and_then(|u| u64::try_from(u).ok()) {
                    serializer.serialize_u64(u)
                } else {
                    serializer.serialize_f64(n.to_f64())
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(b) => serializer.serialize_bytes(b),
            Value::Temporal(t) => serializer.collect_str(t),
            Value::List(list) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for element in list {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
            Value::Record(record) => {
                use serde::ser::{Error as _, SerializeMap};
                let fields = record.fields().map_err(S::Error::custom)?;
                let mut state = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in &fields {
                    state.serialize_entry(name, value)?;
                }
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid Sigma value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Value::try_from(value).map_err(E::custom)
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Self::Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Self::Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
                while let Some(element) = seq.next_element()? {
                    list.push(element);
                }
                Ok(Value::List(list))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = SigmaMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Map(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

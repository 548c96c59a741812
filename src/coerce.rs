//! Type coercion engine.
//!
//! The reader produces generic values: every number is an exact [`Number`], every
//! map is a [`SigmaMap`], every list a `Vec<Value>`. [`Coerce`] narrows such a value
//! to the type a record field or caller actually asks for.
//!
//! Rules:
//!
//! 1. A value already of the target shape passes through.
//! 2. Numbers narrow to integer targets only when exact; a fractional part or an
//!    out-of-range magnitude fails with [`Error::PrecisionLoss`]. Floating targets
//!    always succeed with IEEE rounding.
//! 3. Lists and maps are rebuilt as the target container, coercing each element.
//! 4. Anything else fails with [`Error::UnsupportedCoercion`] naming both types.
//!
//! ```rust
//! use sigma::{coerce, Number, Value};
//!
//! let whole: Number = "4.000".parse().unwrap();
//! assert_eq!(coerce::<u8>(Value::Number(whole)).unwrap(), 4);
//!
//! let fraction: Number = "4.5".parse().unwrap();
//! assert!(coerce::<u8>(Value::Number(fraction)).is_err());
//!
//! let list = Value::List(vec![Value::from(1), Value::from(2)]);
//! assert_eq!(coerce::<Vec<i64>>(list).unwrap(), vec![1, 2]);
//! ```

use crate::temporal::{OffsetTime, Temporal};
use crate::{Bytes, Error, Number, RecordValue, Result, SigmaMap, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use indexmap::IndexMap;
use std::any::type_name;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};

/// Conversion from a generic [`Value`] into a typed host value.
pub trait Coerce: Sized {
    fn coerce(value: Value) -> Result<Self>;
}

/// Coerces `value` to `T`.
///
/// # Errors
///
/// [`Error::PrecisionLoss`] when a number does not fit the target exactly,
/// [`Error::UnsupportedCoercion`] when the value has the wrong shape.
pub fn coerce<T: Coerce>(value: Value) -> Result<T> {
    T::coerce(value)
}

fn unsupported<T>(value: &Value) -> Error {
    Error::unsupported_coercion(value.type_name(), type_name::<T>())
}

impl Coerce for Value {
    fn coerce(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl Coerce for bool {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

macro_rules! impl_coerce_signed {
    ($($ty:ty),*) => {
        $(
            impl Coerce for $ty {
                fn coerce(value: Value) -> Result<Self> {
                    match value {
                        Value::Number(n) => n
                            .to_i128_exact()
                            .and_then(|i| <$ty>::try_from(i).ok())
                            .ok_or_else(|| Error::precision_loss(&n, type_name::<$ty>())),
                        other => Err(unsupported::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_coerce_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Coerce for $ty {
                fn coerce(value: Value) -> Result<Self> {
                    match value {
                        Value::Number(n) => n
                            .to_u128_exact()
                            .and_then(|u| <$ty>::try_from(u).ok())
                            .ok_or_else(|| Error::precision_loss(&n, type_name::<$ty>())),
                        other => Err(unsupported::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

impl_coerce_signed!(i8, i16, i32, i64, i128, isize);
impl_coerce_unsigned!(u8, u16, u32, u64, u128, usize);

impl Coerce for f64 {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n.to_f64()),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for f32 {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n.to_f32()),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for Number {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for String {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for Bytes {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Binary(b) => Ok(Bytes(b)),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for Temporal {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Temporal(t) => Ok(t),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

macro_rules! impl_coerce_temporal {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Coerce for $ty {
                fn coerce(value: Value) -> Result<Self> {
                    match value {
                        Value::Temporal(Temporal::$variant(t)) => Ok(t),
                        other => Err(unsupported::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

impl_coerce_temporal!(
    NaiveDate => Date,
    NaiveTime => Time,
    OffsetTime => OffsetTime,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    DateTime<Tz> => ZonedDateTime,
);

impl Coerce for SigmaMap {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl Coerce for RecordValue {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Record(record) => Ok(record),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other).map(Some),
        }
    }
}

impl<T: Coerce> Coerce for Box<T> {
    fn coerce(value: Value) -> Result<Self> {
        T::coerce(value).map(Box::new)
    }
}

impl<T: Coerce> Coerce for Vec<T> {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::coerce).collect(),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

impl<T: Coerce> Coerce for VecDeque<T> {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::coerce).collect(),
            other => Err(unsupported::<Self>(&other)),
        }
    }
}

fn coerce_entries<K, V, M>(value: Value) -> Result<M>
where
    K: Coerce,
    V: Coerce,
    M: FromIterator<(K, V)>,
{
    match value {
        Value::Map(map) => map
            .into_iter()
            .map(|(k, v)| Ok::<_, Error>((K::coerce(k)?, V::coerce(v)?)))
            .collect(),
        other => Err(unsupported::<M>(&other)),
    }
}

impl<K, V, S> Coerce for HashMap<K, V, S>
where
    K: Coerce + Eq + Hash,
    V: Coerce,
    S: BuildHasher + Default,
{
    fn coerce(value: Value) -> Result<Self> {
        coerce_entries(value)
    }
}

impl<K: Coerce + Ord, V: Coerce> Coerce for BTreeMap<K, V> {
    fn coerce(value: Value) -> Result<Self> {
        coerce_entries(value)
    }
}

impl<K, V, S> Coerce for IndexMap<K, V, S>
where
    K: Coerce + Eq + Hash,
    V: Coerce,
    S: BuildHasher + Default,
{
    fn coerce(value: Value) -> Result<Self> {
        coerce_entries(value)
    }
}

//! Named records.
//!
//! A record is a host type that appears on the wire as `name{field=value,...}`. Rather
//! than discovering fields at runtime, each record type supplies a static table of
//! [`Field`] descriptors through the [`Record`] trait. The [`sigma_record!`] macro
//! writes that table (and the matching [`Coerce`](crate::Coerce) and
//! [`ToValue`] impls) for plain structs.
//!
//! Inside a [`Value`] tree a record is carried type-erased as a [`RecordValue`], which
//! can be downcast back to the concrete type.
//!
//! ```rust
//! use sigma::{sigma_record, RecordValue};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! sigma_record!(Point { x, y });
//!
//! let record = RecordValue::new(Point { x: 1, y: 2 });
//! let fields = record.fields().unwrap();
//! assert_eq!(fields[0].0, "x");
//! assert_eq!(record.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
//! ```
//!
//! [`sigma_record!`]: crate::sigma_record

use crate::{Error, Result, Value};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Descriptor for one field of a record type.
///
/// A field without a setter is read-only: the writer never emits it and the reader
/// refuses to assign it.
pub struct Field<T> {
    name: &'static str,
    get: fn(&T) -> Result<Value>,
    set: Option<fn(&mut T, Value) -> Result<()>>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl<T> Field<T> {
    /// Creates a read-write field.
    #[must_use]
    pub const fn new(
        name: &'static str,
        get: fn(&T) -> Result<Value>,
        set: fn(&mut T, Value) -> Result<()>,
    ) -> Self {
        Field {
            name,
            get,
            set: Some(set),
        }
    }

    /// Creates a field that can be read but never assigned or written.
    #[must_use]
    pub const fn read_only(name: &'static str, get: fn(&T) -> Result<Value>) -> Self {
        Field {
            name,
            get,
            set: None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    pub fn get(&self, record: &T) -> Result<Value> {
        (self.get)(record)
    }

    /// Whether `name` refers to this field, ignoring case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        names_match(self.name, name)
    }
}

pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// A host type with a statically declared field table.
///
/// `fields` returns the descriptors in declaration order; the writer emits writable
/// fields in that order. Implementations are normally generated by
/// [`sigma_record!`](crate::sigma_record).
pub trait Record: Any + Clone + fmt::Debug + Default + PartialEq + Send + Sync {
    fn fields() -> Vec<Field<Self>>;
}

/// Outcome of assigning one field by name.
pub(crate) enum Assign {
    Done,
    Unknown,
    ReadOnly,
    Failed(Error),
}

/// Object-safe view of a [`Record`].
pub(crate) trait AnyRecord: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn AnyRecord>;
    fn eq_dyn(&self, other: &dyn AnyRecord) -> bool;
    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn record_type_id(&self) -> TypeId;
    fn rust_type_name(&self) -> &'static str;
    fn field_values(&self) -> Result<Vec<(&'static str, Value)>>;
    fn assign(&mut self, name: &str, value: Value) -> Assign;
}

impl<T: Record> AnyRecord for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyRecord> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn AnyRecord) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn record_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn field_values(&self) -> Result<Vec<(&'static str, Value)>> {
        T::fields()
            .into_iter()
            .filter(|field| field.is_writable())
            .map(|field| field.get(self).map(|value| (field.name, value)))
            .collect()
    }

    fn assign(&mut self, name: &str, value: Value) -> Assign {
        let field = match T::fields().into_iter().find(|field| field.matches(name)) {
            Some(field) => field,
            None => return Assign::Unknown,
        };
        match field.set {
            Some(set) => match set(self, value) {
                Ok(()) => Assign::Done,
                Err(err) => Assign::Failed(err),
            },
            None => Assign::ReadOnly,
        }
    }
}

/// A type-erased record held inside a [`Value`].
pub struct RecordValue(Box<dyn AnyRecord>);

impl RecordValue {
    /// Wraps a concrete record.
    #[must_use]
    pub fn new<T: Record>(record: T) -> Self {
        RecordValue(Box::new(record))
    }

    pub(crate) fn from_boxed(inner: Box<dyn AnyRecord>) -> Self {
        RecordValue(inner)
    }

    #[must_use]
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    #[must_use]
    pub fn is<T: Record>(&self) -> bool {
        self.record_type_id() == TypeId::of::<T>()
    }

    /// Recovers the concrete record, handing the value back if the type differs.
    pub fn downcast<T: Record>(self) -> std::result::Result<T, Self> {
        match self.downcast_ref::<T>() {
            Some(record) => Ok(record.clone()),
            None => Err(self),
        }
    }

    #[must_use]
    pub fn record_type_id(&self) -> TypeId {
        self.0.record_type_id()
    }

    /// Fully qualified Rust name of the record type.
    #[must_use]
    pub fn rust_type_name(&self) -> &'static str {
        self.0.rust_type_name()
    }

    /// Current values of the writable fields, in declaration order.
    pub fn fields(&self) -> Result<Vec<(&'static str, Value)>> {
        self.0.field_values()
    }

    pub(crate) fn assign(&mut self, name: &str, value: Value) -> Assign {
        self.0.assign(name, value)
    }
}

impl Clone for RecordValue {
    fn clone(&self) -> Self {
        RecordValue(self.0.clone_box())
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl Eq for RecordValue {}

impl Hash for RecordValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_type_id().hash(state);
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_dyn(f)
    }
}

impl<T: Record> From<T> for RecordValue {
    fn from(record: T) -> Self {
        RecordValue::new(record)
    }
}

/// Converts a record to a [`Value`]; used by generated `ToValue` impls.
pub fn record_to_value<T: Record>(record: &T) -> Result<Value> {
    Ok(Value::Record(RecordValue::new(record.clone())))
}

/// Projects a [`Value`] onto a record type; used by generated `Coerce` impls.
///
/// A record of the same type passes through. A map with field-name keys is assigned
/// field by field, mirroring what the reader does for a record literal.
pub fn record_from_value<T: Record>(value: Value) -> Result<T> {
    let target = std::any::type_name::<T>();
    match value {
        Value::Record(record) => {
            let found = record.rust_type_name();
            record
                .downcast::<T>()
                .map_err(|_| Error::unsupported_coercion(found, target))
        }
        Value::Map(map) => {
            let mut record = T::default();
            for (key, value) in map {
                let name = match key {
                    Value::String(name) => name,
                    other => return Err(Error::unsupported_coercion(other.type_name(), target)),
                };
                match record.assign(&name, value) {
                    Assign::Done => {}
                    Assign::Unknown => {
                        return Err(Error::custom(format!(
                            "unable to find property {}.{}",
                            target, name
                        )))
                    }
                    Assign::ReadOnly => {
                        return Err(Error::custom(format!(
                            "unable to set read-only property {}.{}",
                            target, name
                        )))
                    }
                    Assign::Failed(err) => return Err(err),
                }
            }
            Ok(record)
        }
        other => Err(Error::unsupported_coercion(other.type_name(), target)),
    }
}

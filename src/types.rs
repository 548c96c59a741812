//! Process-wide record type registry.
//!
//! Record literals name their type on the wire. The reader resolves that name to a
//! Rust type to construct, and the writer resolves a record's Rust type back to the
//! name to emit. Both directions go through [`Types`], which is shared by every
//! reader and writer in the process and safe to use from any thread.
//!
//! Names are matched case-insensitively; the writer always emits the spelling given
//! at registration.
//!
//! ```rust
//! use sigma::{sigma_record, Types};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Account {
//!     id: u64,
//! }
//!
//! sigma_record!(Account { id });
//!
//! Types::register::<Account>("account").unwrap();
//! assert_eq!(Types::resolve_by_name("ACCOUNT").map(|t| t.name().to_string()), Some("account".into()));
//! assert!(Types::resolve_by_type::<Account>().is_some());
//! ```

use crate::de::is_identifier;
use crate::record::{AnyRecord, Record};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered record type.
#[derive(Clone)]
pub struct RecordType {
    name: Arc<str>,
    type_id: TypeId,
    rust_name: &'static str,
    create: fn() -> Box<dyn AnyRecord>,
}

impl RecordType {
    /// The name written on the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// A default-constructed instance, ready for field assignment.
    pub(crate) fn create(&self) -> Box<dyn AnyRecord> {
        (self.create)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, RecordType>,
    by_type: HashMap<TypeId, RecordType>,
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

fn create_default<T: Record>() -> Box<dyn AnyRecord> {
    Box::new(T::default())
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Name ↔ type associations used to resolve record tags.
pub struct Types;

impl Types {
    /// Associates `T` with `name`.
    ///
    /// Registering a type again points it at the new name; names registered earlier
    /// keep resolving to the type. Registering a name again points it at the new type.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTypeName`] when the reader could not parse `name` back as a
    /// record tag: it must start with a letter or `_` and contain no whitespace and
    /// none of `= , { } [ ]`.
    pub fn register<T: Record>(name: &str) -> Result<()> {
        if !is_identifier(name) {
            return Err(Error::InvalidTypeName(name.to_string()));
        }
        let record_type = RecordType {
            name: Arc::from(name),
            type_id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            create: create_default::<T>,
        };
        let mut registry = REGISTRY.write();
        registry
            .by_name
            .insert(name_key(name), record_type.clone());
        registry.by_type.insert(record_type.type_id, record_type);
        tracing::debug!(name, rust_type = std::any::type_name::<T>(), "registered record type");
        Ok(())
    }

    /// Looks up a type by its wire name, ignoring case.
    #[must_use]
    pub fn resolve_by_name(name: &str) -> Option<RecordType> {
        REGISTRY.read().by_name.get(&name_key(name)).cloned()
    }

    #[must_use]
    pub fn resolve_by_type<T: Record>() -> Option<RecordType> {
        Self::resolve_by_type_id(TypeId::of::<T>())
    }

    #[must_use]
    pub fn resolve_by_type_id(type_id: TypeId) -> Option<RecordType> {
        REGISTRY.read().by_type.get(&type_id).cloned()
    }

    /// Removes every registration.
    pub fn clear() {
        let mut registry = REGISTRY.write();
        let count = registry.by_type.len();
        registry.by_name.clear();
        registry.by_type.clear();
        tracing::debug!(count, "cleared record type registry");
    }
}

//! Ordered map type for Sigma maps.
//!
//! [`SigmaMap`] wraps an [`IndexMap`] keyed by [`Value`], so any value (numbers,
//! strings, dates, even lists) can be a key. Entries iterate in insertion order,
//! which makes the writer's output follow the order in which the reader saw them.
//!
//! ## Examples
//!
//! ```rust
//! use sigma::{SigmaMap, Value};
//!
//! let mut map = SigmaMap::new();
//! map.insert(Value::from("name"), Value::from("Alice"));
//! map.insert(Value::from(9), Value::from(9));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&Value::from("name")).and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Value;
use indexmap::IndexMap;

/// An insertion-ordered map from Sigma values to Sigma values.
///
/// Keys are unique by structural equality; inserting an existing key replaces its
/// value and keeps its original position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigmaMap(IndexMap<Value, Value>);

impl SigmaMap {
    /// Creates an empty `SigmaMap`.
    #[must_use]
    pub fn new() -> Self {
        SigmaMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        SigmaMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigma::{SigmaMap, Value};
    ///
    /// let mut map = SigmaMap::new();
    /// assert!(map.insert(Value::from("key"), Value::from(42)).is_none());
    /// assert!(map.insert(Value::from("key"), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Value, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.0.iter()
    }
}

impl IntoIterator for SigmaMap {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SigmaMap {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Value, Value)> for SigmaMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        SigmaMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_kept_on_overwrite() {
        let mut map = SigmaMap::new();
        map.insert(Value::from("a"), Value::from(1));
        map.insert(Value::from("b"), Value::from(2));
        map.insert(Value::from("a"), Value::from(3));

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(map.get(&Value::from("a")), Some(&Value::from(3)));
    }

    #[test]
    fn test_non_string_keys() {
        let map: SigmaMap = vec![
            (Value::from(9), Value::from(9)),
            (Value::List(vec![Value::Null]), Value::Bool(true)),
        ]
        .into_iter()
        .collect();
        assert!(map.contains_key(&Value::List(vec![Value::Null])));
        assert!(map.contains_key(&Value::from(9)));
    }
}

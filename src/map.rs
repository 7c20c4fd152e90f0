//! Ordered map type for CTON objects.
//!
//! This module provides [`CtonMap`], a wrapper around [`IndexMap`] that
//! maintains insertion order for object fields. CTON objects preserve key
//! order across the codec: the encoder writes pairs in the order the tree
//! holds them, and the decoder returns keys in the order the document
//! listed them.
//!
//! ## Why IndexMap?
//!
//! - **Deterministic output**: the same tree always encodes to the same
//!   bytes
//! - **Order preservation**: decode followed by re-encode reproduces the
//!   original pair order
//! - **Duplicate keys**: a repeated key on decode overwrites the value but
//!   keeps the first occurrence's position (later writes win)
//!
//! ## Examples
//!
//! ```rust
//! use cton::{CtonMap, Value};
//!
//! let mut map = CtonMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::Value;

/// An ordered map of string keys to CTON values.
///
/// # Examples
///
/// ```rust
/// use cton::{CtonMap, Value};
///
/// let mut map = CtonMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CtonMap(IndexMap<String, Value>);

impl CtonMap {
    /// Creates an empty `CtonMap`.
    #[must_use]
    pub fn new() -> Self {
        CtonMap(IndexMap::new())
    }

    /// Creates an empty `CtonMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        CtonMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for CtonMap {
    fn from(map: HashMap<String, Value>) -> Self {
        CtonMap(map.into_iter().collect())
    }
}

impl From<CtonMap> for HashMap<String, Value> {
    fn from(map: CtonMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for CtonMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CtonMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for CtonMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        CtonMap(IndexMap::from_iter(iter))
    }
}

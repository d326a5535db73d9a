//! Raw attribute store: the flat key/value state behind every model instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

/// Flat mapping of raw attribute name to raw value.
///
/// This is the only state that is serialized and the only state a snapshot
/// carries. Keys need not line up with cast attribute names: a single cast
/// attribute may read or write several raw keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttributes(BTreeMap<String, Value>);

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry mapping, the common shape of a one-key cast write.
    pub fn single(key: impl Into<String>, value: Value) -> Self {
        let mut attributes = Self::new();
        attributes.insert(key, value);
        attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw value for `key`, reading a missing key as `null`.
    pub fn value(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    /// Text value for `key`, if present and a string.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Overwrite every key present in `other`, returning the keys written.
    pub fn merge(&mut self, other: RawAttributes) -> Vec<String> {
        let mut written = Vec::with_capacity(other.len());
        for (key, value) in other.0 {
            written.push(key.clone());
            self.0.insert(key, value);
        }
        written
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for RawAttributes {
    fn from(map: BTreeMap<String, Value>) -> Self {
        RawAttributes(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawAttributes {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        RawAttributes(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for RawAttributes {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RawAttributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

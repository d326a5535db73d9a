//! Per-instance cache of resolved cast values.

use crate::value::CastValue;
use std::collections::{BTreeSet, HashMap};

/// Resolved rich values of one model instance, keyed by cast attribute name.
///
/// Alongside the values, the cache remembers which raw keys each attribute
/// last wrote (its backing keys). The engine uses them to drop entries when
/// one of those raw keys is overwritten directly, and to recognise multi-key
/// attributes whose logical name never appears in raw output. A value whose
/// backing keys are not known yet may depend on any raw key, so every raw
/// write drops it.
///
/// The cache never invalidates on its own; the owning model decides when.
#[derive(Debug, Default)]
pub struct CastCache {
    values: HashMap<String, CastValue>,
    backing_keys: HashMap<String, BTreeSet<String>>,
}

impl CastCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: &str) -> Option<&CastValue> {
        self.values.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: CastValue) {
        self.values.insert(attribute.into(), value);
    }

    /// Drop the cached value for `attribute`.
    pub fn forget(&mut self, attribute: &str) -> Option<CastValue> {
        self.values.remove(attribute)
    }

    /// Drop every cached value. Recorded backing keys are kept.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record the raw keys written by the latest cast write of `attribute`.
    pub fn record_backing_keys<I, K>(&mut self, attribute: &str, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.backing_keys.insert(
            attribute.to_string(),
            keys.into_iter().map(Into::into).collect(),
        );
    }

    pub fn backing_keys(&self, attribute: &str) -> Option<&BTreeSet<String>> {
        self.backing_keys.get(attribute)
    }

    /// True when `attribute` is known to be stored under other raw keys only.
    pub fn is_multi_key(&self, attribute: &str) -> bool {
        self.backing_keys
            .get(attribute)
            .is_some_and(|keys| !keys.is_empty() && !keys.contains(attribute))
    }

    /// Drop every cached value that may depend on `raw_key`, returning the
    /// attribute names that were invalidated, sorted.
    pub fn invalidate_raw_key(&mut self, raw_key: &str) -> Vec<String> {
        let mut stale: Vec<String> = self
            .values
            .keys()
            .filter(|attribute| {
                attribute.as_str() == raw_key
                    || self
                        .backing_keys
                        .get(attribute.as_str())
                        .map_or(true, |keys| keys.contains(raw_key))
            })
            .cloned()
            .collect();
        stale.sort();

        for attribute in &stale {
            self.values.remove(attribute);
        }
        stale
    }
}

//! Attribute access engine: cast reads, cast writes, cache invalidation and
//! raw serialization views for one model instance.

use crate::attributes::RawAttributes;
use crate::cache::CastCache;
use crate::caster::Caster;
use crate::error::{Error, Result};
use crate::observability::{CastMetrics, NoOpMetrics};
use crate::registry::CasterRegistry;
use crate::snapshot::ModelSnapshot;
use crate::value::CastValue;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// Per-type model declaration: a name and the attribute casts.
///
/// # Example
///
/// ```
/// use cast_kit::ModelDefinition;
///
/// struct User;
///
/// impl ModelDefinition for User {
///     fn model_name() -> &'static str {
///         "user"
///     }
///
///     fn casts() -> &'static [(&'static str, &'static str)] {
///         &[("password", "HashCaster"), ("options", "JsonCaster")]
///     }
/// }
///
/// assert_eq!(User::cast_definition("password"), Some("HashCaster"));
/// assert_eq!(User::cast_definition("name"), None);
/// ```
pub trait ModelDefinition: 'static {
    /// Name used in errors, logs and snapshots.
    fn model_name() -> &'static str;

    /// Attribute name to cast definition (`<identifier>[:<args>]`).
    fn casts() -> &'static [(&'static str, &'static str)];

    /// Declared cast definition for `key`, if any.
    fn cast_definition(key: &str) -> Option<&'static str> {
        Self::casts()
            .iter()
            .find(|(attribute, _)| *attribute == key)
            .map(|(_, definition)| *definition)
    }
}

/// Read-only view of a model instance handed to casters.
pub trait Model {
    fn model_name(&self) -> &str;

    fn raw_attributes(&self) -> &RawAttributes;

    fn cast_definition(&self, key: &str) -> Option<&str>;
}

/// Model instance backed by a raw attribute store, with cast attributes
/// resolved through a shared [`CasterRegistry`].
///
/// Each instance owns its raw store and its cast cache. Instances are not
/// internally synchronized; confine one to a thread or guard it with a lock.
///
/// # Example
///
/// ```ignore
/// let mut user = GenericModel::<User>::new(registry);
/// user.set_cast_attribute("password", "secret")?;
///
/// let hashed = user.get_cast_attribute("password")?;
/// assert_eq!(user.to_array().str("password"), hashed.as_str());
/// ```
pub struct GenericModel<D: ModelDefinition> {
    attributes: RawAttributes,
    cast_cache: CastCache,
    registry: Arc<CasterRegistry>,
    metrics: Arc<dyn CastMetrics>,
    _definition: PhantomData<fn() -> D>,
}

impl<D: ModelDefinition> GenericModel<D> {
    pub fn new(registry: Arc<CasterRegistry>) -> Self {
        Self::with_attributes(registry, RawAttributes::new())
    }

    /// Instance hydrated from existing raw attributes, with an empty cache.
    pub fn with_attributes(registry: Arc<CasterRegistry>, attributes: RawAttributes) -> Self {
        GenericModel {
            attributes,
            cast_cache: CastCache::new(),
            registry,
            metrics: Arc::new(NoOpMetrics),
            _definition: PhantomData,
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Arc<dyn CastMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<CasterRegistry> {
        &self.registry
    }

    pub fn has_cast(&self, key: &str) -> bool {
        D::cast_definition(key).is_some()
    }

    fn declared(&self, key: &str) -> Result<&'static str> {
        D::cast_definition(key).ok_or_else(|| Error::NotCast {
            model: D::model_name().to_string(),
            attribute: key.to_string(),
        })
    }

    /// Read a cast attribute.
    ///
    /// Served from the cast cache when present, so repeated reads return the
    /// same [`CastValue`] handle. Otherwise a bidirectional caster's `get` runs
    /// against the current raw value and the result is cached. Inbound-only
    /// casters have no read transform: the raw value is returned as-is and
    /// nothing is cached.
    ///
    /// # Errors
    ///
    /// - `Error::NotCast`: `key` has no cast declaration
    /// - `Error::UnknownCaster` / `Error::ConstructionError`: caster resolution failed
    /// - `Error::CastFailed`: the caster's `get` failed
    pub fn get_cast_attribute(&mut self, key: &str) -> Result<CastValue> {
        let definition = self.declared(key)?;

        if let Some(value) = self.cast_cache.get(key) {
            trace!("✓ Cast cache hit for {}.{}", D::model_name(), key);
            self.metrics.record_hit(key);
            return Ok(value.clone());
        }

        let caster = self.registry.resolve(key, definition)?;
        let raw = self.attributes.value(key);

        let caster = match caster {
            Caster::Bidirectional(caster) => caster,
            Caster::Inbound(_) => {
                trace!("Inbound-only cast for {}, returning raw value", key);
                return Ok(CastValue::new(raw.clone()));
            }
        };

        let timer = Instant::now();
        let value = match caster.get(&*self, key, raw, &self.attributes) {
            Ok(value) => value,
            Err(e) => {
                self.metrics.record_error(key, &e.to_string());
                return Err(Error::cast_failed(key, definition, e));
            }
        };

        debug!(
            "✗ Cast cache miss for {}.{}, decoded in {:?}",
            D::model_name(),
            key,
            timer.elapsed()
        );
        self.metrics.record_miss(key, timer.elapsed());
        self.cast_cache.insert(key, value.clone());
        Ok(value)
    }

    /// Write a cast attribute.
    ///
    /// The caster's `set` output overwrites the raw keys it names (possibly
    /// several, possibly keys other than `key`). Cached values depending on
    /// any written key are dropped and re-derived on the next read.
    ///
    /// # Errors
    ///
    /// - `Error::NotCast`: `key` has no cast declaration
    /// - `Error::UnknownCaster` / `Error::ConstructionError`: caster resolution failed
    /// - `Error::CastFailed`: the caster's `set` failed; the raw store is untouched
    pub fn set_cast_attribute(&mut self, key: &str, value: impl Into<CastValue>) -> Result<()> {
        let definition = self.declared(key)?;
        let caster = self.registry.resolve(key, definition)?;
        let value = value.into();

        let written = match caster.set(&*self, key, &value, &self.attributes) {
            Ok(write) => write.into_attributes(key),
            Err(e) => {
                self.metrics.record_error(key, &e.to_string());
                return Err(Error::cast_failed(key, definition, e));
            }
        };

        let keys = self.attributes.merge(written);
        self.cast_cache.forget(key);
        for raw_key in &keys {
            self.cast_cache.invalidate_raw_key(raw_key);
        }
        debug!(
            "» Cast write {}.{} -> [{}]",
            D::model_name(),
            key,
            keys.join(", ")
        );
        self.cast_cache.record_backing_keys(key, keys);
        Ok(())
    }

    /// Read any attribute: cast attributes go through the cast path, the
    /// rest return their raw value.
    pub fn get_attribute(&mut self, key: &str) -> Result<CastValue> {
        if self.has_cast(key) {
            self.get_cast_attribute(key)
        } else {
            Ok(CastValue::new(self.attributes.value(key).clone()))
        }
    }

    /// Write any attribute: cast attributes go through the cast path, the
    /// rest must carry a plain raw value.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<CastValue>) -> Result<()> {
        if self.has_cast(key) {
            return self.set_cast_attribute(key, value);
        }

        let raw = value.into().to_raw().ok_or_else(|| {
            Error::ValidationError(format!(
                "Attribute `{}` is not cast and needs a raw value",
                key
            ))
        })?;
        self.set_raw_attribute(key, raw);
        Ok(())
    }

    pub fn raw_attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Overwrite one raw key without casting, dropping cached values that
    /// depend on it.
    pub fn set_raw_attribute(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let stale = self.cast_cache.invalidate_raw_key(&key);
        if !stale.is_empty() {
            debug!("Raw write to {} invalidated [{}]", key, stale.join(", "));
        }
        self.attributes.insert(key, value);
    }

    /// Current raw attributes.
    pub fn attributes(&self) -> &RawAttributes {
        &self.attributes
    }

    /// Replace the raw store wholesale and clear the cast cache.
    pub fn set_raw_attributes(&mut self, attributes: RawAttributes) {
        debug!(
            "Replacing raw attributes of {} ({} cached cast value(s) dropped)",
            D::model_name(),
            self.cast_cache.len()
        );
        self.attributes = attributes;
        self.cast_cache.clear();
    }

    /// Whether a resolved value for `key` is currently cached.
    pub fn is_cached(&self, key: &str) -> bool {
        self.cast_cache.contains(key)
    }

    /// Array view built from the raw store.
    ///
    /// Multi-key cast attributes never appear under their logical name, only
    /// as the raw keys they write.
    pub fn to_array(&self) -> RawAttributes {
        let mut array = self.attributes.clone();
        for (attribute, _) in D::casts() {
            if self.cast_cache.is_multi_key(attribute) {
                array.remove(attribute);
            }
        }
        array
    }

    /// JSON text of [`to_array`](Self::to_array).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_array()).map_err(|e| Error::SerializationError(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_array())
            .map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Encode the raw store into a snapshot envelope. Cached cast values are
    /// not part of it; the backing keys learned from cast writes are.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let backing_keys = D::casts()
            .iter()
            .filter_map(|(attribute, _)| {
                self.cast_cache
                    .backing_keys(attribute)
                    .map(|keys| (attribute.to_string(), keys.clone()))
            })
            .collect();

        ModelSnapshot::new(D::model_name(), self.attributes.clone())
            .with_backing_keys(backing_keys)
            .to_bytes()
    }

    /// Rebuild an instance from [`snapshot`](Self::snapshot) bytes. The
    /// restored instance starts with an empty cast cache but keeps the
    /// backing keys of its multi-key attributes.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSnapshot` / `Error::VersionMismatch` / `Error::DeserializationError`:
    ///   the envelope is unreadable
    /// - `Error::ModelMismatch`: the snapshot was taken from another model type
    pub fn restore(bytes: &[u8], registry: Arc<CasterRegistry>) -> Result<Self> {
        let snapshot = ModelSnapshot::from_bytes(bytes)?;
        if snapshot.model != D::model_name() {
            return Err(Error::ModelMismatch {
                expected: D::model_name().to_string(),
                found: snapshot.model,
            });
        }

        debug!(
            "✓ Restored {} with {} raw attribute(s)",
            D::model_name(),
            snapshot.attributes.len()
        );
        let mut model = Self::with_attributes(registry, snapshot.attributes);
        for (attribute, keys) in snapshot.backing_keys {
            if D::cast_definition(&attribute).is_some() {
                model.cast_cache.record_backing_keys(&attribute, keys);
            }
        }
        Ok(model)
    }
}

impl<D: ModelDefinition> Model for GenericModel<D> {
    fn model_name(&self) -> &str {
        D::model_name()
    }

    fn raw_attributes(&self) -> &RawAttributes {
        &self.attributes
    }

    fn cast_definition(&self, key: &str) -> Option<&str> {
        D::cast_definition(key)
    }
}

/// Duplicates the raw store; the duplicate re-derives its own cast values.
impl<D: ModelDefinition> Clone for GenericModel<D> {
    fn clone(&self) -> Self {
        GenericModel {
            attributes: self.attributes.clone(),
            cast_cache: CastCache::new(),
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
            _definition: PhantomData,
        }
    }
}

impl<D: ModelDefinition> fmt::Debug for GenericModel<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericModel")
            .field("model", &D::model_name())
            .field("attributes", &self.attributes)
            .field("cached", &self.cast_cache.len())
            .finish()
    }
}

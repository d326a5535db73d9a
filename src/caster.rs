//! Caster contract that every attribute caster implements.

use crate::attributes::RawAttributes;
use crate::error::Result;
use crate::model::Model;
use crate::value::CastValue;
use serde_json::Value;
use std::sync::Arc;

/// Bidirectional caster: decodes raw storage into a rich value and back.
///
/// Casters are shared between every attribute and model instance declaring
/// the same definition, so they must hold no per-model state.
///
/// # Example
///
/// ```
/// use cast_kit::{CastValue, CastWrite, CastsAttributes, Model, RawAttributes, Result};
/// use serde_json::Value;
///
/// struct ReverseCaster;
///
/// impl CastsAttributes for ReverseCaster {
///     fn get(&self, _model: &dyn Model, _key: &str, value: &Value, _attributes: &RawAttributes) -> Result<CastValue> {
///         let text = value.as_str().unwrap_or_default();
///         Ok(CastValue::new(text.chars().rev().collect::<String>()))
///     }
///
///     fn set(&self, _model: &dyn Model, _key: &str, value: &CastValue, _attributes: &RawAttributes) -> Result<CastWrite> {
///         let text = value.as_str().unwrap_or_default();
///         Ok(CastWrite::Value(Value::String(text.chars().rev().collect())))
///     }
/// }
/// ```
pub trait CastsAttributes: Send + Sync {
    /// Transform the raw value of `key` into its rich form.
    ///
    /// `attributes` is the full raw store, so casters backed by several raw
    /// keys can read all of them.
    fn get(
        &self,
        model: &dyn Model,
        key: &str,
        value: &Value,
        attributes: &RawAttributes,
    ) -> Result<CastValue>;

    /// Transform a rich value into the raw key(s) that represent it.
    ///
    /// Receives [`CastValue::null`] when the attribute is cleared; producing
    /// null raw values for every backing key is the caster's job.
    fn set(
        &self,
        model: &dyn Model,
        key: &str,
        value: &CastValue,
        attributes: &RawAttributes,
    ) -> Result<CastWrite>;
}

/// Inbound-only caster: transforms on write, never on read.
///
/// Reads of an attribute with an inbound-only caster return the stored raw
/// value unchanged (one-way hashing is the typical use).
pub trait CastsInboundAttributes: Send + Sync {
    fn set(
        &self,
        model: &dyn Model,
        key: &str,
        value: &CastValue,
        attributes: &RawAttributes,
    ) -> Result<CastWrite>;
}

/// Raw output of a caster `set`.
#[derive(Debug, Clone, PartialEq)]
pub enum CastWrite {
    /// One raw value, stored under the attribute's own key.
    Value(Value),
    /// Explicit raw keys to overwrite. Keys need not match the attribute
    /// name and need not already exist in the store.
    Attributes(RawAttributes),
}

impl CastWrite {
    /// Normalize into the raw mapping written for attribute `key`.
    pub fn into_attributes(self, key: &str) -> RawAttributes {
        match self {
            CastWrite::Value(value) => RawAttributes::single(key, value),
            CastWrite::Attributes(attributes) => attributes,
        }
    }
}

impl From<Value> for CastWrite {
    fn from(value: Value) -> Self {
        CastWrite::Value(value)
    }
}

impl From<RawAttributes> for CastWrite {
    fn from(attributes: RawAttributes) -> Self {
        CastWrite::Attributes(attributes)
    }
}

/// A resolved caster instance.
///
/// Cloning shares the underlying instance.
#[derive(Clone)]
pub enum Caster {
    Bidirectional(Arc<dyn CastsAttributes>),
    Inbound(Arc<dyn CastsInboundAttributes>),
}

impl Caster {
    pub fn bidirectional<C: CastsAttributes + 'static>(caster: C) -> Self {
        Caster::Bidirectional(Arc::new(caster))
    }

    pub fn inbound<C: CastsInboundAttributes + 'static>(caster: C) -> Self {
        Caster::Inbound(Arc::new(caster))
    }

    pub fn is_inbound(&self) -> bool {
        matches!(self, Caster::Inbound(_))
    }

    /// Identity comparison of the shared instance.
    pub fn same_instance(&self, other: &Caster) -> bool {
        match (self, other) {
            (Caster::Bidirectional(a), Caster::Bidirectional(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            (Caster::Inbound(a), Caster::Inbound(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }

    /// Forward transform, available on both variants.
    pub fn set(
        &self,
        model: &dyn Model,
        key: &str,
        value: &CastValue,
        attributes: &RawAttributes,
    ) -> Result<CastWrite> {
        match self {
            Caster::Bidirectional(caster) => caster.set(model, key, value, attributes),
            Caster::Inbound(caster) => caster.set(model, key, value, attributes),
        }
    }
}

impl std::fmt::Debug for Caster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caster::Bidirectional(_) => f.write_str("Caster::Bidirectional"),
            Caster::Inbound(_) => f.write_str("Caster::Inbound"),
        }
    }
}

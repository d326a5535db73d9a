//! JSON document caster.

use crate::attributes::RawAttributes;
use crate::caster::{CastWrite, CastsAttributes};
use crate::error::{Error, Result};
use crate::model::Model;
use crate::value::CastValue;
use serde_json::Value;

/// Stores a JSON document as JSON text and decodes it on read.
///
/// Reads yield a `CastValue` holding a `serde_json::Value`. Raw values that
/// are already structured (not text) are handed back as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCaster;

impl JsonCaster {
    pub const IDENTIFIER: &'static str = "JsonCaster";

    pub fn from_arguments(arguments: &[String]) -> Result<Self> {
        if arguments.is_empty() {
            Ok(JsonCaster)
        } else {
            Err(Error::ValidationError(format!(
                "JsonCaster takes no arguments, got {}",
                arguments.len()
            )))
        }
    }
}

impl CastsAttributes for JsonCaster {
    fn get(
        &self,
        _model: &dyn Model,
        key: &str,
        value: &Value,
        _attributes: &RawAttributes,
    ) -> Result<CastValue> {
        match value {
            Value::Null => Ok(CastValue::null()),
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map(CastValue::new)
                .map_err(|e| Error::DecodeError(format!("Invalid JSON in {}: {}", key, e))),
            structured => Ok(CastValue::new(structured.clone())),
        }
    }

    fn set(
        &self,
        _model: &dyn Model,
        key: &str,
        value: &CastValue,
        _attributes: &RawAttributes,
    ) -> Result<CastWrite> {
        if value.is_null() {
            return Ok(CastWrite::Value(Value::Null));
        }

        let document = value.to_raw().ok_or_else(|| {
            Error::ValidationError(format!("{} expects a JSON document", key))
        })?;

        serde_json::to_string(&document)
            .map(|text| CastWrite::Value(Value::String(text)))
            .map_err(|e| Error::SerializationError(e.to_string()))
    }
}

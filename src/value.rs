//! Rich values produced by casters.

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a rich (cast) attribute value.
///
/// Cloning a `CastValue` clones the handle, not the payload, so every clone
/// refers to the same object. The cast cache relies on this: repeated reads
/// hand out clones of one cached handle, and [`CastValue::ptr_eq`] tells them
/// apart from a freshly decoded value.
///
/// # Example
///
/// ```
/// use cast_kit::CastValue;
///
/// let value = CastValue::new(String::from("taylor"));
/// let again = value.clone();
///
/// assert!(CastValue::ptr_eq(&value, &again));
/// assert_eq!(value.as_str(), Some("taylor"));
/// assert_eq!(value.downcast_ref::<String>().map(String::len), Some(6));
/// ```
#[derive(Clone)]
pub struct CastValue(Arc<dyn Any + Send + Sync>);

impl CastValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        CastValue(Arc::new(value))
    }

    /// Wrap an existing `Arc` without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        CastValue(value)
    }

    /// The absence marker handed to casters when an attribute is cleared.
    pub fn null() -> Self {
        CastValue::new(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.downcast_ref::<Value>(), Some(Value::Null)) || self.is::<()>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Recover a typed `Arc` sharing this value's allocation.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    /// Borrow the payload as text when it is a `String`, `&'static str` or JSON string.
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        if let Some(s) = self.downcast_ref::<&'static str>() {
            return Some(s);
        }
        match self.downcast_ref::<Value>() {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert plain scalar and JSON payloads into a raw value.
    ///
    /// Returns `None` for any other payload type (value objects, documents
    /// that only a caster knows how to flatten).
    pub fn to_raw(&self) -> Option<Value> {
        if let Some(value) = self.downcast_ref::<Value>() {
            return Some(value.clone());
        }
        if self.is::<()>() {
            return Some(Value::Null);
        }
        if let Some(s) = self.as_str() {
            return Some(Value::String(s.to_string()));
        }
        if let Some(b) = self.downcast_ref::<bool>() {
            return Some(Value::Bool(*b));
        }
        if let Some(n) = self.downcast_ref::<i64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = self.downcast_ref::<i32>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = self.downcast_ref::<u64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = self.downcast_ref::<f64>() {
            return Some(Value::from(*n));
        }
        None
    }

    /// Identity comparison: true when both handles point at the same allocation.
    pub fn ptr_eq(a: &CastValue, b: &CastValue) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&a.0) as *const (),
            Arc::as_ptr(&b.0) as *const (),
        )
    }
}

impl fmt::Debug for CastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_raw() {
            Some(raw) => f.debug_tuple("CastValue").field(&raw).finish(),
            None => f.write_str("CastValue(<opaque>)"),
        }
    }
}

impl From<Value> for CastValue {
    fn from(value: Value) -> Self {
        CastValue::new(value)
    }
}

impl From<String> for CastValue {
    fn from(value: String) -> Self {
        CastValue::new(value)
    }
}

impl From<&str> for CastValue {
    fn from(value: &str) -> Self {
        CastValue::new(value.to_string())
    }
}

//! # cast-kit
//!
//! Attribute casting for models whose storage is a flat map of raw values but
//! whose public attributes are rich, typed values.
//!
//! ## Features
//!
//! - **Bidirectional casters:** decode raw values on read, encode on write (`CastsAttributes`)
//! - **Inbound-only casters:** transform on write only, e.g. one-way hashing (`CastsInboundAttributes`)
//! - **Multi-key attributes:** one logical attribute backed by several raw keys
//! - **Identity-stable cache:** repeated reads return the same `CastValue` until a write invalidates it
//! - **Explicit registry:** casters are registered by identifier, with `Identifier:arg1,arg2` parameters
//! - **Raw views and snapshots:** array/JSON output and persistence only ever see the raw store
//!
//! ## Quick Start
//!
//! ```ignore
//! use cast_kit::{CasterRegistry, GenericModel, ModelDefinition};
//! use std::sync::Arc;
//!
//! // 1. Declare the casts for a model type
//! struct User;
//!
//! impl ModelDefinition for User {
//!     fn model_name() -> &'static str {
//!         "user"
//!     }
//!
//!     fn casts() -> &'static [(&'static str, &'static str)] {
//!         &[
//!             ("password", "HashCaster"),
//!             ("legacy_password", "HashCaster:md5"),
//!             ("options", "JsonCaster"),
//!         ]
//!     }
//! }
//!
//! // 2. Build a registry once and share it
//! let registry = Arc::new(CasterRegistry::builder().with_builtins().build());
//!
//! // 3. Read and write through the cast engine
//! let mut user = GenericModel::<User>::new(registry);
//! user.set_cast_attribute("options", serde_json::json!({"theme": "dark"}))?;
//! let options = user.get_cast_attribute("options")?;
//! let json = user.to_json()?;
//! ```

#[macro_use]
extern crate log;

pub mod attributes;
pub mod builder;
pub mod cache;
pub mod caster;
pub mod casters;
pub mod config;
pub mod definition;
pub mod error;
pub mod model;
pub mod observability;
pub mod registry;
pub mod snapshot;
pub mod value;

// Re-exports for convenience
pub use attributes::RawAttributes;
pub use builder::RegistryBuilder;
pub use cache::CastCache;
pub use caster::{CastWrite, Caster, CastsAttributes, CastsInboundAttributes};
pub use casters::{HashAlgorithm, HashCaster, JsonCaster};
pub use config::RegistryConfig;
pub use definition::CastDefinition;
pub use error::{Error, Result};
pub use model::{GenericModel, Model, ModelDefinition};
pub use observability::{CastMetrics, NoOpMetrics};
pub use registry::{CasterFactory, CasterRegistry};
pub use snapshot::ModelSnapshot;
pub use value::CastValue;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

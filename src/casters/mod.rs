//! Built-in caster implementations.
//!
//! Available casters:
//! - `HashCaster` (inbound-only): one-way digest of text values
//! - `JsonCaster` (bidirectional): JSON documents stored as JSON text

pub mod hash;
pub mod json;

pub use hash::{HashAlgorithm, HashCaster};
pub use json::JsonCaster;

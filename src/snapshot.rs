//! Versioned snapshot envelope for model persistence.
//!
//! # Format
//!
//! ```text
//! [MAGIC: 4 bytes] [VERSION: 4 bytes, little endian] [JSON PAYLOAD]
//! ```
//!
//! The payload carries the model name, its raw attributes and the backing
//! keys learned from cast writes. Cast declarations are per type and cast
//! values are derived, so neither is written.

use crate::attributes::RawAttributes;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Magic header identifying a cast-kit snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"CAST";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;

/// Serialized state of one model instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub model: String,
    pub attributes: RawAttributes,
    /// Raw keys each cast attribute last wrote.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub backing_keys: BTreeMap<String, BTreeSet<String>>,
}

impl ModelSnapshot {
    pub fn new(model: impl Into<String>, attributes: RawAttributes) -> Self {
        ModelSnapshot {
            model: model.into(),
            attributes,
            backing_keys: BTreeMap::new(),
        }
    }

    pub fn with_backing_keys(mut self, backing_keys: BTreeMap<String, BTreeSet<String>>) -> Self {
        self.backing_keys = backing_keys;
        self
    }

    /// Encode into the versioned envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload =
            serde_json::to_vec(self).map_err(|e| Error::SerializationError(e.to_string()))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode an envelope, validating magic and version before the payload.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSnapshot`: truncated input or bad magic
    /// - `Error::VersionMismatch`: written by a different schema version
    /// - `Error::DeserializationError`: corrupted payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidSnapshot(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        let (header, payload) = bytes.split_at(HEADER_LEN);
        if &header[..4] != SNAPSHOT_MAGIC {
            return Err(Error::InvalidSnapshot("bad magic header".to_string()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&header[4..]);
        let version = u32::from_le_bytes(version);
        if version != SNAPSHOT_VERSION {
            return Err(Error::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: version,
            });
        }

        serde_json::from_slice(payload).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

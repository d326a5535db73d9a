//! One-way hashing caster.

use crate::attributes::RawAttributes;
use crate::caster::{CastWrite, CastsInboundAttributes};
use crate::error::{Error, Result};
use crate::model::Model;
use crate::value::CastValue;
use serde_json::Value;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest algorithms supported by [`HashCaster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Md5,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `input`.
    pub fn digest(&self, input: &[u8]) -> String {
        match self {
            HashAlgorithm::Md5 => format!("{:x}", md5::compute(input)),
            HashAlgorithm::Sha224 => hex::encode(Sha224::digest(input)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(input)),
            HashAlgorithm::Sha384 => hex::encode(Sha384::digest(input)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(input)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::ValidationError(format!(
                "Unsupported hash algorithm: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound-only caster that stores the hex digest of the assigned text.
///
/// Declared as `HashCaster` (sha256) or `HashCaster:<algorithm>`.
#[derive(Debug, Clone, Default)]
pub struct HashCaster {
    algorithm: HashAlgorithm,
}

impl HashCaster {
    pub const IDENTIFIER: &'static str = "HashCaster";

    pub fn new(algorithm: HashAlgorithm) -> Self {
        HashCaster { algorithm }
    }

    /// Build from definition arguments: none, or a single algorithm name.
    pub fn from_arguments(arguments: &[String]) -> Result<Self> {
        match arguments {
            [] => Ok(Self::default()),
            [algorithm] => Ok(Self::new(algorithm.parse()?)),
            _ => Err(Error::ValidationError(format!(
                "HashCaster takes at most one argument, got {}",
                arguments.len()
            ))),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl CastsInboundAttributes for HashCaster {
    fn set(
        &self,
        _model: &dyn Model,
        _key: &str,
        value: &CastValue,
        _attributes: &RawAttributes,
    ) -> Result<CastWrite> {
        if value.is_null() {
            return Ok(CastWrite::Value(Value::Null));
        }

        let text = value.as_str().ok_or_else(|| {
            Error::ValidationError("HashCaster expects a text value".to_string())
        })?;

        Ok(CastWrite::Value(Value::String(
            self.algorithm.digest(text.as_bytes()),
        )))
    }
}

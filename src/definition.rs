//! Parsing of cast definition strings.
//!
//! A definition names a caster and optionally passes it positional string
//! arguments: `<identifier>` or `<identifier>:<arg1>,<arg2>,...`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Parsed cast definition.
///
/// # Example
///
/// ```
/// use cast_kit::CastDefinition;
///
/// let definition: CastDefinition = "HashCaster:md5".parse().unwrap();
/// assert_eq!(definition.identifier(), "HashCaster");
/// assert_eq!(definition.arguments(), ["md5"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CastDefinition {
    identifier: String,
    arguments: Vec<String>,
}

impl CastDefinition {
    pub fn new(identifier: impl Into<String>, arguments: Vec<String>) -> Self {
        CastDefinition {
            identifier: identifier.into(),
            arguments,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl FromStr for CastDefinition {
    type Err = Error;

    /// Split on the first `:`; everything after it is split on `,` and passed
    /// through verbatim. Argument validation belongs to the caster.
    fn from_str(definition: &str) -> Result<Self> {
        let (identifier, arguments): (&str, Vec<String>) = match definition.split_once(':') {
            Some((identifier, rest)) => (identifier, rest.split(',').map(str::to_string).collect()),
            None => (definition, Vec::new()),
        };

        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::InvalidDefinition {
                definition: definition.to_string(),
                reason: "missing caster identifier".to_string(),
            });
        }

        Ok(CastDefinition::new(identifier, arguments))
    }
}

impl fmt::Display for CastDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "{}:{}", self.identifier, self.arguments.join(","))
        }
    }
}

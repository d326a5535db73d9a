//! Error types for cast-kit operations.

use thiserror::Error;

/// Errors raised while resolving casters, casting attributes, or restoring snapshots.
#[derive(Debug, Error)]
pub enum Error {
    /// The declared caster identifier has no registered factory.
    #[error("Unknown caster `{identifier}` declared for attribute `{attribute}`")]
    UnknownCaster {
        attribute: String,
        identifier: String,
    },

    /// The cast definition string could not be parsed.
    #[error("Invalid cast definition `{definition}`: {reason}")]
    InvalidDefinition { definition: String, reason: String },

    /// An attribute declares a cast definition that could not be parsed.
    #[error("Invalid cast definition `{definition}` declared for attribute `{attribute}`: {reason}")]
    InvalidDeclaration {
        attribute: String,
        definition: String,
        reason: String,
    },

    /// The caster factory rejected its arguments.
    #[error("Failed to construct caster `{identifier}` for attribute `{attribute}`: {reason}")]
    ConstructionError {
        attribute: String,
        identifier: String,
        reason: String,
    },

    /// A caster `get`/`set` failed. The original error is kept as `source`.
    #[error("Cast of attribute `{attribute}` via `{caster}` failed: {source}")]
    CastFailed {
        attribute: String,
        caster: String,
        #[source]
        source: Box<Error>,
    },

    /// The attribute has no cast declaration on the model.
    #[error("Attribute `{attribute}` is not cast on model `{model}`")]
    NotCast { model: String, attribute: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Snapshot belongs to model `{found}`, expected `{expected}`")]
    ModelMismatch { expected: String, found: String },
}

impl Error {
    /// Attach attribute and caster context to an error raised inside a caster.
    pub fn cast_failed(attribute: &str, caster: &str, source: Error) -> Self {
        Error::CastFailed {
            attribute: attribute.to_string(),
            caster: caster.to_string(),
            source: Box::new(source),
        }
    }

    /// The innermost error, unwrapping any `CastFailed` layers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::CastFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for cast-kit operations.
pub type Result<T> = std::result::Result<T, Error>;

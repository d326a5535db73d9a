//! Caster registry: resolves cast definitions to shared caster instances.

use crate::builder::RegistryBuilder;
use crate::caster::Caster;
use crate::casters::{HashCaster, JsonCaster};
use crate::config::RegistryConfig;
use crate::definition::CastDefinition;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Constructs a caster from the positional arguments of its definition.
pub type CasterFactory = Arc<dyn Fn(&[String]) -> Result<Caster> + Send + Sync>;

/// Explicit table of caster identifiers plus a shared instance cache.
///
/// The factory table is fixed once the registry is shared; the instance cache
/// is safe to fill concurrently. Instances are keyed by the exact definition
/// string, so `HashCaster` and `HashCaster:md5` resolve to different casters
/// while every attribute declaring `HashCaster:md5` shares one.
///
/// # Example
///
/// ```ignore
/// let registry = CasterRegistry::builder()
///     .with_builtins()
///     .register_default::<ReverseCaster>("ReverseCaster")
///     .build();
///
/// let caster = registry.resolve("password", "HashCaster:md5")?;
/// ```
pub struct CasterRegistry {
    factories: HashMap<String, CasterFactory>,
    instances: DashMap<String, Caster>,
    config: RegistryConfig,
}

impl CasterRegistry {
    /// Empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        CasterRegistry {
            factories: HashMap::new(),
            instances: DashMap::new(),
            config,
        }
    }

    /// Registry holding the built-in casters (`HashCaster`, `JsonCaster`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn register_builtins(&mut self) {
        self.register(HashCaster::IDENTIFIER, |arguments: &[String]| {
            HashCaster::from_arguments(arguments).map(Caster::inbound)
        });
        self.register(JsonCaster::IDENTIFIER, |arguments: &[String]| {
            JsonCaster::from_arguments(arguments).map(Caster::bidirectional)
        });
    }

    /// Register (or replace) the factory for `identifier`.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&[String]) -> Result<Caster> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        debug!("Registering caster {}", identifier);
        self.factories.insert(identifier, Arc::new(factory));
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Resolve the caster declared as `definition` for `attribute`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidDeclaration`: the definition has no identifier
    /// - `Error::UnknownCaster`: no factory is registered for the identifier
    /// - `Error::ConstructionError`: the factory rejected the arguments
    pub fn resolve(&self, attribute: &str, definition: &str) -> Result<Caster> {
        if self.config.cache_instances {
            if let Some(existing) = self.instances.get(definition) {
                trace!("✓ Caster instance hit for {}", definition);
                return Ok(existing.value().clone());
            }
        }

        let caster = self.construct(attribute, definition)?;

        if !self.config.cache_instances {
            return Ok(caster);
        }

        // A concurrent first resolution may have won; keep whichever landed first.
        let entry = self
            .instances
            .entry(definition.to_string())
            .or_insert(caster);
        Ok(entry.value().clone())
    }

    fn construct(&self, attribute: &str, definition: &str) -> Result<Caster> {
        let parsed: CastDefinition = definition.parse().map_err(|e| match e {
            Error::InvalidDefinition { definition, reason } => Error::InvalidDeclaration {
                attribute: attribute.to_string(),
                definition,
                reason,
            },
            other => other,
        })?;

        let factory = self
            .factories
            .get(parsed.identifier())
            .ok_or_else(|| Error::UnknownCaster {
                attribute: attribute.to_string(),
                identifier: parsed.identifier().to_string(),
            })?;

        debug!(
            "» Constructing caster {} for attribute {}",
            definition, attribute
        );

        factory(parsed.arguments()).map_err(|e| Error::ConstructionError {
            attribute: attribute.to_string(),
            identifier: parsed.identifier().to_string(),
            reason: e.to_string(),
        })
    }

    /// Number of cached caster instances.
    pub fn cached_instances(&self) -> usize {
        self.instances.len()
    }

    /// Drop every cached caster instance.
    pub fn clear_instances(&self) {
        warn!(
            "⚠ Clearing {} cached caster instance(s)",
            self.instances.len()
        );
        self.instances.clear();
    }
}

impl Default for CasterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CasterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        f.debug_struct("CasterRegistry")
            .field("factories", &identifiers)
            .field("instances", &self.instances.len())
            .field("config", &self.config)
            .finish()
    }
}

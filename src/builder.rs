//! Builder pattern for caster registries.

use crate::caster::{Caster, CastsAttributes, CastsInboundAttributes};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::registry::CasterRegistry;

/// Fluent builder for a [`CasterRegistry`].
///
/// Registration happens up front; the built registry is then shared
/// (typically behind an `Arc`) by every model using it.
///
/// # Example
///
/// ```ignore
/// use cast_kit::{CasterRegistry, RegistryConfig};
/// use std::sync::Arc;
///
/// let registry = Arc::new(
///     CasterRegistry::builder()
///         .with_config(RegistryConfig::from_env())
///         .with_builtins()
///         .register_default::<ReverseCaster>("ReverseCaster")
///         .register("Money", |args: &[String]| MoneyCaster::from_arguments(args).map(Caster::bidirectional))
///         .build(),
/// );
/// ```
pub struct RegistryBuilder {
    config: RegistryConfig,
    builtins: bool,
    registrations: Vec<Box<dyn FnOnce(&mut CasterRegistry)>>,
}

impl RegistryBuilder {
    /// Create a new builder with default settings.
    pub(crate) fn new() -> Self {
        RegistryBuilder {
            config: RegistryConfig::default(),
            builtins: false,
            registrations: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Include `HashCaster` and `JsonCaster`.
    ///
    /// Built-ins are registered before anything else, so an explicit
    /// registration under the same identifier replaces them.
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Register a factory receiving the definition's arguments.
    pub fn register<F>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&[String]) -> Result<Caster> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        self.registrations
            .push(Box::new(move |registry| registry.register(identifier, factory)));
        self
    }

    /// Register a bidirectional caster that takes no arguments.
    pub fn register_default<C>(self, identifier: impl Into<String>) -> Self
    where
        C: CastsAttributes + Default + 'static,
    {
        let identifier = identifier.into();
        let name = identifier.clone();
        self.register(identifier, move |arguments: &[String]| {
            reject_arguments(&name, arguments)?;
            Ok(Caster::bidirectional(C::default()))
        })
    }

    /// Register an inbound-only caster that takes no arguments.
    pub fn register_inbound_default<C>(self, identifier: impl Into<String>) -> Self
    where
        C: CastsInboundAttributes + Default + 'static,
    {
        let identifier = identifier.into();
        let name = identifier.clone();
        self.register(identifier, move |arguments: &[String]| {
            reject_arguments(&name, arguments)?;
            Ok(Caster::inbound(C::default()))
        })
    }

    pub fn build(self) -> CasterRegistry {
        let mut registry = CasterRegistry::with_config(self.config);
        if self.builtins {
            registry.register_builtins();
        }
        for registration in self.registrations {
            registration(&mut registry);
        }
        debug!("✓ Caster registry built: {:?}", registry);
        registry
    }
}

fn reject_arguments(identifier: &str, arguments: &[String]) -> Result<()> {
    if arguments.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "{} takes no arguments, got {}",
            identifier,
            arguments.len()
        )))
    }
}

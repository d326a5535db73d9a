//! Registry configuration.

/// Environment variable toggling the caster instance cache.
pub const CACHE_CASTERS_ENV: &str = "CAST_KIT_CACHE_CASTERS";

/// Configuration for a [`CasterRegistry`](crate::registry::CasterRegistry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Reuse one caster instance per distinct definition string.
    pub cache_instances: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            cache_instances: true,
        }
    }
}

impl RegistryConfig {
    /// Build from defaults, overridden by `CAST_KIT_CACHE_CASTERS` when set.
    ///
    /// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`. Unrecognised
    /// values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(flag) = std::env::var(CACHE_CASTERS_ENV)
            .ok()
            .and_then(|value| parse_flag(&value))
        {
            config.cache_instances = flag;
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

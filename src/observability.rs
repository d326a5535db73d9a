//! Metrics hooks for cast operations.

use std::time::Duration;

/// Receives cast cache events from a model.
///
/// All methods default to no-ops so implementors only override what they track.
pub trait CastMetrics: Send + Sync {
    /// A read was served from the cast cache.
    fn record_hit(&self, _attribute: &str) {}

    /// A read invoked the caster's `get`.
    fn record_miss(&self, _attribute: &str, _duration: Duration) {}

    /// A caster failed during `get` or `set`.
    fn record_error(&self, _attribute: &str, _error: &str) {}
}

/// Metrics sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl CastMetrics for NoOpMetrics {}

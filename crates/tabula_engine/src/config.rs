//! Configuration for the dispatch engine.

use crate::trace::TracerConfig;

/// Default bound on `__index`/`__newindex` table-redirection hops.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 100;

/// Default bound on nested handler invocations.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Configuration for the dispatch engine.
///
/// Controls the safety bounds on chained resolution and handler recursion,
/// and the dispatch tracer.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum table-redirection hops followed by one index read or write.
    pub max_chain_depth: usize,

    /// Maximum number of handler invocations active at once.
    pub max_call_depth: usize,

    /// Dispatch tracer settings.
    pub tracer: TracerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            tracer: TracerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration for debugging with the tracer enabled.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            tracer: TracerConfig::new().enabled().with_buffer_size(10_000),
            ..Self::default()
        }
    }

    /// Builder method to set the chain depth bound.
    #[must_use]
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Builder method to set the handler nesting bound.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Builder method to set tracer configuration.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerConfig) -> Self {
        self.tracer = tracer;
        self
    }
}

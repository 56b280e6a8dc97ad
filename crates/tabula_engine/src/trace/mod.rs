//! Opt-in tracing of dispatch decisions.
//!
//! When enabled, the engine records which slot resolved on which operand,
//! every handler call and failure, each table-redirection hop and every
//! metatable change into a bounded [`TraceBuffer`]. When disabled, recording
//! is a single branch.
//!
//! # Example
//!
//! ```
//! use tabula_engine::{Engine, EngineConfig};
//! use tabula_foundation::Value;
//!
//! let mut engine = Engine::with_config(EngineConfig::debug());
//! let t = engine.create_table();
//! let _ = engine.dispatch_index_read(t, &Value::from("missing"));
//!
//! assert_eq!(engine.tracer().buffer().by_event_type("raw_fallback").len(), 1);
//! ```

pub mod buffer;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use record::{TraceEvent, TraceRecord};

/// Tracer settings, usually set through
/// [`EngineConfig::with_tracer`](crate::EngineConfig::with_tracer).
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Record events at all.
    pub enabled: bool,
    /// Records kept before the oldest are evicted.
    pub buffer_size: usize,
    /// Event type names to keep; empty keeps every type.
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 1000,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Returns the default (disabled) settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns recording on.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Sets how many records are kept.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Keeps only the named event types, as given by
    /// [`TraceEvent::event_type`].
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }

    fn accepts(&self, event: &TraceEvent) -> bool {
        self.event_filter.is_empty()
            || self
                .event_filter
                .iter()
                .any(|name| name == event.event_type())
    }
}

/// Records dispatch events into a ring buffer.
#[derive(Clone, Debug, Default)]
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
}

impl Tracer {
    /// Creates a tracer from its settings.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer = TraceBuffer::new(config.buffer_size);
        Self { config, buffer }
    }

    /// A tracer that records nothing until enabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// True while recording.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Starts recording.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Stops recording; held records are kept.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// The active settings.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Records an event at the given handler nesting depth.
    ///
    /// `event` is only built when the tracer is enabled.
    #[inline]
    pub fn record_with<F>(&mut self, depth: usize, event: F)
    where
        F: FnOnce() -> TraceEvent,
    {
        if !self.config.enabled {
            return;
        }
        let event = event();
        if self.config.accepts(&event) {
            self.buffer.push(depth, event);
        }
    }

    /// Records an already-built event.
    #[inline]
    pub fn record(&mut self, depth: usize, event: TraceEvent) {
        self.record_with(depth, || event);
    }

    /// The held records.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Drops the held records.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

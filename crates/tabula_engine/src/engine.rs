//! The dispatch engine.
//!
//! [`Engine`] owns the heap, the handler table and the tracer. Operator
//! dispatch lives in [`dispatch`](crate::dispatch), the `__tostring` contract
//! in [`display`](crate::display) and the metatable gate in
//! [`protect`](crate::protect); this module holds construction, raw access
//! and handler invocation.

use tabula_foundation::{
    Error, ErrorKind, FieldMap, HandlerId, MetaMethod, ObjectId, Result, Value,
};
use tabula_storage::Heap;
use tracing::debug;

use crate::arith;
use crate::config::EngineConfig;
use crate::handler::HandlerTable;
use crate::trace::{TraceEvent, Tracer};

/// Resolves and runs metamethods on behalf of an evaluator.
///
/// An engine is confined to the thread that created it: handlers are held
/// behind `Rc`, so `Engine` is neither `Send` nor `Sync`. Every operation
/// takes `&mut self`, which serializes metatable changes against
/// resolution.
pub struct Engine {
    pub(crate) heap: Heap,
    pub(crate) handlers: HandlerTable,
    pub(crate) config: EngineConfig,
    pub(crate) tracer: Tracer,
    /// Handler invocations currently on the stack.
    pub(crate) call_depth: usize,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_handlers(config, HandlerTable::new())
    }

    /// Creates an engine from a configuration and a pre-filled handler
    /// table.
    #[must_use]
    pub fn with_handlers(config: EngineConfig, handlers: HandlerTable) -> Self {
        let tracer = Tracer::new(config.tracer.clone());
        Self {
            heap: Heap::new(),
            handlers,
            config,
            tracer,
            call_depth: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the handler table.
    #[must_use]
    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Returns the tracer for enabling, disabling or clearing.
    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Read access to the heap.
    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Returns the number of handler invocations currently active.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Registers a handler and returns its id.
    ///
    /// `HandlerId` converts into `Value::Handler` for storing in a slot.
    pub fn register_handler<F>(&mut self, name: &str, func: F) -> HandlerId
    where
        F: Fn(&mut Engine, &[Value]) -> Result<Value> + 'static,
    {
        self.handlers.register(name, func)
    }

    /// Returns the value of the first handler registered under `name`.
    #[must_use]
    pub fn handler_value(&self, name: &str) -> Option<Value> {
        self.handlers.find(name).map(Value::Handler)
    }

    /// Calls a handler value directly.
    ///
    /// # Errors
    /// Returns `NotCallable` if `callee` is not a handler, and otherwise
    /// whatever the handler returns.
    pub fn call(&mut self, callee: &Value, args: &[Value]) -> Result<Value> {
        self.invoke(None, callee, args)
    }

    /// Runs a handler under the call depth guard.
    ///
    /// A failure keeps its kind and gains one frame naming the slot and
    /// handler.
    pub(crate) fn invoke(
        &mut self,
        slot: Option<MetaMethod>,
        callee: &Value,
        args: &[Value],
    ) -> Result<Value> {
        let Some(id) = callee.as_handler() else {
            return Err(Error::not_callable(slot, callee.value_type()));
        };
        let Some(entry) = self.handlers.get(id).cloned() else {
            return Err(Error::new(ErrorKind::Internal(format!(
                "handler {id} is not registered"
            ))));
        };

        let limit = self.config.max_call_depth;
        if self.call_depth >= limit {
            return Err(Error::call_depth_exceeded(limit));
        }

        self.record(TraceEvent::HandlerInvoked { slot, handler: id });
        debug!(
            handler = %entry.name,
            slot = slot.map_or("call", MetaMethod::name),
            depth = self.call_depth,
            "invoking handler"
        );

        self.call_depth += 1;
        let result = (entry.func)(self, args);
        self.call_depth -= 1;

        result.map_err(|err| {
            self.record(TraceEvent::HandlerFailed { slot, handler: id });
            let frame = match slot {
                Some(slot) => format!("{slot} handler '{}'", entry.name),
                None => format!("handler '{}'", entry.name),
            };
            err.with_frame(frame)
        })
    }

    pub(crate) fn record(&mut self, event: TraceEvent) {
        self.tracer.record(self.call_depth, event);
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Allocates a new empty table.
    pub fn create_table(&mut self) -> ObjectId {
        self.heap.create_table()
    }

    /// Allocates a table pre-filled with `fields`.
    ///
    /// # Errors
    /// Returns `InvalidKey` if any key is nil or NaN.
    pub fn create_table_with<I>(&mut self, fields: I) -> Result<ObjectId>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        self.heap.create_table_with(fields)
    }

    /// Destroys a table.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn destroy(&mut self, id: ObjectId) -> Result<()> {
        self.heap.destroy(id)
    }

    /// Returns true if the table is live.
    #[must_use]
    pub fn exists(&self, id: ObjectId) -> bool {
        self.heap.exists(id)
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Reads a field, bypassing metamethods.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_get(&self, id: ObjectId, key: &Value) -> Result<Option<Value>> {
        self.heap.raw_get(id, key)
    }

    /// Writes a field, bypassing metamethods.
    ///
    /// # Errors
    /// Returns an error if the table is not live or the key is nil or NaN.
    pub fn raw_set(&mut self, id: ObjectId, key: Value, value: Value) -> Result<()> {
        self.heap.raw_set(id, key, value)
    }

    /// Returns the sequence border of a table, bypassing `__len`.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_len(&self, id: ObjectId) -> Result<i64> {
        self.heap.raw_len(id)
    }

    /// Primitive equality, bypassing `__eq`.
    #[must_use]
    pub fn raw_equal(&self, a: &Value, b: &Value) -> bool {
        arith::raw_equal(a, b)
    }

    /// Returns a snapshot of a table's fields.
    ///
    /// The snapshot shares structure with the table, so iterating it while
    /// writing to the table is cheap and safe.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn snapshot(&self, id: ObjectId) -> Result<FieldMap> {
        self.heap.snapshot(id)
    }

    /// Returns the real metatable, ignoring `__metatable`.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn get_metatable(&self, id: ObjectId) -> Result<Option<ObjectId>> {
        self.heap.get_metatable(id)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tables", &self.heap.table_count())
            .field("handlers", &self.handlers.len())
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

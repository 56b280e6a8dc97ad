//! Host handlers that metatable slots point at.
//!
//! A handler is a Rust closure registered once and referenced from tables by
//! [`HandlerId`]. Handler identity is the id: two slots hold "the same
//! handler" exactly when they hold the same `Value::Handler`.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tabula_foundation::{Error, HandlerId, ObjectId, Result, Value};

use crate::engine::Engine;

/// Signature shared by every handler.
///
/// Handlers receive the engine (so they can allocate tables and re-enter the
/// dispatcher) and the operands of the operation that resolved to them.
pub type HandlerFn = dyn Fn(&mut Engine, &[Value]) -> Result<Value>;

/// A registered handler.
#[derive(Clone)]
pub struct HandlerEntry {
    /// Name used in error frames and traces.
    pub name: Arc<str>,
    /// The callable.
    pub func: Rc<HandlerFn>,
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerEntry({})", self.name)
    }
}

/// Append-only table of handlers.
///
/// A table can be filled before the engine exists and handed to
/// [`Engine::with_handlers`], which keeps handler namespaces explicit
/// instead of process-global.
#[derive(Clone, Debug, Default)]
pub struct HandlerTable {
    entries: Vec<HandlerEntry>,
}

impl HandlerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns its id.
    // Handler counts stay far below u32::MAX
    #[allow(clippy::cast_possible_truncation)]
    pub fn register<F>(&mut self, name: impl Into<Arc<str>>, func: F) -> HandlerId
    where
        F: Fn(&mut Engine, &[Value]) -> Result<Value> + 'static,
    {
        let id = self.entries.len() as u32;
        self.entries.push(HandlerEntry {
            name: name.into(),
            func: Rc::new(func),
        });
        HandlerId(id)
    }

    /// Looks up a handler.
    #[must_use]
    pub fn get(&self, id: HandlerId) -> Option<&HandlerEntry> {
        self.entries.get(id.index())
    }

    /// Returns the name of a handler.
    #[must_use]
    pub fn name(&self, id: HandlerId) -> Option<&str> {
        self.get(id).map(|entry| &*entry.name)
    }

    /// Finds the first handler registered under `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<HandlerId> {
        self.entries
            .iter()
            .position(|entry| &*entry.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(HandlerId)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static NIL: Value = Value::Nil;

/// Returns argument `index`, or nil when the caller passed fewer arguments.
#[must_use]
pub fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NIL)
}

/// Extracts a table argument for a handler named `name`.
///
/// # Errors
/// Returns a handler error naming the argument position when it is not a
/// table.
pub fn table_arg(args: &[Value], index: usize, name: &str) -> Result<ObjectId> {
    let value = arg(args, index);
    value.as_object().ok_or_else(|| {
        Error::handler(format!(
            "bad argument #{} to '{name}' (table expected, got {})",
            index + 1,
            value.value_type()
        ))
    })
}

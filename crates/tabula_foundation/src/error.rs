//! Error types for the Tabula system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::metamethod::MetaMethod;
use crate::object::ObjectId;
use crate::types::Type;

/// Result type used throughout Tabula.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Tabula operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Appends a frame to this error's context, creating it if needed.
    ///
    /// The kind is left untouched.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Returns the context frames, innermost first.
    #[must_use]
    pub fn frames(&self) -> &[String] {
        self.context.as_ref().map_or(&[], |c| c.stack.as_slice())
    }

    /// Creates an unsupported operation error.
    #[must_use]
    pub fn unsupported_operation(op: MetaMethod, operand_type: Type) -> Self {
        Self::new(ErrorKind::UnsupportedOperation { op, operand_type })
    }

    /// Creates a not comparable error.
    #[must_use]
    pub fn not_comparable(op: MetaMethod, left: Type, right: Type) -> Self {
        Self::new(ErrorKind::NotComparable { op, left, right })
    }

    /// Creates a protected metatable error.
    #[must_use]
    pub fn protected_metatable() -> Self {
        Self::new(ErrorKind::ProtectedMetatable)
    }

    /// Creates a chain depth exceeded error.
    #[must_use]
    pub fn chain_depth_exceeded(slot: MetaMethod, limit: usize) -> Self {
        Self::new(ErrorKind::ChainDepthExceeded { slot, limit })
    }

    /// Creates a call depth exceeded error.
    #[must_use]
    pub fn call_depth_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::CallDepthExceeded { limit })
    }

    /// Creates an error raised by a user handler.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler(message.into()))
    }

    /// Creates a not callable error.
    #[must_use]
    pub fn not_callable(slot: Option<MetaMethod>, operand_type: Type) -> Self {
        Self::new(ErrorKind::NotCallable { slot, operand_type })
    }

    /// Creates a not indexable error.
    #[must_use]
    pub fn not_indexable(operand_type: Type) -> Self {
        Self::new(ErrorKind::NotIndexable { operand_type })
    }

    /// Creates an object not found error.
    #[must_use]
    pub fn object_not_found(id: ObjectId) -> Self {
        Self::new(ErrorKind::ObjectNotFound(id))
    }

    /// Creates a stale object reference error.
    #[must_use]
    pub fn stale_object(id: ObjectId) -> Self {
        Self::new(ErrorKind::StaleObject(id))
    }

    /// Creates an invalid handler result error.
    #[must_use]
    pub fn invalid_handler_result(slot: MetaMethod, expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::InvalidHandlerResult {
            slot,
            expected,
            actual,
        })
    }

    /// Returns true if this error was raised by a user handler.
    #[must_use]
    pub fn is_handler_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Handler(_))
    }
}

impl From<InvalidKey> for Error {
    fn from(key: InvalidKey) -> Self {
        Self::new(ErrorKind::InvalidKey(key))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    /// No handler resolved for an arithmetic, concat, or length operation.
    #[error("attempt to {} a {operand_type} value", action(.op))]
    UnsupportedOperation {
        /// The slot that was searched.
        op: MetaMethod,
        /// Type of the first operand lacking a usable form.
        operand_type: Type,
    },

    /// Ordering operands did not share a handler.
    #[error("attempt to compare {left} with {right} ({op})")]
    NotComparable {
        /// The ordering slot that was searched.
        op: MetaMethod,
        /// Type of the left operand.
        left: Type,
        /// Type of the right operand.
        right: Type,
    },

    /// Attempted to replace a metatable guarded by `__metatable`.
    #[error("cannot change a protected metatable")]
    ProtectedMetatable,

    /// A table-redirection chain was longer than the configured bound.
    #[error("'{slot}' chain too long (limit {limit}); possible loop")]
    ChainDepthExceeded {
        /// `__index` or `__newindex`.
        slot: MetaMethod,
        /// The configured limit.
        limit: usize,
    },

    /// Handlers nested deeper than the configured bound.
    #[error("handler call depth limit ({limit}) exceeded")]
    CallDepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// Failure raised by a user handler.
    #[error("{0}")]
    Handler(String),

    /// Attempted to invoke a value that is not a handler.
    #[error("attempt to call a {operand_type} value{}", slot_suffix(.slot))]
    NotCallable {
        /// The slot being invoked, if the call came from dispatch.
        slot: Option<MetaMethod>,
        /// Type of the value that was called.
        operand_type: Type,
    },

    /// Attempted to index through a value that is not a table.
    #[error("attempt to index a {operand_type} value")]
    NotIndexable {
        /// Type of the value that was indexed.
        operand_type: Type,
    },

    /// Attempted to store under a key that cannot be a table key.
    #[error("invalid table key: {0}")]
    InvalidKey(InvalidKey),

    /// A handler returned a value of the wrong type.
    #[error("'{slot}' must return a {expected}, got {actual}")]
    InvalidHandlerResult {
        /// The slot whose handler misbehaved.
        slot: MetaMethod,
        /// The type the engine required.
        expected: Type,
        /// The type the handler returned.
        actual: Type,
    },

    /// Integer division or modulo by zero.
    #[error("attempt to perform 'n%%0'")]
    DivisionByZero,

    /// Object was not found in the arena.
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// Object reference is stale (generation mismatch).
    #[error("stale object reference: {0:?}")]
    StaleObject(ObjectId),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn action(op: &MetaMethod) -> &'static str {
    match op {
        MetaMethod::Concat => "concatenate",
        MetaMethod::Len => "get length of",
        MetaMethod::Unm => "negate",
        _ => "perform arithmetic on",
    }
}

fn slot_suffix(slot: &Option<MetaMethod>) -> String {
    slot.map(|s| format!(" (via {s})")).unwrap_or_default()
}

/// Why a value was rejected as a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKey {
    /// The key was nil.
    Nil,
    /// The key was a float NaN.
    NaN,
}

impl fmt::Display for InvalidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "index is nil"),
            Self::NaN => write!(f, "index is NaN"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Name of the operation or host call that failed.
    pub source: Option<String>,
    /// Stack of handler frames the error passed through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source description.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

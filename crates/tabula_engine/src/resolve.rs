//! Metamethod resolution rules.
//!
//! Everything here is a pure function of the heap: it reads metatable slots
//! and decides which handler, if any, serves an operation. Nothing is
//! invoked. The [`Engine`](crate::Engine) acts on the decision.

use std::fmt;

use tabula_foundation::{HandlerId, MetaMethod, ObjectId, Value};
use tabula_storage::Heap;

/// Which operand of an operation supplied the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// The first (left) operand.
    Left,
    /// The second (right) operand.
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// The contents of a populated metatable slot, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handler {
    /// A registered host handler.
    Function(HandlerId),
    /// A table, meaningful only for `__index` and `__newindex`.
    Table(ObjectId),
    /// Anything else; invoking it is an error.
    Other(Value),
}

impl Handler {
    /// Classifies a raw slot value.
    ///
    /// Returns `None` for nil, which reads as an empty slot.
    #[must_use]
    pub fn classify(value: Value) -> Option<Self> {
        match value {
            Value::Nil => None,
            Value::Handler(id) => Some(Self::Function(id)),
            Value::Object(id) => Some(Self::Table(id)),
            other => Some(Self::Other(other)),
        }
    }

    /// Converts back into the slot value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Function(id) => Value::Handler(*id),
            Self::Table(id) => Value::Object(*id),
            Self::Other(value) => value.clone(),
        }
    }
}

/// A resolution decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// What the slot holds.
    pub handler: Handler,
    /// Which operand's metatable it came from.
    pub operand: Operand,
}

/// Looks up `slot` in the metatable of `value`.
///
/// A table in a slot that cannot delegate to one is classified as
/// [`Handler::Other`].
#[must_use]
pub fn lookup(heap: &Heap, slot: MetaMethod, value: &Value) -> Option<Handler> {
    let handler = Handler::classify(heap.metamethod(value, slot)?)?;
    Some(match handler {
        Handler::Table(id) if !slot.allows_table() => Handler::Other(Value::Object(id)),
        handler => handler,
    })
}

/// Resolves a binary arithmetic or concat slot: first operand first.
///
/// The handler is always invoked with the operands in their original order,
/// regardless of which one supplied it.
#[must_use]
pub fn resolve_binary(heap: &Heap, slot: MetaMethod, a: &Value, b: &Value) -> Option<Resolved> {
    if let Some(handler) = lookup(heap, slot, a) {
        return Some(Resolved {
            handler,
            operand: Operand::Left,
        });
    }
    lookup(heap, slot, b).map(|handler| Resolved {
        handler,
        operand: Operand::Right,
    })
}

/// Resolves a unary slot on its single operand.
#[must_use]
pub fn resolve_unary(heap: &Heap, slot: MetaMethod, a: &Value) -> Option<Resolved> {
    lookup(heap, slot, a).map(|handler| Resolved {
        handler,
        operand: Operand::Left,
    })
}

/// Outcome of resolving a slot both operands must agree on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shared {
    /// Both operands hold the same handler value.
    Agreed(Handler),
    /// At least one operand has no handler, or they differ.
    Disagreed,
}

/// Resolves `__eq`, `__lt` or `__le`: both operands must independently
/// resolve to the identical slot value.
#[must_use]
pub fn resolve_shared(heap: &Heap, slot: MetaMethod, a: &Value, b: &Value) -> Shared {
    match (lookup(heap, slot, a), lookup(heap, slot, b)) {
        (Some(left), Some(right)) if left == right => Shared::Agreed(left),
        _ => Shared::Disagreed,
    }
}

//! Core value type for all Tabula data.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InvalidKey;
use crate::object::{HandlerId, ObjectId};
use crate::types::Type;

/// Core value type for all Tabula data.
///
/// Values are cheaply cloneable. Tables and handlers are referenced by id,
/// so cloning a `Value::Object` never copies a table.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Absence of a value; missing keys read as nil.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Reference to a table in the object arena.
    Object(ObjectId),
    /// Reference to a registered handler.
    Handler(HandlerId),
}

impl Value {
    /// Returns the type of this value.
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Self::Nil => Type::Nil,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) | Self::Float(_) => Type::Number,
            Self::String(_) => Type::String,
            Self::Object(_) => Type::Table,
            Self::Handler(_) => Type::Function,
        }
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true if this value is truthy.
    ///
    /// Only `nil` and `false` are falsy.
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// Returns true for integers and floats.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as a float, widening integers.
    ///
    /// Integers beyond 2^53 lose precision.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract an object ID.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Attempts to extract a handler ID.
    #[must_use]
    pub const fn as_handler(&self) -> Option<HandlerId> {
        match self {
            Self::Handler(id) => Some(*id),
            _ => None,
        }
    }

    /// Converts this value into the canonical form used as a table key.
    ///
    /// Floats holding an exact integer collapse to `Int`, so `t[1.0]` and
    /// `t[1]` address the same slot.
    ///
    /// # Errors
    /// Returns [`InvalidKey`] for `nil` and NaN.
    pub fn into_key(self) -> std::result::Result<Self, InvalidKey> {
        match self {
            Self::Nil => Err(InvalidKey::Nil),
            Self::Float(f) if f.is_nan() => Err(InvalidKey::NaN),
            Self::Float(f) => Ok(float_to_int(f).map_or(Self::Float(f), Self::Int)),
            other => Ok(other),
        }
    }
}

/// Returns the integer a float represents exactly, if any.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn float_to_int(f: f64) -> Option<i64> {
    // -2^63 is exact; 2^63 is the first value past i64::MAX.
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (LOWER..UPPER).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Formats a float the way it is displayed to users.
///
/// Integral values keep a trailing `.0` so they stay distinguishable from
/// integers; very large or small magnitudes use exponent notation.
#[must_use]
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return if f.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format!("{f:e}");
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

// Floats compare by bit pattern so that values can serve as hash keys
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Object(id) => id.hash(state),
            Self::Handler(id) => id.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{}", format_float(*n)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Object(id) => write!(f, "{id:?}"),
            Self::Handler(id) => write!(f, "{id:?}"),
        }
    }
}

/// Structural rendering: no metamethods are consulted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => f.write_str(&format_float(*n)),
            Self::String(s) => f.write_str(s),
            Self::Object(id) => write!(f, "table: 0x{:08x}", id.index),
            Self::Handler(id) => write!(f, "function: builtin: {}", id.0),
        }
    }
}


impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<HandlerId> for Value {
    fn from(id: HandlerId) -> Self {
        Self::Handler(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Nil, Into::into)
    }
}

//! Closed enumerations of dispatchable operations and their reserved slots.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reserved metatable slot.
///
/// Every operation the engine dispatches maps to exactly one slot; the slot's
/// name is the string key under which a metatable stores its handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaMethod {
    /// `__add`
    Add,
    /// `__sub`
    Sub,
    /// `__mul`
    Mul,
    /// `__div`
    Div,
    /// `__mod`
    Mod,
    /// `__pow`
    Pow,
    /// `__unm`
    Unm,
    /// `__concat`
    Concat,
    /// `__len`
    Len,
    /// `__eq`
    Eq,
    /// `__lt`
    Lt,
    /// `__le`
    Le,
    /// `__index`
    Index,
    /// `__newindex`
    NewIndex,
    /// `__tostring`
    ToString,
    /// `__metatable`
    Metatable,
}

impl MetaMethod {
    /// Every slot, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Pow,
        Self::Unm,
        Self::Concat,
        Self::Len,
        Self::Eq,
        Self::Lt,
        Self::Le,
        Self::Index,
        Self::NewIndex,
        Self::ToString,
        Self::Metatable,
    ];

    /// Returns the reserved key under which this slot is stored.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "__add",
            Self::Sub => "__sub",
            Self::Mul => "__mul",
            Self::Div => "__div",
            Self::Mod => "__mod",
            Self::Pow => "__pow",
            Self::Unm => "__unm",
            Self::Concat => "__concat",
            Self::Len => "__len",
            Self::Eq => "__eq",
            Self::Lt => "__lt",
            Self::Le => "__le",
            Self::Index => "__index",
            Self::NewIndex => "__newindex",
            Self::ToString => "__tostring",
            Self::Metatable => "__metatable",
        }
    }

    /// Looks up a slot by its reserved key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Position of this slot in [`MetaMethod::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns true for slots that may hold a table instead of a handler.
    #[must_use]
    pub const fn allows_table(self) -> bool {
        matches!(self, Self::Index | Self::NewIndex)
    }
}

impl fmt::Display for MetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators accepted by the dispatcher.
///
/// `Ne`, `Gt` and `Ge` have no slot of their own: they are derived from
/// `__eq`, `__lt` and `__le`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a % b`
    Mod,
    /// `a ^ b`
    Pow,
    /// `a .. b`
    Concat,
    /// `a == b`
    Eq,
    /// `a ~= b`
    Ne,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a > b`, evaluated as `b < a`
    Gt,
    /// `a >= b`, evaluated as `b <= a`
    Ge,
}

impl BinaryOp {
    /// Returns the slot consulted for this operator.
    #[must_use]
    pub const fn metamethod(self) -> MetaMethod {
        match self {
            Self::Add => MetaMethod::Add,
            Self::Sub => MetaMethod::Sub,
            Self::Mul => MetaMethod::Mul,
            Self::Div => MetaMethod::Div,
            Self::Mod => MetaMethod::Mod,
            Self::Pow => MetaMethod::Pow,
            Self::Concat => MetaMethod::Concat,
            Self::Eq | Self::Ne => MetaMethod::Eq,
            Self::Lt | Self::Gt => MetaMethod::Lt,
            Self::Le | Self::Ge => MetaMethod::Le,
        }
    }

    /// Returns the operator's surface symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::Concat => "..",
            Self::Eq => "==",
            Self::Ne => "~=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Returns true for the arithmetic operators (`+ - * / % ^`).
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Pow
        )
    }

    /// Returns true for the ordering operators (`< <= > >=`).
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators accepted by the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    /// `-a`
    Neg,
    /// `#a`
    Len,
}

impl UnaryOp {
    /// Returns the slot consulted for this operator.
    #[must_use]
    pub const fn metamethod(self) -> MetaMethod {
        match self {
            Self::Neg => MetaMethod::Unm,
            Self::Len => MetaMethod::Len,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neg => f.write_str("-"),
            Self::Len => f.write_str("#"),
        }
    }
}

//! Type names reported in diagnostics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The dynamic type of a [`Value`](crate::Value).
///
/// Integers and floats share the `number` type; the distinction is a
/// representation detail that never shows up in error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// Integer or floating point number.
    Number,
    /// String type.
    String,
    /// Table (object) type.
    Table,
    /// Registered handler type.
    Function,
}

impl Type {
    /// Returns the lowercase name used in messages (`"table"`, `"number"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Table => "table",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

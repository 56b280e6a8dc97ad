//! Core values, object identities, and error types for Tabula.
//!
//! This crate provides:
//! - [`Value`] - The value type every dispatch operation consumes and produces
//! - [`ObjectId`] / [`HandlerId`] - Arena identities for tables and handlers
//! - [`Type`] - Type names used in diagnostics
//! - [`MetaMethod`], [`BinaryOp`], [`UnaryOp`] - Closed operation kinds
//! - [`Error`] - Rich error types with context
//! - [`FieldMap`] - Persistent key/value storage backing every table

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod metamethod;
pub mod object;
pub mod types;
pub mod value;

pub use collections::FieldMap;
pub use error::{Error, ErrorContext, ErrorKind, InvalidKey, Result};
pub use metamethod::{BinaryOp, MetaMethod, UnaryOp};
pub use object::{HandlerId, ObjectId};
pub use types::Type;
pub use value::{Value, float_to_int, format_float};

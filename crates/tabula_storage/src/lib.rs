//! Table arena, raw access, and metatable registry for Tabula.
//!
//! This crate provides:
//! - [`ObjectStore`] - Generational table allocation with raw field access
//! - [`MetatableRegistry`] - Weak object-to-metatable associations
//! - [`SlotKeys`] - Pre-built reserved slot keys
//! - [`Heap`] - The unified raw interface the dispatcher consumes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod heap;
pub mod object;
pub mod registry;
pub mod slots;

pub use heap::Heap;
pub use object::ObjectStore;
pub use registry::MetatableRegistry;
pub use slots::SlotKeys;

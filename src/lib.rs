//! Tabula - Dynamic metatable dispatch for tables
//!
//! This crate re-exports all layers of the Tabula system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: tabula_engine     - Resolver, dispatcher, protection gate, tracing
//! Layer 1: tabula_storage    - Table arena, metatable registry
//! Layer 0: tabula_foundation - Core types (Value, ObjectId, MetaMethod, Error)
//! ```
//!
//! An evaluator calls [`engine::Engine`] for every operator and table
//! access. The engine applies primitive semantics where they exist, and
//! otherwise resolves a handler from the operands' metatables and runs it.

pub use tabula_engine as engine;
pub use tabula_foundation as foundation;
pub use tabula_storage as storage;

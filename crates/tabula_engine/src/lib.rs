//! Metamethod resolution, operation dispatch, and metatable protection.
//!
//! This crate provides:
//! - [`Engine`] - The dispatcher the evaluator calls for every operator and
//!   table access
//! - [`resolve`] - Pure resolution rules from operands to handlers
//! - [`HandlerTable`] - Registered host handlers addressed by id
//! - [`EngineConfig`] - Chain/call depth bounds and tracing setup
//! - [`trace`] - Opt-in dispatch tracing
//!
//! # Example
//!
//! ```
//! use tabula_engine::Engine;
//! use tabula_foundation::{BinaryOp, Value};
//!
//! let mut engine = Engine::new();
//! let double = engine.register_handler("double", |_, args| {
//!     let n = args.get(1).and_then(Value::as_int).unwrap_or(0);
//!     Ok(Value::Int(n * 2))
//! });
//! let meta = engine.create_table();
//! engine.raw_set(meta, "__add".into(), double.into()).unwrap();
//! let t = engine.create_table();
//! engine.set_metatable_guarded(t, Some(meta)).unwrap();
//!
//! let sum = engine.dispatch_binary(BinaryOp::Add, t.into(), Value::Int(21)).unwrap();
//! assert_eq!(sum, Value::Int(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arith;
pub mod config;
pub mod display;
pub mod dispatch;
pub mod engine;
pub mod handler;
pub mod protect;
pub mod resolve;
pub mod trace;

pub use config::EngineConfig;
pub use engine::Engine;
pub use handler::{HandlerEntry, HandlerFn, HandlerTable};
pub use resolve::{Handler, Operand, Resolved};
pub use trace::{TraceBuffer, TraceEvent, TraceRecord, Tracer, TracerConfig};

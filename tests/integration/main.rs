//! Cross-layer integration tests for Tabula
//!
//! Tests that exercise the engine the way an evaluator would, with small
//! libraries of handlers built on top of it.

mod prototypes;

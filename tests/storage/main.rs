//! Integration tests for Layer 1: Storage
//!
//! Tests for the table arena and the metatable registry.

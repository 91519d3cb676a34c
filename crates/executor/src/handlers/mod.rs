//! Command handlers.
//!
//! Each handler resolves the addressed record before decoding its payload,
//! then dispatches to the engine.

pub mod entity;
pub mod query;

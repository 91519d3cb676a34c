//! Storage layer for tripstore
//!
//! This crate provides the in-memory containers:
//! - [`EntityStore`]: one locked table per entity kind
//! - [`RelationIndex`]: user → visits and location → visits ownership sets
//!
//! Neither type knows about the other. The engine composes them and owns the
//! lock order across kinds.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod relation;
pub mod table;

pub use relation::{Dimension, Links, RelationIndex};
pub use table::{EntityStore, Table};

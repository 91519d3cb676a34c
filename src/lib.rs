//! tripstore: an in-memory relational store for users, locations and visits.
//!
//! The store keeps three entity tables and a relation index from each user
//! and location to the visits that reference it, and answers two queries
//! over them: a user's visit history and a location's average mark.
//!
//! # Quick Start
//!
//! ```no_run
//! use tripstore::{AverageFilter, Database, Loader, VisitFilter};
//!
//! let db = Database::new();
//! Loader::new(&db).load_path("data/")?;
//!
//! let history = db.visits_for_user(1, &VisitFilter::default())?;
//! let avg = db.average_mark(1, &AverageFilter::default())?;
//! println!("{} visits, average {}", history.len(), avg);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Wire-level access (JSON bodies, query parameters) goes through
//! [`Executor`].

#![warn(missing_docs)]

pub mod types;

pub use types::*;

pub use tripstore_core::{ErrorKind, StoreError, StoreResult};
pub use tripstore_engine::{ConfigError, Database, LoadError, Loader};
pub use tripstore_executor::{Command, Executor, Output};

/// Lower-level building blocks.
pub mod storage {
    pub use tripstore_storage::{Dimension, EntityStore, RelationIndex};
}

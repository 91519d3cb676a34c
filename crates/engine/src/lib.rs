//! Database engine for tripstore
//!
//! This crate composes the storage containers into a [`Database`]:
//! - Creates and partial updates with referential checks and index upkeep
//! - The analytical queries: [`Database::visits_for_user`], [`Database::average_mark`]
//! - Bulk loading from a data bundle: [`Loader`]
//! - Configuration: [`StoreConfig`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod loader;
pub mod query;

pub use config::{ConfigError, LoadPolicy, StoreConfig, DEFAULT_CAPACITY};
pub use database::{Database, Updatable};
pub use loader::{LoadError, LoadReport, Loader};
pub use query::{AverageFilter, AverageMark, UserVisit, VisitFilter};

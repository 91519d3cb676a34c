//! Command execution layer for tripstore
//!
//! The executor sits between a transport (the CLI, or any other front end)
//! and the engine. It owns the wire-level concerns the engine does not:
//!
//! - Decoding JSON bodies into full records and three-state patches
//! - Parsing query parameters into filters
//! - Rendering results as JSON
//! - Collapsing engine errors into NotFound / BadRequest
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tripstore_engine::Database;
//! use tripstore_executor::{Command, Executor};
//!
//! let executor = Executor::new(Arc::new(Database::new()));
//! let output = executor.execute(Command::AverageMark {
//!     location: 1,
//!     params: vec![("gender".into(), "f".into())],
//! })?;
//! println!("{}", output.to_json()?);
//! # Ok::<(), tripstore_executor::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod convert;
mod error;
mod executor;
pub mod filters;
mod handlers;
mod output;
pub mod patch;

pub use command::Command;
pub use error::{Error, Status};
pub use executor::Executor;
pub use output::Output;

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, Error>;

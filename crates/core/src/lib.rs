//! Core types for tripstore
//!
//! This crate defines the pieces every other layer shares:
//! - Entity records: [`User`], [`Location`], [`Visit`]
//! - Three-state partial updates: [`Field`], [`UserPatch`], [`LocationPatch`], [`VisitPatch`]
//! - Admission rules: [`Validate`]
//! - Age computation against a frozen [`ReferenceInstant`]
//! - The error taxonomy: [`StoreError`], [`ErrorKind`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod age;
pub mod error;
pub mod types;
pub mod update;
pub mod validate;

pub use age::ReferenceInstant;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use types::{EntityKind, Gender, Location, LocationId, Record, User, UserId, Visit, VisitId};
pub use update::{Blank, Field, LocationPatch, Patch, UserPatch, VisitPatch};
pub use validate::{Validate, MAX_MARK, MAX_TEXT_LEN, MIN_MARK};

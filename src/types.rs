//! Public types for the tripstore API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Records
// ============================================================================

pub use tripstore_core::{EntityKind, Gender, Location, User, Visit};
pub use tripstore_core::{LocationId, UserId, VisitId};

// ============================================================================
// Partial updates
// ============================================================================

pub use tripstore_core::{Field, LocationPatch, UserPatch, VisitPatch};

// ============================================================================
// Queries
// ============================================================================

pub use tripstore_engine::{AverageFilter, AverageMark, UserVisit, VisitFilter};

// ============================================================================
// Configuration and loading
// ============================================================================

pub use tripstore_core::ReferenceInstant;
pub use tripstore_engine::{LoadPolicy, LoadReport, StoreConfig};

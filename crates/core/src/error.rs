//! Error types for the record store.
//!
//! Every failure the store can report is a [`StoreError`]. Callers that only
//! need the coarse outcome (for example a transport mapping errors to status
//! codes) use [`StoreError::kind`].

use thiserror::Error;

use crate::types::EntityKind;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested id does not resolve for the entity kind.
    NotFound,
    /// Malformed input, rejected record, or a detected index inconsistency.
    BadRequest,
    /// A create reused an id that is already stored.
    Conflict,
}

/// Errors produced by the store, its validation rules, and the queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id exists.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind that was looked up
        kind: EntityKind,
        /// Id that did not resolve
        id: i64,
    },

    /// A record with this id already exists.
    #[error("{kind} {id} already exists")]
    Conflict {
        /// Kind of the duplicate record
        kind: EntityKind,
        /// Reused id
        id: i64,
    },

    /// An input value (filter, payload) was malformed or out of range.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// A partial update carried an explicit null.
    #[error("null value for {kind}.{field}")]
    NullField {
        /// Kind being updated
        kind: EntityKind,
        /// Field that was null
        field: &'static str,
    },

    /// A record failed admission validation.
    #[error("invalid {kind} {id}: {reason}")]
    InvalidRecord {
        /// Kind of the rejected record
        kind: EntityKind,
        /// Id of the rejected record
        id: i64,
        /// Which rule failed
        reason: String,
    },

    /// The relation index points at a record that does not exist.
    #[error("index inconsistency on {kind} {id}: {reason}")]
    Inconsistent {
        /// Kind of the dangling target
        kind: EntityKind,
        /// Dangling id
        id: i64,
        /// Where the dangling reference was found
        reason: String,
    },
}

impl StoreError {
    /// Create a NotFound error.
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        StoreError::NotFound { kind, id }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an InvalidRecord error.
    pub fn invalid_record(kind: EntityKind, id: i64, reason: impl Into<String>) -> Self {
        StoreError::InvalidRecord {
            kind,
            id,
            reason: reason.into(),
        }
    }

    /// Coarse classification used by callers that map errors onto outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Conflict { .. } => ErrorKind::Conflict,
            StoreError::InvalidInput { .. }
            | StoreError::NullField { .. }
            | StoreError::InvalidRecord { .. }
            | StoreError::Inconsistent { .. } => ErrorKind::BadRequest,
        }
    }

    /// True for NotFound errors.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

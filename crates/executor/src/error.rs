//! Executor error type.

use std::fmt;

use thiserror::Error;

/// Transport-level outcome of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The addressed record does not exist.
    NotFound,
    /// Anything else: bad payload, bad filter, rejected record, id reuse.
    BadRequest,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotFound => f.write_str("not found"),
            Status::BadRequest => f.write_str("bad request"),
        }
    }
}

/// Errors returned by [`Executor::execute`](crate::Executor::execute).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The addressed record does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Kind and id, e.g. `user 7`
        entity: String,
    },

    /// The body, a parameter, or the resulting record is invalid.
    #[error("{reason}")]
    InvalidInput {
        /// What was rejected
        reason: String,
    },

    /// A create reused an existing id.
    #[error("{entity} already exists")]
    Conflict {
        /// Kind and id
        entity: String,
    },

    /// The relation index disagrees with the stores.
    #[error("inconsistent state: {reason}")]
    Inconsistent {
        /// Where the disagreement was found
        reason: String,
    },

    /// A result could not be rendered.
    #[error("internal error: {reason}")]
    Internal {
        /// Underlying failure
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Collapse into the two outcomes a transport reports.
    pub fn status(&self) -> Status {
        match self {
            Error::NotFound { .. } => Status::NotFound,
            _ => Status::BadRequest,
        }
    }

    /// True for a reused id on create.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        let e = Error::NotFound {
            entity: "user 1".into(),
        };
        assert_eq!(e.status(), Status::NotFound);
        assert_eq!(e.to_string(), "user 1 not found");

        let e = Error::Conflict {
            entity: "visit 2".into(),
        };
        assert_eq!(e.status(), Status::BadRequest);
        assert!(e.is_conflict());
        assert_eq!(Status::BadRequest.to_string(), "bad request");
    }
}

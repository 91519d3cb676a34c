//! Error conversion from engine error types.

use tripstore_core::StoreError;

use crate::Error;

/// Convert a StoreError to an executor Error.
///
/// Record-level failures keep their message; the kind and id of the record
/// are folded into the text.
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Error::NotFound {
                entity: format!("{} {}", kind, id),
            },
            StoreError::Conflict { kind, id } => Error::Conflict {
                entity: format!("{} {}", kind, id),
            },
            StoreError::InvalidInput { reason } => Error::InvalidInput { reason },
            e @ (StoreError::NullField { .. } | StoreError::InvalidRecord { .. }) => {
                Error::InvalidInput {
                    reason: e.to_string(),
                }
            }
            e @ StoreError::Inconsistent { .. } => Error::Inconsistent {
                reason: e.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput {
            reason: format!("malformed body: {}", err),
        }
    }
}

use tripstore_core::EntityKind;

/// A single request to the store.
///
/// Bodies are raw JSON text and parameters are raw `(name, value)` pairs;
/// decoding happens inside the executor so that a missing record is reported
/// before a malformed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch one full record.
    Get {
        /// Kind of record
        kind: EntityKind,
        /// Record id
        id: i64,
    },

    /// Admit a new record from a full JSON object.
    Create {
        /// Kind of record
        kind: EntityKind,
        /// JSON object with every field, including `id`
        body: String,
    },

    /// Apply a partial update from a JSON object.
    Update {
        /// Kind of record
        kind: EntityKind,
        /// Record id
        id: i64,
        /// JSON object with the fields to change
        body: String,
    },

    /// A user's visits with place names, ordered by time.
    VisitsForUser {
        /// User id
        user: i64,
        /// `fromDate`, `toDate`, `country`, `toDistance`
        params: Vec<(String, String)>,
    },

    /// Mean mark of a location's visits.
    AverageMark {
        /// Location id
        location: i64,
        /// `fromDate`, `toDate`, `fromAge`, `toAge`, `gender`
        params: Vec<(String, String)>,
    },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Create { .. } => "create",
            Command::Update { .. } => "update",
            Command::VisitsForUser { .. } => "visits",
            Command::AverageMark { .. } => "avg",
        }
    }
}

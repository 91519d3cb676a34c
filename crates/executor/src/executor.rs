use std::sync::Arc;

use tripstore_engine::Database;

use crate::handlers::{entity, query};
use crate::{Command, Output, Result};

/// Dispatches [`Command`]s against a shared [`Database`].
///
/// Cloning is cheap; every clone shares the same database.
#[derive(Debug, Clone)]
pub struct Executor {
    db: Arc<Database>,
}

impl Executor {
    /// Create an executor over a loaded database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The database commands run against.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Run one command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let name = cmd.name();
        let result = match cmd {
            Command::Get { kind, id } => entity::get(&self.db, kind, id),
            Command::Create { kind, body } => entity::create(&self.db, kind, &body),
            Command::Update { kind, id, body } => entity::update(&self.db, kind, id, &body),
            Command::VisitsForUser { user, params } => {
                query::visits_for_user(&self.db, user, &params)
            }
            Command::AverageMark { location, params } => {
                query::average_mark(&self.db, location, &params)
            }
        };
        if let Err(e) = &result {
            tracing::debug!(command = name, status = %e.status(), error = %e, "command failed");
        }
        result
    }
}

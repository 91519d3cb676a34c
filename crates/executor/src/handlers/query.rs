//! Query handlers.

use tripstore_core::EntityKind;
use tripstore_engine::Database;

use crate::filters::{average_filter, visit_filter};
use crate::{Output, Result};

fn pairs(params: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// Handle VisitsForUser command.
pub fn visits_for_user(db: &Database, user: i64, params: &[(String, String)]) -> Result<Output> {
    db.ensure_exists(EntityKind::User, user)?;
    let filter = visit_filter(pairs(params))?;
    Ok(Output::Visits(db.visits_for_user(user, &filter)?))
}

/// Handle AverageMark command.
pub fn average_mark(db: &Database, location: i64, params: &[(String, String)]) -> Result<Output> {
    db.ensure_exists(EntityKind::Location, location)?;
    let filter = average_filter(pairs(params))?;
    Ok(Output::Average(db.average_mark(location, &filter)?))
}

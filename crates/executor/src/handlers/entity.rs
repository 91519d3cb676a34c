//! Record handlers: get, create, update.

use tripstore_core::{EntityKind, Location, LocationPatch, User, UserPatch, Visit, VisitPatch};
use tripstore_engine::Database;

use crate::patch::{decode_patch, decode_record};
use crate::{Output, Result};

/// Handle Get command.
pub fn get(db: &Database, kind: EntityKind, id: i64) -> Result<Output> {
    Ok(match kind {
        EntityKind::User => Output::User(db.get_user(id)?),
        EntityKind::Location => Output::Location(db.get_location(id)?),
        EntityKind::Visit => Output::Visit(db.get_visit(id)?),
    })
}

/// Handle Create command.
pub fn create(db: &Database, kind: EntityKind, body: &str) -> Result<Output> {
    match kind {
        EntityKind::User => db.create_user(decode_record::<User>(body)?)?,
        EntityKind::Location => db.create_location(decode_record::<Location>(body)?)?,
        EntityKind::Visit => db.create_visit(decode_record::<Visit>(body)?)?,
    }
    Ok(Output::Ack)
}

/// Handle Update command.
pub fn update(db: &Database, kind: EntityKind, id: i64, body: &str) -> Result<Output> {
    db.ensure_exists(kind, id)?;
    match kind {
        EntityKind::User => {
            db.update_user(id, decode_patch::<UserPatch>(body)?)?;
        }
        EntityKind::Location => {
            db.update_location(id, decode_patch::<LocationPatch>(body)?)?;
        }
        EntityKind::Visit => {
            db.update_visit(id, decode_patch::<VisitPatch>(body)?)?;
        }
    }
    Ok(Output::Ack)
}

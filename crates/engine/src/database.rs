//! The database: three entity stores and the relation index.
//!
//! # Lock order
//!
//! Every operation that holds more than one lock takes them in this order
//! and releases them together:
//!
//! 1. Visit store
//! 2. Location store
//! 3. User store
//! 4. Relation index, location dimension
//! 5. Relation index, user dimension
//!
//! Visit writes hold the visit store exclusively for the whole mutation,
//! including the index update. Queries hold the visit store shared for their
//! whole scan, so they see either the state before or after a visit write.

use tripstore_core::{
    EntityKind, Location, LocationPatch, Patch, ReferenceInstant, StoreError, StoreResult, User,
    UserPatch, Validate, Visit, VisitPatch,
};
use tripstore_storage::{Dimension, EntityStore, RelationIndex, Table};

use crate::config::{ConfigError, StoreConfig};

/// In-memory record store for users, locations and visits.
///
/// # Thread Safety
///
/// `Database` is Send + Sync. Share it behind an `Arc`; every method takes
/// `&self`.
pub struct Database {
    users: EntityStore<User>,
    locations: EntityStore<Location>,
    visits: EntityStore<Visit>,
    relations: RelationIndex,
    reference: ReferenceInstant,
    config: StoreConfig,
}

impl Database {
    /// Create an empty database with default settings.
    ///
    /// The reference instant for age computations is captured now.
    pub fn new() -> Self {
        Self::build(StoreConfig::default(), ReferenceInstant::now())
    }

    /// Create an empty database from a config.
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        let reference = config.resolve_reference()?;
        Ok(Self::build(config, reference))
    }

    fn build(config: StoreConfig, reference: ReferenceInstant) -> Self {
        let capacity = config.initial_capacity;
        Self {
            users: EntityStore::with_capacity(capacity),
            locations: EntityStore::with_capacity(capacity),
            visits: EntityStore::with_capacity(capacity),
            relations: RelationIndex::new(),
            reference,
            config,
        }
    }

    /// The config this database was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The frozen instant ages are measured against.
    pub fn reference_instant(&self) -> ReferenceInstant {
        self.reference
    }

    /// Number of records of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::User => self.users.len(),
            EntityKind::Location => self.locations.len(),
            EntityKind::Visit => self.visits.len(),
        }
    }

    /// NotFound unless a record of this kind and id exists.
    pub fn ensure_exists(&self, kind: EntityKind, id: i64) -> StoreResult<()> {
        let found = match kind {
            EntityKind::User => self.users.contains(id),
            EntityKind::Location => self.locations.contains(id),
            EntityKind::Visit => self.visits.contains(id),
        };
        if found {
            Ok(())
        } else {
            Err(StoreError::not_found(kind, id))
        }
    }

    // =========================================================================
    // Point lookups
    // =========================================================================

    /// Get a user by id.
    pub fn get_user(&self, id: i64) -> StoreResult<User> {
        self.users.get(id)
    }

    /// Get a location by id.
    pub fn get_location(&self, id: i64) -> StoreResult<Location> {
        self.locations.get(id)
    }

    /// Get a visit by id.
    pub fn get_visit(&self, id: i64) -> StoreResult<Visit> {
        self.visits.get(id)
    }

    // =========================================================================
    // Creates
    // =========================================================================

    /// Admit a new user.
    pub fn create_user(&self, user: User) -> StoreResult<()> {
        self.users.create(user)
    }

    /// Admit a new location.
    pub fn create_location(&self, location: Location) -> StoreResult<()> {
        self.locations.create(location)
    }

    /// Admit a new visit and attribute it to its user and location.
    ///
    /// Both owners must already exist.
    pub fn create_visit(&self, visit: Visit) -> StoreResult<()> {
        visit.validate()?;

        let mut visits = self.visits.write();
        let locations = self.locations.read();
        let users = self.users.read();

        if visits.contains(visit.id) {
            return Err(StoreError::Conflict {
                kind: EntityKind::Visit,
                id: visit.id,
            });
        }
        check_owners(&visit, &locations, &users)?;

        visits.insert_new(visit.clone())?;
        self.relations.link(&visit);
        tracing::debug!(kind = %EntityKind::Visit, id = visit.id, "record created");
        Ok(())
    }

    // =========================================================================
    // Partial updates
    // =========================================================================

    /// Apply a partial update to a user.
    pub fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        self.users.update(id, patch)
    }

    /// Apply a partial update to a location.
    pub fn update_location(&self, id: i64, patch: LocationPatch) -> StoreResult<Location> {
        self.locations.update(id, patch)
    }

    /// Apply a partial update to a visit.
    ///
    /// A changed user or location must resolve to an existing record. The
    /// visit is moved between owner sets in the same critical section that
    /// stores the new record; on any failure nothing changes.
    pub fn update_visit(&self, id: i64, patch: VisitPatch) -> StoreResult<Visit> {
        let mut visits = self.visits.write();
        let locations = self.locations.read();
        let users = self.users.read();

        let current = visits.lookup(id)?.clone();
        let next = visits.merged(id, patch)?;
        check_owners(&next, &locations, &users)?;

        self.relations.relink(&current, &next)?;
        visits.replace(next.clone())?;
        tracing::debug!(kind = %EntityKind::Visit, id, "record updated");
        Ok(next)
    }

    /// Apply any patch whose target kind is stored here.
    pub fn update<P: Updatable>(&self, id: i64, patch: P) -> StoreResult<P::Target> {
        patch.apply(self, id)
    }

    // =========================================================================
    // Relation index
    // =========================================================================

    /// Visit ids owned by a user, sorted.
    pub fn visits_of_user(&self, user: i64) -> Vec<i64> {
        self.relations.visits_of_user(user)
    }

    /// Visit ids at a location, sorted.
    pub fn visits_of_location(&self, location: i64) -> Vec<i64> {
        self.relations.visits_of_location(location)
    }

    /// Verify that both index dimensions match the visit table exactly.
    ///
    /// Every visit must appear in exactly its own user's and location's set,
    /// and every indexed pair must correspond to a stored visit.
    pub fn check_consistency(&self) -> StoreResult<()> {
        let visits = self.visits.read();
        let _locations = self.locations.read();
        let _users = self.users.read();

        for dimension in [Dimension::Location, Dimension::User] {
            let links = self.relations.read(dimension);
            for visit in visits.iter() {
                let owner = dimension.owner_of(visit);
                if !links.contains(owner, visit.id) {
                    return Err(StoreError::Inconsistent {
                        kind: dimension.owner_kind(),
                        id: owner,
                        reason: format!("visit {} missing from owner set", visit.id),
                    });
                }
            }
            // every visit is in its own owner's set, so any extra pair is a
            // stale or duplicated entry
            if links.total() != visits.len() {
                return Err(StoreError::Inconsistent {
                    kind: dimension.owner_kind(),
                    id: 0,
                    reason: format!(
                        "{} indexed pairs for {} visits",
                        links.total(),
                        visits.len()
                    ),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn stores(
        &self,
    ) -> (
        &EntityStore<Visit>,
        &EntityStore<Location>,
        &EntityStore<User>,
        &RelationIndex,
    ) {
        (&self.visits, &self.locations, &self.users, &self.relations)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("users", &self.users.len())
            .field("locations", &self.locations.len())
            .field("visits", &self.visits.len())
            .field("reference_instant", &self.reference.epoch_seconds())
            .finish()
    }
}

/// Patches the database knows how to route to the right store.
pub trait Updatable: Patch {
    /// Apply the patch to record `id`.
    fn apply(self, db: &Database, id: i64) -> StoreResult<Self::Target>;
}

impl Updatable for UserPatch {
    fn apply(self, db: &Database, id: i64) -> StoreResult<User> {
        db.update_user(id, self)
    }
}

impl Updatable for LocationPatch {
    fn apply(self, db: &Database, id: i64) -> StoreResult<Location> {
        db.update_location(id, self)
    }
}

impl Updatable for VisitPatch {
    fn apply(self, db: &Database, id: i64) -> StoreResult<Visit> {
        db.update_visit(id, self)
    }
}

fn check_owners(visit: &Visit, locations: &Table<Location>, users: &Table<User>) -> StoreResult<()> {
    if !locations.contains(visit.location) {
        return Err(StoreError::invalid_record(
            EntityKind::Visit,
            visit.id,
            format!("location {} does not exist", visit.location),
        ));
    }
    if !users.contains(visit.user) {
        return Err(StoreError::invalid_record(
            EntityKind::Visit,
            visit.id,
            format!("user {} does not exist", visit.user),
        ));
    }
    Ok(())
}

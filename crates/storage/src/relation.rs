//! Relation index from owners to their visits.
//!
//! The relation index is a derived view of the visit table's foreign keys:
//! for every user and every location it holds the set of visit ids that point
//! at it. It gives O(1) access to an owner's visits instead of a full scan.
//!
//! Each dimension (user, location) sits behind its own lock. Moving a visit
//! between owners removes and inserts under one write guard, so no reader of
//! that dimension ever sees the visit in zero owners or in two.

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::{FxHashMap, FxHashSet};
use tripstore_core::{EntityKind, StoreError, StoreResult, Visit, VisitId};

/// Which foreign key of a visit a [`Links`] map follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Visit → owning user
    User,
    /// Visit → visited location
    Location,
}

impl Dimension {
    /// The owner id a visit carries for this dimension.
    pub fn owner_of(&self, visit: &Visit) -> i64 {
        match self {
            Dimension::User => visit.user,
            Dimension::Location => visit.location,
        }
    }

    /// The entity kind of the owners.
    pub fn owner_kind(&self) -> EntityKind {
        match self {
            Dimension::User => EntityKind::User,
            Dimension::Location => EntityKind::Location,
        }
    }
}

/// Owner id → set of visit ids, for one dimension.
#[derive(Debug, Clone, Default)]
pub struct Links {
    sets: FxHashMap<i64, FxHashSet<VisitId>>,
}

impl Links {
    /// Create an empty link map
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit ids attributed to an owner; empty if the owner has none
    pub fn visits_of(&self, owner: i64) -> impl Iterator<Item = VisitId> + '_ {
        self.sets.get(&owner).into_iter().flatten().copied()
    }

    /// Number of visits attributed to an owner
    pub fn count_of(&self, owner: i64) -> usize {
        self.sets.get(&owner).map_or(0, |s| s.len())
    }

    /// Check if a visit is attributed to an owner
    pub fn contains(&self, owner: i64, visit: VisitId) -> bool {
        self.sets.get(&owner).is_some_and(|s| s.contains(&visit))
    }

    /// Total number of (owner, visit) pairs
    pub fn total(&self) -> usize {
        self.sets.values().map(|s| s.len()).sum()
    }

    /// Owners that currently list a visit. Linear scan; for checks and tests.
    pub fn owners_of(&self, visit: VisitId) -> Vec<i64> {
        let mut owners: Vec<i64> = self
            .sets
            .iter()
            .filter(|(_, set)| set.contains(&visit))
            .map(|(owner, _)| *owner)
            .collect();
        owners.sort_unstable();
        owners
    }

    fn insert(&mut self, owner: i64, visit: VisitId) {
        self.sets.entry(owner).or_default().insert(visit);
    }

    fn remove(&mut self, owner: i64, visit: VisitId) -> bool {
        match self.sets.get_mut(&owner) {
            Some(set) => {
                let removed = set.remove(&visit);
                if set.is_empty() {
                    self.sets.remove(&owner);
                }
                removed
            }
            None => false,
        }
    }
}

/// Both dimensions of the visit ownership index.
///
/// # Lock order
///
/// Callers that also hold entity-store guards must take those first; within
/// the index the location dimension is always locked before the user one.
#[derive(Debug, Default)]
pub struct RelationIndex {
    by_location: RwLock<Links>,
    by_user: RwLock<Links>,
}

impl RelationIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access to one dimension
    pub fn read(&self, dimension: Dimension) -> RwLockReadGuard<'_, Links> {
        match dimension {
            Dimension::User => self.by_user.read(),
            Dimension::Location => self.by_location.read(),
        }
    }

    /// Attribute a newly admitted visit to its user and location.
    pub fn link(&self, visit: &Visit) {
        self.by_location.write().insert(visit.location, visit.id);
        self.by_user.write().insert(visit.user, visit.id);
    }

    /// Move a visit from the owners in `old` to the owners in `new`.
    ///
    /// Only dimensions whose owner id changed are touched. Both dimensions are
    /// checked before either is modified: if the visit is missing from an old
    /// owner's set the index is already inconsistent and nothing is changed.
    pub fn relink(&self, old: &Visit, new: &Visit) -> StoreResult<()> {
        debug_assert_eq!(old.id, new.id);
        let mut by_location = self.by_location.write();
        let mut by_user = self.by_user.write();

        let moves = [
            (Dimension::Location, &mut *by_location),
            (Dimension::User, &mut *by_user),
        ];
        for (dimension, links) in &moves {
            let from = dimension.owner_of(old);
            if from != dimension.owner_of(new) && !links.contains(from, old.id) {
                return Err(StoreError::Inconsistent {
                    kind: dimension.owner_kind(),
                    id: from,
                    reason: format!("visit {} missing from owner set", old.id),
                });
            }
        }

        for (dimension, links) in moves {
            let from = dimension.owner_of(old);
            let to = dimension.owner_of(new);
            if from != to {
                links.remove(from, old.id);
                links.insert(to, new.id);
                tracing::debug!(
                    visit = new.id,
                    owner = %dimension.owner_kind(),
                    from,
                    to,
                    "visit relinked"
                );
            }
        }
        Ok(())
    }

    /// Visit ids of a user, sorted
    pub fn visits_of_user(&self, user: i64) -> Vec<VisitId> {
        sorted(self.by_user.read().visits_of(user))
    }

    /// Visit ids of a location, sorted
    pub fn visits_of_location(&self, location: i64) -> Vec<VisitId> {
        sorted(self.by_location.read().visits_of(location))
    }
}

fn sorted(ids: impl Iterator<Item = VisitId>) -> Vec<VisitId> {
    let mut ids: Vec<VisitId> = ids.collect();
    ids.sort_unstable();
    ids
}

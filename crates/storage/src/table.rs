//! Locked per-kind record tables
//!
//! Each entity kind lives in its own [`EntityStore`]: an FxHashMap from id to
//! record behind a single `parking_lot::RwLock`.
//!
//! # Design
//!
//! - One lock per kind: writers are exclusive, readers share
//! - FxHashMap: O(1) lookups, fast non-crypto hash
//! - The map itself is private; callers go through [`Table`] methods
//!
//! Operations that touch a single kind (`get`, `create`, `update` of users and
//! locations) are complete methods on [`EntityStore`]. Operations that must
//! hold several kinds at once take the guards from [`EntityStore::read`] and
//! [`EntityStore::write`] and call [`Table`] methods under them.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use tripstore_core::{Patch, Record, StoreError, StoreResult, Validate};

/// Records of one kind, keyed by id.
#[derive(Debug)]
pub struct Table<R> {
    rows: FxHashMap<i64, R>,
}

impl<R: Record> Table<R> {
    /// Create a table with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Get a record by id
    #[inline]
    pub fn get(&self, id: i64) -> Option<&R> {
        self.rows.get(&id)
    }

    /// Get a record by id, or NotFound
    #[inline]
    pub fn lookup(&self, id: i64) -> StoreResult<&R> {
        self.rows
            .get(&id)
            .ok_or_else(|| StoreError::not_found(R::KIND, id))
    }

    /// Check if an id is stored
    #[inline]
    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over all records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    /// Insert a record whose id is not yet stored
    ///
    /// Fails with Conflict if the id is taken. Does not validate.
    pub fn insert_new(&mut self, record: R) -> StoreResult<()> {
        let id = record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::Conflict { kind: R::KIND, id });
        }
        self.rows.insert(id, record);
        Ok(())
    }

    /// Replace an existing record, returning the previous version
    ///
    /// Fails with NotFound if the id is not stored. Does not validate.
    pub fn replace(&mut self, record: R) -> StoreResult<R> {
        let id = record.id();
        match self.rows.get_mut(&id) {
            Some(slot) => Ok(std::mem::replace(slot, record)),
            None => Err(StoreError::not_found(R::KIND, id)),
        }
    }
}

impl<R: Record + Validate> Table<R> {
    /// Build the merged record a patch would produce, without storing it
    ///
    /// Order of checks: the id must resolve (NotFound), no field may be an
    /// explicit null (BadRequest), and the merged record must pass the same
    /// admission rules as a create (BadRequest).
    pub fn merged<P>(&self, id: i64, patch: P) -> StoreResult<R>
    where
        P: Patch<Target = R>,
    {
        let current = self.lookup(id)?;
        patch.check_nulls()?;
        let mut next = current.clone();
        patch.merge_into(&mut next)?;
        next.validate()?;
        Ok(next)
    }
}

/// Store for one entity kind
///
/// # Thread Safety
///
/// All methods take `&self`; the table is guarded by a single RwLock.
/// A failed create or update never leaves a partial write behind: the merged
/// record is built and validated before the table is touched.
pub struct EntityStore<R> {
    table: RwLock<Table<R>>,
}

impl<R: Record> EntityStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(Table::with_capacity(capacity)),
        }
    }

    /// Get a copy of a record, or NotFound
    pub fn get(&self, id: i64) -> StoreResult<R> {
        self.table.read().lookup(id).cloned()
    }

    /// Check if an id is stored
    pub fn contains(&self, id: i64) -> bool {
        self.table.read().contains(id)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Acquire shared access for a multi-kind read
    pub fn read(&self) -> RwLockReadGuard<'_, Table<R>> {
        self.table.read()
    }

    /// Acquire exclusive access for a multi-kind write
    pub fn write(&self) -> RwLockWriteGuard<'_, Table<R>> {
        self.table.write()
    }
}

impl<R: Record + Validate> EntityStore<R> {
    /// Validate and insert a new record
    ///
    /// For kinds without references to other kinds. Visits go through the
    /// engine, which also checks their owners.
    pub fn create(&self, record: R) -> StoreResult<()> {
        record.validate()?;
        let (kind, id) = (R::KIND, record.id());
        self.table.write().insert_new(record)?;
        tracing::debug!(kind = %kind, id, "record created");
        Ok(())
    }

    /// Apply a partial update and return the stored result
    pub fn update<P>(&self, id: i64, patch: P) -> StoreResult<R>
    where
        P: Patch<Target = R>,
    {
        let mut table = self.table.write();
        let next = table.merged(id, patch)?;
        table.replace(next.clone())?;
        let kind = R::KIND;
        tracing::debug!(kind = %kind, id, "record updated");
        Ok(next)
    }
}

impl<R: Record> Default for EntityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> std::fmt::Debug for EntityStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &R::KIND)
            .field("len", &self.len())
            .finish()
    }
}

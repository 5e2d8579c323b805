//! In-process document store with optimistic transactions.
//!
//! Every record carries a version drawn from a store-wide counter. A
//! [`MemoryTransaction`] remembers the version of every record it reads
//! (absent records included) and buffers its writes. On commit the store
//! takes the write lock, re-checks every read version and applies the writes
//! only if none changed. A changed version yields `Conflict`, which the
//! repositories hand to the retry runner.
//!
//! Two test hooks simulate the outside world:
//! - [`MemoryStore::interleave_before_next_commit`] runs a closure against
//!   the tables right before the next commit validates, like a concurrent
//!   writer landing between read and write
//! - [`MemoryStore::fail_next_operation`] makes the next repository call
//!   fail with the given error, like a dropped connection

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainError, DraftHistoryId, ErrorCode, PackId, UserId};
use crate::domain::history::DraftHistoryEntry;
use crate::domain::inventory::Pack;

type Interleave = Box<dyn FnOnce(&mut MemoryTables) + Send>;

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    /// Version at first insertion; stable across updates.
    created: u64,
    value: T,
}

/// Identifies one record for read-version tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DocKey {
    Pack(PackId),
    Draft(DraftHistoryId),
}

/// The store's tables. Every mutation bumps the record's version.
#[derive(Debug, Default)]
pub struct MemoryTables {
    last_version: u64,
    packs: HashMap<PackId, Versioned<Pack>>,
    drafts: HashMap<DraftHistoryId, Versioned<DraftHistoryEntry>>,
}

impl MemoryTables {
    fn bump(&mut self) -> u64 {
        self.last_version += 1;
        self.last_version
    }

    fn version_of(&self, key: &DocKey) -> Option<u64> {
        match key {
            DocKey::Pack(id) => self.packs.get(id).map(|v| v.version),
            DocKey::Draft(id) => self.drafts.get(id).map(|v| v.version),
        }
    }

    pub fn pack(&self, id: &PackId) -> Option<&Pack> {
        self.packs.get(id).map(|v| &v.value)
    }

    /// Packs of one owner in storage order (unsorted).
    pub fn packs_of<'a>(&'a self, owner: &'a UserId) -> impl Iterator<Item = &'a Pack> + 'a {
        self.packs
            .values()
            .map(|v| &v.value)
            .filter(move |pack| &pack.owner_id == owner)
    }

    /// Inserts or replaces a pack.
    pub fn put_pack(&mut self, pack: Pack) {
        let version = self.bump();
        let created = self
            .packs
            .get(&pack.id)
            .map(|v| v.created)
            .unwrap_or(version);
        self.packs.insert(
            pack.id,
            Versioned {
                version,
                created,
                value: pack,
            },
        );
    }

    pub fn remove_pack(&mut self, id: &PackId) -> Option<Pack> {
        self.packs.remove(id).map(|v| v.value)
    }

    pub fn draft(&self, id: &DraftHistoryId) -> Option<&DraftHistoryEntry> {
        self.drafts.get(id).map(|v| &v.value)
    }

    /// Entries of one user, newest first. Ties keep reverse insertion order.
    pub fn drafts_of(&self, user_id: &UserId) -> Vec<DraftHistoryEntry> {
        let mut entries: Vec<&Versioned<DraftHistoryEntry>> = self
            .drafts
            .values()
            .filter(|v| &v.value.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| {
            b.value
                .completed_at
                .cmp(&a.value.completed_at)
                .then(b.created.cmp(&a.created))
        });
        entries.into_iter().map(|v| v.value.clone()).collect()
    }

    /// Inserts or replaces a history entry.
    pub fn put_draft(&mut self, entry: DraftHistoryEntry) {
        let version = self.bump();
        let created = self
            .drafts
            .get(&entry.id)
            .map(|v| v.created)
            .unwrap_or(version);
        self.drafts.insert(
            entry.id,
            Versioned {
                version,
                created,
                value: entry,
            },
        );
    }

    pub fn remove_draft(&mut self, id: &DraftHistoryId) -> Option<DraftHistoryEntry> {
        self.drafts.remove(id).map(|v| v.value)
    }
}

#[derive(Default)]
struct StoreInner {
    tables: RwLock<MemoryTables>,
    interleave: Mutex<Option<Interleave>>,
    injected_failure: Mutex<Option<DomainError>>,
}

/// Shared handle to the in-memory document store.
///
/// Cloning is cheap; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, MemoryTables> {
        self.inner.tables.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, MemoryTables> {
        self.inner.tables.write().await
    }

    /// Starts an optimistic transaction.
    pub fn begin(&self) -> MemoryTransaction<'_> {
        MemoryTransaction {
            store: self,
            reads: HashMap::new(),
            writes: Vec::new(),
        }
    }

    /// Runs `writer` against the tables right before the next commit validates.
    pub fn interleave_before_next_commit<F>(&self, writer: F)
    where
        F: FnOnce(&mut MemoryTables) + Send + 'static,
    {
        *lock(&self.inner.interleave) = Some(Box::new(writer));
    }

    /// Makes the next repository operation fail with `error`.
    pub fn fail_next_operation(&self, error: DomainError) {
        *lock(&self.inner.injected_failure) = Some(error);
    }

    /// Consumes an injected failure, if any. Called at the start of every
    /// repository operation.
    pub fn check_injected_failure(&self) -> Result<(), DomainError> {
        match lock(&self.inner.injected_failure).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_interleave(&self) -> Option<Interleave> {
        lock(&self.inner.interleave).take()
    }
}

enum Write {
    PutPack(Pack),
    RemoveDraft(DraftHistoryId),
}

/// Read-then-write unit of work against a [`MemoryStore`].
///
/// All reads must happen before the first staged write.
pub struct MemoryTransaction<'s> {
    store: &'s MemoryStore,
    reads: HashMap<DocKey, Option<u64>>,
    writes: Vec<Write>,
}

impl<'s> MemoryTransaction<'s> {
    fn ensure_reading(&self) -> Result<(), DomainError> {
        if self.writes.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InternalError,
                "Transaction read after a staged write",
            ))
        }
    }

    /// Reads a pack and records its version.
    pub async fn read_pack(&mut self, id: &PackId) -> Result<Option<Pack>, DomainError> {
        self.ensure_reading()?;
        let tables = self.store.read().await;
        let key = DocKey::Pack(*id);
        self.reads.entry(key).or_insert_with(|| tables.version_of(&key));
        Ok(tables.pack(id).cloned())
    }

    /// Reads a history entry and records its version.
    pub async fn read_draft(
        &mut self,
        id: &DraftHistoryId,
    ) -> Result<Option<DraftHistoryEntry>, DomainError> {
        self.ensure_reading()?;
        let tables = self.store.read().await;
        let key = DocKey::Draft(*id);
        self.reads.entry(key).or_insert_with(|| tables.version_of(&key));
        Ok(tables.draft(id).cloned())
    }

    pub fn put_pack(&mut self, pack: Pack) {
        self.writes.push(Write::PutPack(pack));
    }

    pub fn remove_draft(&mut self, id: DraftHistoryId) {
        self.writes.push(Write::RemoveDraft(id));
    }

    /// Validates read versions and applies staged writes atomically.
    ///
    /// # Errors
    ///
    /// - `Conflict` if any record read by this transaction changed
    pub async fn commit(self) -> Result<(), DomainError> {
        let mut tables = self.store.write().await;

        if let Some(writer) = self.store.take_interleave() {
            writer(&mut tables);
        }

        let stale = self
            .reads
            .iter()
            .filter(|(key, version)| tables.version_of(key) != **version)
            .count();
        if stale > 0 {
            return Err(DomainError::conflict(format!(
                "{} record(s) changed since they were read",
                stale
            )));
        }

        for write in self.writes {
            match write {
                Write::PutPack(pack) => tables.put_pack(pack),
                Write::RemoveDraft(id) => {
                    tables.remove_draft(&id);
                }
            }
        }
        Ok(())
    }
}

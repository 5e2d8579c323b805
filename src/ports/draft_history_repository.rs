//! Draft history repository port.
//!
//! Stores one immutable entry per confirmed draft. Deleting an entry is
//! coupled with reverting its picks into the inventory, so implementations
//! must share a transaction with the inventory store.

use crate::domain::foundation::{DomainError, DraftHistoryId, UserId};
use crate::domain::history::{DraftHistoryEntry, NewDraftRecord};
use crate::domain::inventory::PickCounts;
use async_trait::async_trait;

/// Repository port for recorded drafts.
#[async_trait]
pub trait DraftHistoryRepository: Send + Sync {
    /// Persist a new entry. The store assigns id and `completed_at`.
    async fn record(&self, record: NewDraftRecord) -> Result<DraftHistoryId, DomainError>;

    /// Find an entry by id.
    ///
    /// Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the entry belongs to another user
    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &DraftHistoryId,
    ) -> Result<Option<DraftHistoryEntry>, DomainError>;

    /// All entries of a user, newest first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<DraftHistoryEntry>, DomainError>;

    /// Delete an entry and revert `picks` into the inventory in one transaction.
    ///
    /// # Errors
    ///
    /// - `DraftNotFound` if the entry does not exist
    /// - `Forbidden` if the entry or any referenced pack belongs to another user
    /// - `Conflict` if concurrent writers exhausted the attempt budget
    async fn delete_with_revert(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
        picks: &PickCounts,
    ) -> Result<(), DomainError>;

    /// Set `restock_complete = true`. Idempotent.
    ///
    /// # Errors
    ///
    /// - `DraftNotFound` if the entry does not exist
    /// - `Forbidden` if the entry belongs to another user
    async fn set_restock_complete(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
    ) -> Result<(), DomainError>;
}

//! In-memory implementation of DraftHistoryRepository.
//!
//! Shares its [`MemoryStore`] with the inventory repository so that deleting
//! an entry and reverting its picks commit together.

use async_trait::async_trait;

use super::inventory_repository::stage_revert;
use super::store::MemoryStore;
use crate::adapters::retry::{retry_on_conflict, RetryPolicy};
use crate::domain::foundation::{
    DomainError, DraftHistoryId, ErrorCode, OwnedByUser, Timestamp, UserId,
};
use crate::domain::history::{DraftHistoryEntry, NewDraftRecord};
use crate::domain::inventory::PickCounts;
use crate::ports::DraftHistoryRepository;

/// Draft history repository backed by the in-process document store.
#[derive(Debug, Clone)]
pub struct InMemoryDraftHistoryRepository {
    store: MemoryStore,
    retry: RetryPolicy,
}

impl InMemoryDraftHistoryRepository {
    pub fn new(store: MemoryStore, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    async fn try_delete_with_revert(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
        picks: &PickCounts,
    ) -> Result<(), DomainError> {
        let mut tx = self.store.begin();

        let entry = tx.read_draft(id).await?.ok_or_else(|| draft_not_found(id))?;
        entry.check_ownership(user_id)?;

        stage_revert(&mut tx, user_id, picks).await?;
        tx.remove_draft(*id);

        tx.commit().await
    }
}

pub(super) fn draft_not_found(id: &DraftHistoryId) -> DomainError {
    DomainError::new(ErrorCode::DraftNotFound, format!("Draft not found: {}", id))
        .with_detail("draft_id", id.to_string())
}

#[async_trait]
impl DraftHistoryRepository for InMemoryDraftHistoryRepository {
    async fn record(&self, record: NewDraftRecord) -> Result<DraftHistoryId, DomainError> {
        self.store.check_injected_failure()?;
        let entry = DraftHistoryEntry::from_record(DraftHistoryId::new(), Timestamp::now(), record);
        let id = entry.id;
        self.store.write().await.put_draft(entry);
        Ok(id)
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &DraftHistoryId,
    ) -> Result<Option<DraftHistoryEntry>, DomainError> {
        self.store.check_injected_failure()?;
        let tables = self.store.read().await;
        match tables.draft(id) {
            Some(entry) => {
                entry.check_ownership(user_id)?;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<DraftHistoryEntry>, DomainError> {
        self.store.check_injected_failure()?;
        Ok(self.store.read().await.drafts_of(user_id))
    }

    async fn delete_with_revert(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
        picks: &PickCounts,
    ) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        retry_on_conflict(&self.retry, "delete_with_revert", |_| {
            self.try_delete_with_revert(id, user_id, picks)
        })
        .await
    }

    async fn set_restock_complete(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
    ) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        let mut tables = self.store.write().await;
        let entry = tables.draft(id).ok_or_else(|| draft_not_found(id))?;
        entry.check_ownership(user_id)?;
        if entry.restock_complete {
            return Ok(());
        }
        let mut updated = entry.clone();
        updated.restock_complete = true;
        tables.put_draft(updated);
        Ok(())
    }
}

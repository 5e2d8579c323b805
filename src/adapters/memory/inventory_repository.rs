//! In-memory implementation of InventoryRepository.
//!
//! Batch decrement, revert and increment run as optimistic transactions on the shared
//! [`MemoryStore`] and are retried on conflict.

use async_trait::async_trait;

use super::store::{MemoryStore, MemoryTransaction};
use crate::adapters::retry::{retry_on_conflict, RetryPolicy};
use crate::domain::foundation::{DomainError, ErrorCode, OwnedByUser, PackId, UserId};
use crate::domain::inventory::{merge_deltas, CountDelta, NewPack, Pack, PickCounts};
use crate::ports::InventoryRepository;

/// Inventory repository backed by the in-process document store.
#[derive(Debug, Clone)]
pub struct InMemoryInventoryRepository {
    store: MemoryStore,
    retry: RetryPolicy,
}

impl InMemoryInventoryRepository {
    pub fn new(store: MemoryStore, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Repository over a private store, for tests.
    pub fn standalone() -> Self {
        Self::new(MemoryStore::new(), RetryPolicy::immediate(5))
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    async fn try_confirm(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        let mut tx = self.store.begin();

        let mut current = Vec::with_capacity(picks.len());
        for (id, line) in picks.iter() {
            let pack = tx
                .read_pack(id)
                .await?
                .ok_or_else(|| pack_not_found(id))?;
            pack.check_ownership(owner)?;
            current.push((pack, line.count));
        }

        for (mut pack, count) in current {
            pack.in_person = pack.in_person.saturating_sub(count);
            tx.put_pack(pack);
        }

        tx.commit().await
    }

    async fn try_revert(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        let mut tx = self.store.begin();
        stage_revert(&mut tx, owner, picks).await?;
        tx.commit().await
    }

    async fn try_increment(&self, owner: &UserId, deltas: &[CountDelta]) -> Result<(), DomainError> {
        let mut tx = self.store.begin();

        let mut current = Vec::with_capacity(deltas.len());
        for delta in deltas {
            let pack = tx
                .read_pack(&delta.pack_id)
                .await?
                .ok_or_else(|| pack_not_found(&delta.pack_id))?;
            pack.check_ownership(owner)?;
            current.push((pack, delta));
        }

        for (mut pack, delta) in current {
            delta.apply_to(&mut pack);
            tx.put_pack(pack);
        }

        tx.commit().await
    }
}

pub(super) fn pack_not_found(id: &PackId) -> DomainError {
    DomainError::new(ErrorCode::PackNotFound, format!("Pack not found: {}", id))
        .with_detail("pack_id", id.to_string())
}

/// Reads every referenced pack, then stages the increments.
///
/// Missing packs are recreated under their original id.
pub(super) async fn stage_revert(
    tx: &mut MemoryTransaction<'_>,
    owner: &UserId,
    picks: &PickCounts,
) -> Result<(), DomainError> {
    let mut current = Vec::with_capacity(picks.len());
    for (id, line) in picks.iter() {
        let existing = tx.read_pack(id).await?;
        if let Some(pack) = &existing {
            pack.check_ownership(owner)?;
        }
        current.push((*id, line, existing));
    }

    for (id, line, existing) in current {
        let pack = match existing {
            Some(mut pack) => {
                pack.in_person = pack.in_person.saturating_add(line.count);
                pack
            }
            None => Pack::restored(id, owner.clone(), line),
        };
        tx.put_pack(pack);
    }
    Ok(())
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn load(&self, owner: &UserId) -> Result<Vec<Pack>, DomainError> {
        self.store.check_injected_failure()?;
        let tables = self.store.read().await;
        let mut packs: Vec<Pack> = tables.packs_of(owner).cloned().collect();
        packs.sort_by(|a, b| a.name_key().cmp(&b.name_key()).then(a.id.cmp(&b.id)));
        Ok(packs)
    }

    async fn find_by_id(&self, owner: &UserId, id: &PackId) -> Result<Option<Pack>, DomainError> {
        self.store.check_injected_failure()?;
        let tables = self.store.read().await;
        match tables.pack(id) {
            Some(pack) => {
                pack.check_ownership(owner)?;
                Ok(Some(pack.clone()))
            }
            None => Ok(None),
        }
    }

    async fn add(&self, owner: &UserId, pack: NewPack) -> Result<Pack, DomainError> {
        self.store.check_injected_failure()?;
        pack.validate()?;
        let created = Pack::from_new(PackId::new(), owner.clone(), pack);
        self.store.write().await.put_pack(created.clone());
        Ok(created)
    }

    async fn update(&self, owner: &UserId, pack: &Pack) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        pack.check_ownership(owner)?;
        pack.validate()?;

        let mut tables = self.store.write().await;
        let stored = tables.pack(&pack.id).ok_or_else(|| pack_not_found(&pack.id))?;
        stored.check_ownership(owner)?;

        let mut replacement = pack.clone();
        replacement.name = replacement.name.trim().to_string();
        tables.put_pack(replacement);
        Ok(())
    }

    async fn delete(&self, owner: &UserId, id: &PackId) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        let mut tables = self.store.write().await;
        let stored = tables.pack(id).ok_or_else(|| pack_not_found(id))?;
        stored.check_ownership(owner)?;
        tables.remove_pack(id);
        Ok(())
    }

    async fn clear_all(&self, owner: &UserId) -> Result<usize, DomainError> {
        self.store.check_injected_failure()?;
        let mut tables = self.store.write().await;
        let ids: Vec<PackId> = tables.packs_of(owner).map(|pack| pack.id).collect();
        for id in &ids {
            tables.remove_pack(id);
        }
        Ok(ids.len())
    }

    async fn confirm_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        if picks.is_empty() {
            return Ok(());
        }
        retry_on_conflict(&self.retry, "confirm_picks", |_| self.try_confirm(owner, picks)).await
    }

    async fn revert_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        if picks.is_empty() {
            return Ok(());
        }
        retry_on_conflict(&self.retry, "revert_picks", |_| self.try_revert(owner, picks)).await
    }

    async fn increment_counts(&self, owner: &UserId, deltas: &[CountDelta]) -> Result<(), DomainError> {
        self.store.check_injected_failure()?;
        if deltas.is_empty() {
            return Ok(());
        }
        let deltas = merge_deltas(deltas);
        retry_on_conflict(&self.retry, "increment_counts", |_| self.try_increment(owner, &deltas)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    fn other() -> UserId {
        UserId::new("other").unwrap()
    }

    async fn seed(repo: &InMemoryInventoryRepository, user: &UserId, name: &str, in_person: u32) -> Pack {
        repo.add(user, NewPack::new(name, "", in_person, 0)).await.unwrap()
    }

    #[tokio::test]
    async fn load_returns_only_owned_packs_sorted_by_name() {
        let repo = InMemoryInventoryRepository::standalone();
        seed(&repo, &owner(), "beta", 1).await;
        seed(&repo, &owner(), "Alpha", 1).await;
        seed(&repo, &other(), "Gamma", 1).await;

        let names: Vec<String> = repo
            .load(&owner())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[tokio::test]
    async fn add_rejects_blank_name() {
        let repo = InMemoryInventoryRepository::standalone();
        let err = repo.add(&owner(), NewPack::new("  ", "", 1, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn add_does_not_merge_by_name() {
        let repo = InMemoryInventoryRepository::standalone();
        seed(&repo, &owner(), "Same", 1).await;
        seed(&repo, &owner(), "Same", 2).await;
        assert_eq!(repo.load(&owner()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let repo = InMemoryInventoryRepository::standalone();
        let mut pack = seed(&repo, &owner(), "A", 1).await;
        pack.in_transit = 4;
        pack.image_url = "a.png".to_string();

        repo.update(&owner(), &pack).await.unwrap();

        let stored = repo.find_by_id(&owner(), &pack.id).await.unwrap().unwrap();
        assert_eq!(stored, pack);
    }

    #[tokio::test]
    async fn update_of_foreign_pack_is_forbidden() {
        let repo = InMemoryInventoryRepository::standalone();
        let mut pack = seed(&repo, &other(), "A", 1).await;

        let err = repo.update(&owner(), &pack).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        pack.owner_id = owner();
        let err = repo.update(&owner(), &pack).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_of_missing_pack_is_not_found() {
        let repo = InMemoryInventoryRepository::standalone();
        let pack = Pack::from_new(PackId::new(), owner(), NewPack::new("A", "", 1, 0));
        let err = repo.update(&owner(), &pack).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PackNotFound);
    }

    #[tokio::test]
    async fn delete_checks_ownership() {
        let repo = InMemoryInventoryRepository::standalone();
        let pack = seed(&repo, &other(), "A", 1).await;

        let err = repo.delete(&owner(), &pack.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        repo.delete(&other(), &pack.id).await.unwrap();
        assert!(repo.load(&other()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_all_only_touches_owner() {
        let repo = InMemoryInventoryRepository::standalone();
        seed(&repo, &owner(), "A", 1).await;
        seed(&repo, &owner(), "B", 1).await;
        seed(&repo, &other(), "C", 1).await;

        assert_eq!(repo.clear_all(&owner()).await.unwrap(), 2);
        assert!(repo.load(&owner()).await.unwrap().is_empty());
        assert_eq!(repo.load(&other()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirm_picks_decrements_and_clamps_at_zero() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 3).await;
        let b = seed(&repo, &owner(), "B", 1).await;

        let mut picks = PickCounts::new();
        picks.add(a.id, &a.name, "", 2);
        picks.add(b.id, &b.name, "", 4);
        repo.confirm_picks(&owner(), &picks).await.unwrap();

        let a = repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap();
        let b = repo.find_by_id(&owner(), &b.id).await.unwrap().unwrap();
        assert_eq!(a.in_person, 1);
        assert_eq!(b.in_person, 0);
    }

    #[tokio::test]
    async fn confirm_picks_with_missing_pack_writes_nothing() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 3).await;

        let mut picks = PickCounts::new();
        picks.add(a.id, &a.name, "", 1);
        picks.add(PackId::new(), "Ghost", "", 1);

        let err = repo.confirm_picks(&owner(), &picks).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PackNotFound);
        assert_eq!(repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap().in_person, 3);
    }

    #[tokio::test]
    async fn confirm_picks_retries_after_interleaved_write() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 3).await;

        let mut concurrent = a.clone();
        concurrent.in_person = 1;
        repo.store()
            .interleave_before_next_commit(move |tables| tables.put_pack(concurrent));

        let mut picks = PickCounts::new();
        picks.add(a.id, &a.name, "", 2);
        repo.confirm_picks(&owner(), &picks).await.unwrap();

        let stored = repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 0);
    }

    #[tokio::test]
    async fn confirm_picks_reports_conflict_when_budget_is_spent() {
        let store = MemoryStore::new();
        let repo = InMemoryInventoryRepository::new(store.clone(), RetryPolicy::immediate(1));
        let a = seed(&repo, &owner(), "A", 3).await;

        let mut concurrent = a.clone();
        concurrent.in_person = 2;
        store.interleave_before_next_commit(move |tables| tables.put_pack(concurrent));

        let mut picks = PickCounts::new();
        picks.add(a.id, &a.name, "", 1);
        let err = repo.confirm_picks(&owner(), &picks).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap().in_person, 2);
    }

    #[tokio::test]
    async fn revert_picks_increments_and_recreates() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 1).await;
        let gone_id = PackId::new();

        let mut picks = PickCounts::new();
        picks.add(a.id, &a.name, "", 2);
        picks.add(gone_id, "Gone", "gone.png", 3);
        repo.revert_picks(&owner(), &picks).await.unwrap();

        assert_eq!(repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap().in_person, 3);
        let restored = repo.find_by_id(&owner(), &gone_id).await.unwrap().unwrap();
        assert_eq!(restored.name, "Gone");
        assert_eq!(restored.in_person, 3);
        assert_eq!(restored.in_transit, 0);
        assert_eq!(restored.owner_id, owner());
    }

    #[tokio::test]
    async fn revert_picks_with_foreign_pack_writes_nothing() {
        let repo = InMemoryInventoryRepository::standalone();
        let mine = seed(&repo, &owner(), "Mine", 1).await;
        let theirs = seed(&repo, &other(), "Theirs", 1).await;

        let mut picks = PickCounts::new();
        picks.add(mine.id, &mine.name, "", 1);
        picks.add(theirs.id, &theirs.name, "", 1);

        let err = repo.revert_picks(&owner(), &picks).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(repo.find_by_id(&owner(), &mine.id).await.unwrap().unwrap().in_person, 1);
    }

    #[tokio::test]
    async fn injected_failure_surfaces_once() {
        let repo = InMemoryInventoryRepository::standalone();
        repo.store()
            .fail_next_operation(DomainError::new(ErrorCode::Connectivity, "offline"));

        assert_eq!(repo.load(&owner()).await.unwrap_err().code, ErrorCode::Connectivity);
        assert!(repo.load(&owner()).await.is_ok());
    }

    fn delta(id: PackId, in_person: u32, in_transit: u32) -> CountDelta {
        CountDelta {
            pack_id: id,
            in_person,
            in_transit,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn increment_counts_applies_to_current_values() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 5).await;

        let mut concurrent = a.clone();
        concurrent.in_person = 3;
        repo.store()
            .interleave_before_next_commit(move |tables| tables.put_pack(concurrent));

        repo.increment_counts(&owner(), &[delta(a.id, 1, 2)]).await.unwrap();

        let stored = repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 4);
        assert_eq!(stored.in_transit, 2);
    }

    #[tokio::test]
    async fn increment_counts_merges_repeated_packs_and_replaces_image() {
        let repo = InMemoryInventoryRepository::standalone();
        let a = seed(&repo, &owner(), "A", 1).await;
        let mut with_image = delta(a.id, 2, 0);
        with_image.image_url = Some("a.png".to_string());

        repo.increment_counts(&owner(), &[delta(a.id, 1, 0), with_image])
            .await
            .unwrap();

        let stored = repo.find_by_id(&owner(), &a.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 4);
        assert_eq!(stored.image_url, "a.png");
    }

    #[tokio::test]
    async fn increment_counts_with_missing_or_foreign_pack_writes_nothing() {
        let repo = InMemoryInventoryRepository::standalone();
        let mine = seed(&repo, &owner(), "Mine", 1).await;
        let theirs = seed(&repo, &other(), "Theirs", 1).await;

        let err = repo
            .increment_counts(&owner(), &[delta(mine.id, 1, 0), delta(theirs.id, 1, 0)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = repo
            .increment_counts(&owner(), &[delta(mine.id, 1, 0), delta(PackId::new(), 1, 0)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PackNotFound);

        let stored = repo.find_by_id(&owner(), &mine.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 1);
    }
}

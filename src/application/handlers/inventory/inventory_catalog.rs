//! InventoryCatalog - cached view of one owner's packs.
//!
//! Remote first, local second: every mutation is sent to the repository and
//! the cached list only changes once the repository accepted it. A failed
//! refresh keeps the previously loaded list.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, PackId, UserId};
use crate::domain::inventory::{InventorySummary, NewPack, Pack};
use crate::ports::InventoryRepository;

/// Last known pack list of an owner.
pub struct InventoryCatalog {
    repository: Arc<dyn InventoryRepository>,
    owner: UserId,
    packs: Vec<Pack>,
    loading: bool,
    last_error: Option<DomainError>,
}

impl InventoryCatalog {
    pub fn new(repository: Arc<dyn InventoryRepository>, owner: UserId) -> Self {
        Self {
            repository,
            owner,
            packs: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error of the most recent failed refresh, cleared by a successful one.
    pub fn last_error(&self) -> Option<&DomainError> {
        self.last_error.as_ref()
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary::from_packs(&self.packs)
    }

    pub fn get(&self, id: &PackId) -> Option<&Pack> {
        self.packs.iter().find(|pack| pack.id == *id)
    }

    /// Reloads the list from the repository.
    pub async fn refresh(&mut self) -> Result<&[Pack], DomainError> {
        self.loading = true;
        let loaded = self.repository.load(&self.owner).await;
        self.loading = false;

        match loaded {
            Ok(packs) => {
                self.packs = packs;
                self.last_error = None;
                Ok(self.packs.as_slice())
            }
            Err(err) => {
                tracing::warn!(owner = %self.owner, error = %err, "Inventory refresh failed, keeping cached list");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn add(&mut self, new_pack: NewPack) -> Result<Pack, DomainError> {
        let created = self.repository.add(&self.owner, new_pack).await?;
        self.packs.push(created.clone());
        Ok(created)
    }

    /// Writes through, then caches the pack as stored (name trimmed).
    pub async fn update(&mut self, mut pack: Pack) -> Result<(), DomainError> {
        self.repository.update(&self.owner, &pack).await?;
        pack.name = pack.name.trim().to_string();
        if let Some(slot) = self.packs.iter_mut().find(|cached| cached.id == pack.id) {
            *slot = pack;
        } else {
            self.packs.push(pack);
        }
        Ok(())
    }

    /// Deletes remotely, then drops the pack from the cache.
    pub async fn remove(&mut self, id: &PackId) -> Result<(), DomainError> {
        self.repository.delete(&self.owner, id).await?;
        self.packs.retain(|pack| pack.id != *id);
        Ok(())
    }

    /// Deletes every pack of the owner.
    pub async fn clear_all(&mut self) -> Result<usize, DomainError> {
        let removed = self.repository.clear_all(&self.owner).await?;
        self.packs.clear();
        tracing::info!(owner = %self.owner, removed, "Inventory cleared");
        Ok(removed)
    }
}

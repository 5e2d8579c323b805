//! Composition root: picks the storage backend from configuration and hands
//! out handlers wired to it.
//!
//! Without a database URL both repositories share one in-process
//! [`MemoryStore`]; with one, both run over a single PostgreSQL pool.

use std::sync::Arc;

use crate::adapters::memory::{InMemoryDraftHistoryRepository, InMemoryInventoryRepository, MemoryStore};
use crate::adapters::postgres::{self, PostgresDraftHistoryRepository, PostgresInventoryRepository};
use crate::application::{
    DeleteDraftHandler, DraftEngine, ImportPacksHandler, InventoryCatalog, ListDraftsHandler,
    MarkRestockCompleteHandler, RestockNeededHandler,
};
use crate::config::{AppConfig, DraftConfig};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{DraftHistoryRepository, InventoryRepository};

/// Repositories and draft settings shared by every handler.
#[derive(Clone)]
pub struct Services {
    pub inventory: Arc<dyn InventoryRepository>,
    pub history: Arc<dyn DraftHistoryRepository>,
    pub draft: DraftConfig,
}

impl Services {
    /// Builds the repositories the configuration asks for.
    ///
    /// # Errors
    ///
    /// - `Connectivity` if the configured database cannot be reached
    /// - `DatabaseError` if migrations were requested and failed
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let retry = config.draft.retry_policy();

        if !config.database.is_configured() {
            tracing::info!("No database URL configured, using in-memory store");
            let store = MemoryStore::new();
            return Ok(Self {
                inventory: Arc::new(InMemoryInventoryRepository::new(store.clone(), retry.clone())),
                history: Arc::new(InMemoryDraftHistoryRepository::new(store, retry)),
                draft: config.draft.clone(),
            });
        }

        let pool = postgres::connect(&config.database).await?;
        if config.database.run_migrations {
            postgres::run_migrations(&pool).await?;
        }
        tracing::info!("Using PostgreSQL store");

        Ok(Self {
            inventory: Arc::new(PostgresInventoryRepository::new(pool.clone(), retry.clone())),
            history: Arc::new(PostgresDraftHistoryRepository::new(pool, retry)),
            draft: config.draft.clone(),
        })
    }

    pub fn draft_engine(&self, owner: UserId) -> DraftEngine {
        DraftEngine::new(
            self.inventory.clone(),
            self.history.clone(),
            owner,
            self.draft.clone(),
        )
    }

    pub fn inventory_catalog(&self, owner: UserId) -> InventoryCatalog {
        InventoryCatalog::new(self.inventory.clone(), owner)
    }

    pub fn import_packs_handler(&self) -> ImportPacksHandler {
        ImportPacksHandler::new(self.inventory.clone())
    }

    pub fn delete_draft_handler(&self) -> DeleteDraftHandler {
        DeleteDraftHandler::new(self.history.clone())
    }

    pub fn list_drafts_handler(&self) -> ListDraftsHandler {
        ListDraftsHandler::new(self.history.clone())
    }

    pub fn mark_restock_complete_handler(&self) -> MarkRestockCompleteHandler {
        MarkRestockCompleteHandler::new(self.history.clone())
    }

    pub fn restock_needed_handler(&self) -> RestockNeededHandler {
        RestockNeededHandler::new(self.history.clone(), self.inventory.clone())
    }
}

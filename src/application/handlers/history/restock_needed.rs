//! RestockNeededHandler - Query handler for packs to put back on the shelf.
//!
//! Answers against the current durable inventory, not the inventory at the
//! time of the draft.

use std::sync::Arc;

use crate::domain::foundation::{DraftHistoryId, UserId};
use crate::domain::history::{packs_needing_restock, DraftedPack, HistoryError};
use crate::ports::{DraftHistoryRepository, InventoryRepository};

/// Query for the packs of one draft that still need restocking.
#[derive(Debug, Clone)]
pub struct RestockNeededQuery {
    pub user_id: UserId,
    pub draft_id: DraftHistoryId,
}

pub struct RestockNeededHandler {
    history: Arc<dyn DraftHistoryRepository>,
    inventory: Arc<dyn InventoryRepository>,
}

impl RestockNeededHandler {
    pub fn new(
        history: Arc<dyn DraftHistoryRepository>,
        inventory: Arc<dyn InventoryRepository>,
    ) -> Self {
        Self { history, inventory }
    }

    pub async fn handle(&self, query: RestockNeededQuery) -> Result<Vec<DraftedPack>, HistoryError> {
        let entry = self
            .history
            .find_by_id(&query.user_id, &query.draft_id)
            .await?
            .ok_or(HistoryError::NotFound(query.draft_id))?;
        if entry.restock_complete {
            return Ok(Vec::new());
        }

        let inventory = self.inventory.load(&query.user_id).await?;
        Ok(packs_needing_restock(&entry, &inventory))
    }
}

//! DeleteDraftHandler - Command handler for deleting a recorded draft.
//!
//! Deleting a draft hands its packs back to the inventory. The entry removal
//! and every increment commit in one transaction; packs deleted since the
//! draft are recreated with the drafted count.

use std::sync::Arc;

use crate::domain::foundation::{DraftHistoryId, UserId};
use crate::domain::history::{drafted_pick_counts, DraftedPlayer, HistoryError};
use crate::ports::DraftHistoryRepository;

/// Command to delete a draft and revert its picks.
#[derive(Debug, Clone)]
pub struct DeleteDraftCommand {
    pub user_id: UserId,
    pub draft_id: DraftHistoryId,
    /// Players whose packs are reverted. `None` reverts what the stored
    /// entry recorded.
    pub players: Option<Vec<DraftedPlayer>>,
}

/// Result of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteDraftResult {
    pub packs_reverted: u64,
}

/// Handler for deleting drafts.
pub struct DeleteDraftHandler {
    repository: Arc<dyn DraftHistoryRepository>,
}

impl DeleteDraftHandler {
    pub fn new(repository: Arc<dyn DraftHistoryRepository>) -> Self {
        Self { repository }
    }

    #[tracing::instrument(skip(self, cmd), fields(user = %cmd.user_id, draft = %cmd.draft_id))]
    pub async fn handle(&self, cmd: DeleteDraftCommand) -> Result<DeleteDraftResult, HistoryError> {
        let picks = match cmd.players {
            Some(players) => drafted_pick_counts(&players),
            None => self
                .repository
                .find_by_id(&cmd.user_id, &cmd.draft_id)
                .await?
                .ok_or(HistoryError::NotFound(cmd.draft_id))?
                .pick_counts(),
        };

        if let Err(err) = self
            .repository
            .delete_with_revert(&cmd.draft_id, &cmd.user_id, &picks)
            .await
        {
            tracing::warn!(error = %err, "Draft delete rejected");
            return Err(err.into());
        }

        let packs_reverted = picks.total();
        tracing::info!(packs_reverted, "Draft deleted and picks reverted");
        Ok(DeleteDraftResult { packs_reverted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDraftHistoryRepository, InMemoryInventoryRepository, MemoryStore};
    use crate::adapters::RetryPolicy;
    use crate::domain::foundation::DraftSessionId;
    use crate::domain::history::{DraftedPack, NewDraftRecord};
    use crate::domain::inventory::{NewPack, Pack};
    use crate::ports::InventoryRepository;

    struct Fixture {
        inventory: Arc<InMemoryInventoryRepository>,
        history: Arc<InMemoryDraftHistoryRepository>,
        handler: DeleteDraftHandler,
    }

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let inventory = Arc::new(InMemoryInventoryRepository::new(store.clone(), RetryPolicy::immediate(3)));
        let history = Arc::new(InMemoryDraftHistoryRepository::new(store, RetryPolicy::immediate(3)));
        let handler = DeleteDraftHandler::new(history.clone());
        Fixture { inventory, history, handler }
    }

    fn player(name: &str, packs: &[&Pack]) -> DraftedPlayer {
        DraftedPlayer {
            name: name.to_string(),
            packs: packs.iter().map(|pack| DraftedPack::from(*pack)).collect(),
        }
    }

    async fn record(fx: &Fixture, players: Vec<DraftedPlayer>) -> DraftHistoryId {
        fx.history
            .record(NewDraftRecord {
                session_id: DraftSessionId::new(),
                user_id: owner(),
                players,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reverts_stored_picks_when_players_omitted() {
        let fx = fixture();
        let pack = fx.inventory.add(&owner(), NewPack::new("Bloomburrow", "", 1, 0)).await.unwrap();
        let draft_id = record(&fx, vec![player("P1", &[&pack]), player("P2", &[&pack])]).await;

        let result = fx
            .handler
            .handle(DeleteDraftCommand {
                user_id: owner(),
                draft_id,
                players: None,
            })
            .await
            .unwrap();

        assert_eq!(result.packs_reverted, 2);
        let stored = fx.inventory.find_by_id(&owner(), &pack.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 3);
        assert!(fx.history.list(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recreates_pack_deleted_since_the_draft() {
        let fx = fixture();
        let pack = fx.inventory.add(&owner(), NewPack::new("Foundations", "fdn.png", 0, 0)).await.unwrap();
        let players = vec![player("P1", &[&pack])];
        let draft_id = record(&fx, players.clone()).await;
        fx.inventory.delete(&owner(), &pack.id).await.unwrap();

        fx.handler
            .handle(DeleteDraftCommand {
                user_id: owner(),
                draft_id,
                players: Some(players),
            })
            .await
            .unwrap();

        let restored = fx.inventory.find_by_id(&owner(), &pack.id).await.unwrap().unwrap();
        assert_eq!(restored.name, "Foundations");
        assert_eq!(restored.in_person, 1);
        assert_eq!(restored.in_transit, 0);
    }

    #[tokio::test]
    async fn unknown_draft_is_not_found() {
        let fx = fixture();
        let missing = DraftHistoryId::new();

        let err = fx
            .handler
            .handle(DeleteDraftCommand {
                user_id: owner(),
                draft_id: missing,
                players: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, HistoryError::NotFound(missing));
    }

    #[tokio::test]
    async fn foreign_draft_is_forbidden_and_untouched() {
        let fx = fixture();
        let pack = fx.inventory.add(&owner(), NewPack::new("Duskmourn", "", 2, 0)).await.unwrap();
        let players = vec![player("P1", &[&pack])];
        let draft_id = record(&fx, players.clone()).await;

        let err = fx
            .handler
            .handle(DeleteDraftCommand {
                user_id: UserId::new("intruder").unwrap(),
                draft_id,
                players: Some(players),
            })
            .await
            .unwrap_err();

        assert_eq!(err, HistoryError::Forbidden);
        assert_eq!(fx.history.list(&owner()).await.unwrap().len(), 1);
        let stored = fx.inventory.find_by_id(&owner(), &pack.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 2);
    }
}

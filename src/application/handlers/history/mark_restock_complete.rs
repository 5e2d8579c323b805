//! MarkRestockCompleteHandler - Command handler for the restock flag.

use std::sync::Arc;

use crate::domain::foundation::{DraftHistoryId, UserId};
use crate::domain::history::HistoryError;
use crate::ports::DraftHistoryRepository;

/// Command to mark a draft's packs as restocked.
#[derive(Debug, Clone)]
pub struct MarkRestockCompleteCommand {
    pub user_id: UserId,
    pub draft_id: DraftHistoryId,
}

/// Handler for the restock flag. Marking twice is not an error.
pub struct MarkRestockCompleteHandler {
    repository: Arc<dyn DraftHistoryRepository>,
}

impl MarkRestockCompleteHandler {
    pub fn new(repository: Arc<dyn DraftHistoryRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: MarkRestockCompleteCommand) -> Result<(), HistoryError> {
        self.repository
            .set_restock_complete(&cmd.draft_id, &cmd.user_id)
            .await?;
        tracing::debug!(user = %cmd.user_id, draft = %cmd.draft_id, "Restock marked complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDraftHistoryRepository, MemoryStore};
    use crate::adapters::RetryPolicy;
    use crate::domain::foundation::DraftSessionId;
    use crate::domain::history::NewDraftRecord;

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    async fn setup() -> (Arc<InMemoryDraftHistoryRepository>, DraftHistoryId) {
        let repo = Arc::new(InMemoryDraftHistoryRepository::new(MemoryStore::new(), RetryPolicy::immediate(3)));
        let id = repo
            .record(NewDraftRecord {
                session_id: DraftSessionId::new(),
                user_id: owner(),
                players: Vec::new(),
            })
            .await
            .unwrap();
        (repo, id)
    }

    #[tokio::test]
    async fn marking_is_idempotent() {
        let (repo, draft_id) = setup().await;
        let handler = MarkRestockCompleteHandler::new(repo.clone());
        let cmd = MarkRestockCompleteCommand { user_id: owner(), draft_id };

        handler.handle(cmd.clone()).await.unwrap();
        handler.handle(cmd).await.unwrap();

        let entry = repo.find_by_id(&owner(), &draft_id).await.unwrap().unwrap();
        assert!(entry.restock_complete);
    }

    #[tokio::test]
    async fn other_user_cannot_mark() {
        let (repo, draft_id) = setup().await;
        let handler = MarkRestockCompleteHandler::new(repo.clone());

        let err = handler
            .handle(MarkRestockCompleteCommand {
                user_id: UserId::new("someone-else").unwrap(),
                draft_id,
            })
            .await
            .unwrap_err();

        assert_eq!(err, HistoryError::Forbidden);
        let entry = repo.find_by_id(&owner(), &draft_id).await.unwrap().unwrap();
        assert!(!entry.restock_complete);
    }

    #[tokio::test]
    async fn unknown_draft_is_not_found() {
        let (repo, _) = setup().await;
        let handler = MarkRestockCompleteHandler::new(repo);
        let missing = DraftHistoryId::new();

        let err = handler
            .handle(MarkRestockCompleteCommand { user_id: owner(), draft_id: missing })
            .await
            .unwrap_err();

        assert_eq!(err, HistoryError::NotFound(missing));
    }
}

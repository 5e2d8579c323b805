//! ListDraftsHandler - Query handler for a user's draft history.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::history::{DraftHistoryEntry, HistoryError};
use crate::ports::DraftHistoryRepository;

/// Query for every recorded draft of a user.
#[derive(Debug, Clone)]
pub struct ListDraftsQuery {
    pub user_id: UserId,
}

/// Handler for listing recorded drafts.
pub struct ListDraftsHandler {
    repository: Arc<dyn DraftHistoryRepository>,
}

impl ListDraftsHandler {
    pub fn new(repository: Arc<dyn DraftHistoryRepository>) -> Self {
        Self { repository }
    }

    /// Newest first.
    pub async fn handle(&self, query: ListDraftsQuery) -> Result<Vec<DraftHistoryEntry>, HistoryError> {
        Ok(self.repository.list(&query.user_id).await?)
    }
}

//! ImportPacksHandler - Command handler for bulk pack import.
//!
//! Rows are merged by trimmed, case-insensitive name among themselves and
//! into existing packs before anything is written.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::inventory::{plan_import, ImportRow};
use crate::ports::InventoryRepository;

/// Command to import a batch of rows.
#[derive(Debug, Clone)]
pub struct ImportPacksCommand {
    pub owner: UserId,
    pub rows: Vec<ImportRow>,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportPacksResult {
    pub created: usize,
    pub updated: usize,
}

/// Handler for bulk imports.
pub struct ImportPacksHandler {
    repository: Arc<dyn InventoryRepository>,
}

impl ImportPacksHandler {
    pub fn new(repository: Arc<dyn InventoryRepository>) -> Self {
        Self { repository }
    }

    /// Plans against a fresh load, then applies increments and creates.
    ///
    /// Rows for existing packs become count deltas applied in one
    /// transaction against the stored values, so a concurrent draft
    /// decrement between the load and the write is kept. Creates run
    /// afterwards and are not atomic as a group.
    pub async fn handle(&self, cmd: ImportPacksCommand) -> Result<ImportPacksResult, DomainError> {
        let existing = self.repository.load(&cmd.owner).await?;
        let plan = plan_import(&existing, cmd.rows)?;

        let mut result = ImportPacksResult::default();
        self.repository
            .increment_counts(&cmd.owner, &plan.updates)
            .await?;
        result.updated = plan.updates.len();
        for new_pack in plan.creates {
            self.repository.add(&cmd.owner, new_pack).await?;
            result.created += 1;
        }

        tracing::info!(
            owner = %cmd.owner,
            created = result.created,
            updated = result.updated,
            "Packs imported"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryInventoryRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::inventory::NewPack;

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    fn row(name: &str, in_person: u32, image_url: &str) -> ImportRow {
        ImportRow {
            name: name.to_string(),
            image_url: image_url.to_string(),
            in_person,
            in_transit: 0,
        }
    }

    #[tokio::test]
    async fn merges_rows_into_existing_and_new_packs() {
        let repo = Arc::new(InMemoryInventoryRepository::standalone());
        repo.add(&owner(), NewPack::new("Outlaws", "otj.png", 2, 0))
            .await
            .unwrap();
        let handler = ImportPacksHandler::new(repo.clone());

        let result = handler
            .handle(ImportPacksCommand {
                owner: owner(),
                rows: vec![
                    row(" outlaws ", 3, ""),
                    row("Aetherdrift", 1, "dft.png"),
                    row("AETHERDRIFT", 2, ""),
                ],
            })
            .await
            .unwrap();

        assert_eq!(result, ImportPacksResult { created: 1, updated: 1 });

        let packs = repo.load(&owner()).await.unwrap();
        assert_eq!(packs.len(), 2);
        let outlaws = packs.iter().find(|p| p.name == "Outlaws").unwrap();
        assert_eq!(outlaws.in_person, 5);
        assert_eq!(outlaws.image_url, "otj.png");
        let aetherdrift = packs.iter().find(|p| p.name == "Aetherdrift").unwrap();
        assert_eq!(aetherdrift.in_person, 3);
        assert_eq!(aetherdrift.image_url, "dft.png");
    }

    #[tokio::test]
    async fn import_keeps_decrement_committed_after_load() {
        let repo = Arc::new(InMemoryInventoryRepository::standalone());
        let alpha = repo
            .add(&owner(), NewPack::new("Alpha", "", 5, 0))
            .await
            .unwrap();
        let handler = ImportPacksHandler::new(repo.clone());

        let mut drafted = alpha.clone();
        drafted.in_person = 3;
        repo.store()
            .interleave_before_next_commit(move |tables| tables.put_pack(drafted));

        let result = handler
            .handle(ImportPacksCommand {
                owner: owner(),
                rows: vec![row("alpha", 1, "")],
            })
            .await
            .unwrap();

        assert_eq!(result, ImportPacksResult { created: 0, updated: 1 });
        let stored = repo.find_by_id(&owner(), &alpha.id).await.unwrap().unwrap();
        assert_eq!(stored.in_person, 4);
    }

    #[tokio::test]
    async fn blank_row_aborts_before_writing() {
        let repo = Arc::new(InMemoryInventoryRepository::standalone());
        let handler = ImportPacksHandler::new(repo.clone());

        let err = handler
            .handle(ImportPacksCommand {
                owner: owner(),
                rows: vec![row("Valid", 1, ""), row("  ", 1, "")],
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(repo.load(&owner()).await.unwrap().is_empty());
    }
}

//! PostgreSQL implementation of DraftHistoryRepository.
//!
//! Players are stored as a JSONB document. Delete-with-revert locks the
//! entry and every referenced pack in one SERIALIZABLE transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::errors::map_sqlx_error;
use super::inventory_repository::{begin_serializable, revert_in_tx};
use crate::adapters::retry::{retry_on_conflict, RetryPolicy};
use crate::domain::foundation::{
    DomainError, DraftHistoryId, DraftSessionId, ErrorCode, Timestamp, UserId,
};
use crate::domain::history::{DraftHistoryEntry, DraftedPlayer, NewDraftRecord};
use crate::domain::inventory::PickCounts;
use crate::ports::DraftHistoryRepository;

/// PostgreSQL implementation of the DraftHistoryRepository port.
pub struct PostgresDraftHistoryRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresDraftHistoryRepository {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    async fn try_delete_with_revert(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
        picks: &PickCounts,
    ) -> Result<(), DomainError> {
        let mut tx = begin_serializable(&self.pool).await?;

        let owner: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM draft_history WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to read draft", e))?;

        match owner {
            None => return Err(draft_not_found(id)),
            Some((owner_id,)) if owner_id != user_id.as_str() => {
                return Err(forbidden(owner_id, user_id));
            }
            Some(_) => {}
        }

        revert_in_tx(&mut tx, user_id, picks).await?;

        sqlx::query("DELETE FROM draft_history WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete draft", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn owner_of(&self, id: &DraftHistoryId) -> Result<Option<String>, DomainError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM draft_history WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to fetch draft", e))?;
        Ok(row.map(|(owner,)| owner))
    }
}

/// Database row representation of a history entry.
#[derive(Debug, sqlx::FromRow)]
struct DraftHistoryRow {
    id: Uuid,
    session_id: Uuid,
    user_id: String,
    completed_at: DateTime<Utc>,
    players: Json<Vec<DraftedPlayer>>,
    restock_complete: bool,
}

impl TryFrom<DraftHistoryRow> for DraftHistoryEntry {
    type Error = DomainError;

    fn try_from(row: DraftHistoryRow) -> Result<Self, Self::Error> {
        Ok(DraftHistoryEntry {
            id: DraftHistoryId::from_uuid(row.id),
            session_id: DraftSessionId::from_uuid(row.session_id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            completed_at: Timestamp::from_datetime(row.completed_at),
            players: row.players.0,
            restock_complete: row.restock_complete,
        })
    }
}

fn draft_not_found(id: &DraftHistoryId) -> DomainError {
    DomainError::new(ErrorCode::DraftNotFound, format!("Draft not found: {}", id))
        .with_detail("draft_id", id.to_string())
}

fn forbidden(owner_id: String, requested_by: &UserId) -> DomainError {
    DomainError::new(ErrorCode::Forbidden, "User does not own this resource")
        .with_detail("owner_id", owner_id)
        .with_detail("requested_by", requested_by.to_string())
}

#[async_trait]
impl DraftHistoryRepository for PostgresDraftHistoryRepository {
    async fn record(&self, record: NewDraftRecord) -> Result<DraftHistoryId, DomainError> {
        let id = DraftHistoryId::new();

        sqlx::query(
            r#"
            INSERT INTO draft_history (id, session_id, user_id, players)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.session_id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(Json(&record.players))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to record draft", e))?;

        Ok(id)
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &DraftHistoryId,
    ) -> Result<Option<DraftHistoryEntry>, DomainError> {
        let row: Option<DraftHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, user_id, completed_at, players, restock_complete
            FROM draft_history WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to fetch draft", e))?;

        match row {
            Some(row) if row.user_id != user_id.as_str() => Err(forbidden(row.user_id, user_id)),
            Some(row) => Ok(Some(DraftHistoryEntry::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<DraftHistoryEntry>, DomainError> {
        let rows: Vec<DraftHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, user_id, completed_at, players, restock_complete
            FROM draft_history
            WHERE user_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list drafts", e))?;

        rows.into_iter().map(DraftHistoryEntry::try_from).collect()
    }

    async fn delete_with_revert(
        &self,
        id: &DraftHistoryId,
        user_id: &UserId,
        picks: &PickCounts,
    ) -> Result<(), DomainError> {
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
        let result = sqlx::query(
            "UPDATE draft_history SET restock_complete = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update draft", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        match self.owner_of(id).await? {
            Some(owner_id) => Err(forbidden(owner_id, user_id)),
            None => Err(draft_not_found(id)),
        }
    }
}

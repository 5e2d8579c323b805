//! PostgreSQL implementation of InventoryRepository.
//!
//! Batch decrement, revert and increment run in a SERIALIZABLE transaction: every
//! referenced row is read first, then all rows are written. Serialization
//! failures surface as `Conflict` and the whole transaction is retried.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::errors::{map_insert_race, map_sqlx_error};
use crate::adapters::retry::{retry_on_conflict, RetryPolicy};
use crate::domain::foundation::{DomainError, ErrorCode, OwnedByUser, PackId, UserId};
use crate::domain::inventory::{merge_deltas, CountDelta, NewPack, Pack, PickCounts};
use crate::ports::InventoryRepository;

/// PostgreSQL implementation of the InventoryRepository port.
pub struct PostgresInventoryRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    async fn try_confirm(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        let mut tx = begin_serializable(&self.pool).await?;

        let rows = fetch_packs_for_update(&mut tx, &picks.pack_ids()).await?;

        let mut updates = Vec::with_capacity(picks.len());
        for (id, line) in picks.iter() {
            let pack = rows
                .iter()
                .find(|pack| pack.id == *id)
                .ok_or_else(|| pack_not_found(id))?;
            pack.check_ownership(owner)?;
            updates.push((*id, pack.in_person.saturating_sub(line.count)));
        }

        for (id, in_person) in updates {
            write_in_person(&mut tx, &id, in_person).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn try_revert(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        let mut tx = begin_serializable(&self.pool).await?;
        revert_in_tx(&mut tx, owner, picks).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn try_increment(&self, owner: &UserId, deltas: &[CountDelta]) -> Result<(), DomainError> {
        let mut tx = begin_serializable(&self.pool).await?;

        let ids: Vec<PackId> = deltas.iter().map(|delta| delta.pack_id).collect();
        let rows = fetch_packs_for_update(&mut tx, &ids).await?;

        let mut updated = Vec::with_capacity(deltas.len());
        for delta in deltas {
            let mut pack = rows
                .iter()
                .find(|pack| pack.id == delta.pack_id)
                .cloned()
                .ok_or_else(|| pack_not_found(&delta.pack_id))?;
            pack.check_ownership(owner)?;
            delta.apply_to(&mut pack);
            updated.push(PackRow::from_pack(&pack)?);
        }

        for row in &updated {
            sqlx::query(
                "UPDATE packs SET in_person = $2, in_transit = $3, image_url = $4 WHERE id = $1",
            )
            .bind(row.id)
            .bind(row.in_person)
            .bind(row.in_transit)
            .bind(&row.image_url)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to update pack", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    /// Tells apart "missing" from "owned by someone else" after a scoped
    /// write touched no rows.
    async fn explain_missing(&self, owner: &UserId, id: &PackId) -> DomainError {
        let stored: Result<Option<(String,)>, _> =
            sqlx::query_as("SELECT owner_id FROM packs WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await;

        match stored {
            Ok(Some((owner_id,))) if owner_id != owner.as_str() => DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", owner_id)
            .with_detail("requested_by", owner.to_string()),
            Ok(_) => pack_not_found(id),
            Err(e) => map_sqlx_error("Failed to fetch pack", e),
        }
    }
}

/// Database row representation of a pack.
#[derive(Debug, sqlx::FromRow)]
struct PackRow {
    id: Uuid,
    owner_id: String,
    name: String,
    image_url: String,
    in_person: i32,
    in_transit: i32,
}

impl PackRow {
    /// Row for writing; fails for counts the INTEGER columns cannot hold.
    fn from_pack(pack: &Pack) -> Result<Self, DomainError> {
        Ok(Self {
            id: *pack.id.as_uuid(),
            owner_id: pack.owner_id.to_string(),
            name: pack.name.trim().to_string(),
            image_url: pack.image_url.clone(),
            in_person: count_to_db("in_person", pack.in_person)?,
            in_transit: count_to_db("in_transit", pack.in_transit)?,
        })
    }
}

impl TryFrom<PackRow> for Pack {
    type Error = DomainError;

    fn try_from(row: PackRow) -> Result<Self, Self::Error> {
        Ok(Pack {
            id: PackId::from_uuid(row.id),
            owner_id: UserId::new(row.owner_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid owner_id: {}", e))
            })?,
            name: row.name,
            image_url: row.image_url,
            in_person: count_from_db("in_person", row.in_person)?,
            in_transit: count_from_db("in_transit", row.in_transit)?,
        })
    }
}

fn count_from_db(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Negative {} in storage: {}", column, value),
        )
    })
}

fn count_to_db(column: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::validation(
            column,
            format!("{} of {} exceeds the storable maximum {}", column, value, i32::MAX),
        )
    })
}

pub(super) fn pack_not_found(id: &PackId) -> DomainError {
    DomainError::new(ErrorCode::PackNotFound, format!("Pack not found: {}", id))
        .with_detail("pack_id", id.to_string())
}

// ════════════════════════════════════════════════════════════════════════════════
// Transaction helpers (shared with the draft history repository)
// ════════════════════════════════════════════════════════════════════════════════

pub(super) async fn begin_serializable(
    pool: &PgPool,
) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, DomainError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to set isolation level", e))?;

    Ok(tx)
}

async fn fetch_packs_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ids: &[PackId],
) -> Result<Vec<Pack>, DomainError> {
    let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

    let rows: Vec<PackRow> = sqlx::query_as(
        r#"
        SELECT id, owner_id, name, image_url, in_person, in_transit
        FROM packs
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&uuids)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("Failed to read packs", e))?;

    rows.into_iter().map(Pack::try_from).collect()
}

async fn write_in_person(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: &PackId,
    in_person: u32,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE packs SET in_person = $2 WHERE id = $1")
        .bind(id.as_uuid())
        .bind(count_to_db("in_person", in_person)?)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update pack", e))?;
    Ok(())
}

/// Reads every referenced pack, then writes increments and recreations.
pub(super) async fn revert_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner: &UserId,
    picks: &PickCounts,
) -> Result<(), DomainError> {
    let rows = fetch_packs_for_update(tx, &picks.pack_ids()).await?;
    for pack in &rows {
        pack.check_ownership(owner)?;
    }

    for (id, line) in picks.iter() {
        match rows.iter().find(|pack| pack.id == *id) {
            Some(pack) => {
                write_in_person(tx, id, pack.in_person.saturating_add(line.count)).await?;
            }
            None => {
                let restored = PackRow::from_pack(&Pack::restored(*id, owner.clone(), line))?;
                insert_pack(&mut **tx, &restored)
                    .await
                    .map_err(|e| map_insert_race("Failed to recreate pack", e))?;
            }
        }
    }
    Ok(())
}

async fn insert_pack<'e, E>(executor: E, row: &PackRow) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO packs (id, owner_id, name, image_url, in_person, in_transit)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(row.id)
    .bind(&row.owner_id)
    .bind(&row.name)
    .bind(&row.image_url)
    .bind(row.in_person)
    .bind(row.in_transit)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn load(&self, owner: &UserId) -> Result<Vec<Pack>, DomainError> {
        let rows: Vec<PackRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, image_url, in_person, in_transit
            FROM packs
            WHERE owner_id = $1
            ORDER BY lower(trim(name)), id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to load packs", e))?;

        rows.into_iter().map(Pack::try_from).collect()
    }

    async fn find_by_id(&self, owner: &UserId, id: &PackId) -> Result<Option<Pack>, DomainError> {
        let row: Option<PackRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, image_url, in_person, in_transit
            FROM packs WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to fetch pack", e))?;

        match row {
            Some(row) => {
                let pack = Pack::try_from(row)?;
                pack.check_ownership(owner)?;
                Ok(Some(pack))
            }
            None => Ok(None),
        }
    }

    async fn add(&self, owner: &UserId, pack: NewPack) -> Result<Pack, DomainError> {
        pack.validate()?;
        let created = Pack::from_new(PackId::new(), owner.clone(), pack);
        insert_pack(&self.pool, &PackRow::from_pack(&created)?)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert pack", e))?;
        Ok(created)
    }

    async fn update(&self, owner: &UserId, pack: &Pack) -> Result<(), DomainError> {
        pack.check_ownership(owner)?;
        pack.validate()?;
        let row = PackRow::from_pack(pack)?;

        let result = sqlx::query(
            r#"
            UPDATE packs SET
                name = $3,
                image_url = $4,
                in_person = $5,
                in_transit = $6
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(row.id)
        .bind(owner.as_str())
        .bind(&row.name)
        .bind(&row.image_url)
        .bind(row.in_person)
        .bind(row.in_transit)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update pack", e))?;

        if result.rows_affected() == 0 {
            return Err(self.explain_missing(owner, &pack.id).await);
        }
        Ok(())
    }

    async fn delete(&self, owner: &UserId, id: &PackId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM packs WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete pack", e))?;

        if result.rows_affected() == 0 {
            return Err(self.explain_missing(owner, id).await);
        }
        Ok(())
    }

    async fn clear_all(&self, owner: &UserId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM packs WHERE owner_id = $1")
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to clear packs", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn confirm_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        if picks.is_empty() {
            return Ok(());
        }
        retry_on_conflict(&self.retry, "confirm_picks", |_| self.try_confirm(owner, picks)).await
    }

    async fn revert_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError> {
        if picks.is_empty() {
            return Ok(());
        }
        retry_on_conflict(&self.retry, "revert_picks", |_| self.try_revert(owner, picks)).await
    }

    async fn increment_counts(&self, owner: &UserId, deltas: &[CountDelta]) -> Result<(), DomainError> {
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

    fn row(in_person: i32) -> PackRow {
        PackRow {
            id: Uuid::new_v4(),
            owner_id: "owner".to_string(),
            name: "Foundations".to_string(),
            image_url: String::new(),
            in_person,
            in_transit: 0,
        }
    }

    #[test]
    fn row_converts_to_pack() {
        let row = row(4);
        let id = row.id;
        let pack = Pack::try_from(row).unwrap();
        assert_eq!(pack.id, PackId::from_uuid(id));
        assert_eq!(pack.in_person, 4);
        assert_eq!(pack.owner_id.as_str(), "owner");
    }

    #[test]
    fn negative_count_in_storage_is_rejected() {
        let err = Pack::try_from(row(-1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn oversized_count_is_rejected_for_storage() {
        assert_eq!(count_to_db("in_person", 7).unwrap(), 7);
        assert_eq!(count_to_db("in_person", i32::MAX as u32).unwrap(), i32::MAX);

        let err = count_to_db("in_person", u32::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn restored_pack_with_oversized_count_has_no_row() {
        let owner = UserId::new("owner").unwrap();
        let mut picks = PickCounts::new();
        let id = PackId::new();
        picks.add(id, "Huge", "", u32::MAX);
        let restored = Pack::restored(id, owner, picks.line(&id).unwrap());

        let err = PackRow::from_pack(&restored).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn row_for_writing_trims_name() {
        let mut pack = Pack::try_from(row(2)).unwrap();
        pack.name = "  Foundations ".to_string();
        let written = PackRow::from_pack(&pack).unwrap();
        assert_eq!(written.name, "Foundations");
        assert_eq!(written.in_person, 2);
    }
}

//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresInventoryRepository` - Owner-scoped packs with transactional batches
//! - `PostgresDraftHistoryRepository` - Recorded drafts with delete-with-revert
//!
//! The schema lives in `migrations/` and is applied by [`run_migrations`].

mod draft_history_repository;
mod errors;
mod inventory_repository;

pub use draft_history_repository::PostgresDraftHistoryRepository;
pub use inventory_repository::PostgresInventoryRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens a connection pool from configuration.
///
/// # Errors
///
/// - `ValidationFailed` if no database URL is configured
/// - `Connectivity` if the database cannot be reached
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config.expose_url().ok_or_else(|| {
        DomainError::validation("database.url", "No database URL configured")
    })?;

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(url)
        .await
        .map_err(|e| errors::map_sqlx_error("Failed to connect to database", e))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

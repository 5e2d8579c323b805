//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process document store with optimistic transactions
//! - `postgres` - PostgreSQL repositories over a `PgPool`
//! - `retry` - Conflict retry runner shared by both

pub mod memory;
pub mod postgres;
pub mod retry;

pub use memory::{InMemoryDraftHistoryRepository, InMemoryInventoryRepository, MemoryStore};
pub use postgres::{PostgresDraftHistoryRepository, PostgresInventoryRepository};
pub use retry::{retry_on_conflict, RetryPolicy};

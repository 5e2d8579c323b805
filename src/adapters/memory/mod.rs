//! In-memory storage adapters.
//!
//! Both repositories share one [`MemoryStore`], which gives them a common
//! optimistic transaction. Used for tests and for running without a database.

mod draft_history_repository;
mod inventory_repository;
mod store;

pub use draft_history_repository::InMemoryDraftHistoryRepository;
pub use inventory_repository::InMemoryInventoryRepository;
pub use store::{MemoryStore, MemoryTables, MemoryTransaction};

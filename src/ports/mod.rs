//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `InventoryRepository` - Owner-scoped pack CRUD plus transactional batch
//!   decrement and revert
//! - `DraftHistoryRepository` - Recorded drafts, delete-with-revert

mod draft_history_repository;
mod inventory_repository;

pub use draft_history_repository::DraftHistoryRepository;
pub use inventory_repository::InventoryRepository;

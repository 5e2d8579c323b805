//! Inventory handlers.

mod import_packs;
mod inventory_catalog;

pub use import_packs::{ImportPacksCommand, ImportPacksHandler, ImportPacksResult};
pub use inventory_catalog::InventoryCatalog;

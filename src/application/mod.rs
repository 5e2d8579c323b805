//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Write paths (confirm, import, delete) and read paths (catalog, history
//! listing, restock) are separate handlers over the same repositories.

pub mod handlers;

pub use handlers::{
    // Draft session
    ConfirmReceipt, DraftEngine,
    // History
    DeleteDraftCommand, DeleteDraftHandler, DeleteDraftResult,
    ListDraftsHandler, ListDraftsQuery,
    MarkRestockCompleteCommand, MarkRestockCompleteHandler,
    RestockNeededHandler, RestockNeededQuery,
    // Inventory
    ImportPacksCommand, ImportPacksHandler, ImportPacksResult, InventoryCatalog,
};

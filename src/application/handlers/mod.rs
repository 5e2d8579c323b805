//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod draft;
pub mod history;
pub mod inventory;

pub use draft::{ConfirmReceipt, DraftEngine};
pub use history::{
    DeleteDraftCommand, DeleteDraftHandler, DeleteDraftResult, ListDraftsHandler,
    ListDraftsQuery, MarkRestockCompleteCommand, MarkRestockCompleteHandler,
    RestockNeededHandler, RestockNeededQuery,
};
pub use inventory::{ImportPacksCommand, ImportPacksHandler, ImportPacksResult, InventoryCatalog};

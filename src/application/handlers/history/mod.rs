//! Draft history handlers.

mod delete_draft;
mod list_drafts;
mod mark_restock_complete;
mod restock_needed;

pub use delete_draft::{DeleteDraftCommand, DeleteDraftHandler, DeleteDraftResult};
pub use list_drafts::{ListDraftsHandler, ListDraftsQuery};
pub use mark_restock_complete::{MarkRestockCompleteCommand, MarkRestockCompleteHandler};
pub use restock_needed::{RestockNeededHandler, RestockNeededQuery};

//! Draft history domain module.
//!
//! A history entry is written once per confirmed draft and is immutable
//! except for the `restock_complete` flag. Deleting an entry hands its
//! drafted packs back to the inventory.

mod entry;
mod errors;
mod restock;

pub use entry::{drafted_pick_counts, DraftHistoryEntry, DraftedPack, DraftedPlayer, NewDraftRecord};
pub use errors::HistoryError;
pub use restock::packs_needing_restock;

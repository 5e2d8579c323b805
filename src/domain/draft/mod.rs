//! Draft domain module.
//!
//! A draft session deals packs to players in round-robin order, one weighted
//! random unit at a time, from a working copy of the owner's inventory.
//!
//! - `session` - the `DraftSession` aggregate (picks, undo, confirm state)
//! - `selection` - weighted sampling over the working pool
//! - `player` - seats and roster construction

mod errors;
mod player;
mod selection;
mod session;

pub use errors::DraftError;
pub use player::{build_roster, default_player_name, Player};
pub use selection::{pick_weighted, total_weight};
pub use session::{DraftSession, DraftSummary, MAX_PLAYERS};

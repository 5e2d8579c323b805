//! Inventory domain module.
//!
//! Packs are the durable, per-owner, quantity-tracked items that a draft
//! draws from. `in_person` is the draft weight; `in_transit` is carried for
//! display and accounting only.

mod import;
mod pack;
mod pick_counts;
mod summary;

pub use import::{merge_deltas, plan_import, CountDelta, ImportPlan, ImportRow};
pub use pack::{name_key, NewPack, Pack, MAX_NAME_LENGTH};
pub use pick_counts::{PickCounts, PickLine};
pub use summary::InventorySummary;

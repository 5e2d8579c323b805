//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `inventory` - Packs, pick counts, bulk import planning
//! - `draft` - Draft session aggregate and weighted selection
//! - `history` - Recorded drafts and restock derivation

pub mod draft;
pub mod foundation;
pub mod history;
pub mod inventory;

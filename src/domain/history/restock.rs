//! Restock-needed derivation.
//!
//! After a draft, every physically drafted copy has to be replaced in the
//! shared pool if the owner still holds copies of that pack. This is a pure
//! function of the entry and a current inventory snapshot.

use std::collections::{HashMap, HashSet};

use super::{DraftHistoryEntry, DraftedPack};
use crate::domain::foundation::PackId;
use crate::domain::inventory::Pack;

/// Distinct drafted packs that still have `in_person > 0` in `inventory`.
///
/// Empty once the entry is marked restock-complete. Order follows first
/// appearance in the entry.
pub fn packs_needing_restock(entry: &DraftHistoryEntry, inventory: &[Pack]) -> Vec<DraftedPack> {
    if entry.restock_complete {
        return Vec::new();
    }

    let available: HashMap<PackId, u32> = inventory
        .iter()
        .map(|pack| (pack.id, pack.in_person))
        .collect();

    let mut seen = HashSet::new();
    entry
        .players
        .iter()
        .flat_map(|player| player.packs.iter())
        .filter(|pack| available.get(&pack.id).copied().unwrap_or(0) > 0)
        .filter(|pack| seen.insert(pack.id))
        .cloned()
        .collect()
}

//! Inventory totals for display.

use serde::Serialize;

use super::Pack;

/// Totals over a pack list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub distinct_packs: usize,
    pub total_in_person: u64,
    pub total_in_transit: u64,
    pub depleted_packs: usize,
}

impl InventorySummary {
    pub fn from_packs(packs: &[Pack]) -> Self {
        packs.iter().fold(Self::default(), |mut acc, pack| {
            acc.distinct_packs += 1;
            acc.total_in_person += u64::from(pack.in_person);
            acc.total_in_transit += u64::from(pack.in_transit);
            if pack.is_depleted() {
                acc.depleted_packs += 1;
            }
            acc
        })
    }
}

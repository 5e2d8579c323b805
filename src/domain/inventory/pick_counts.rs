//! Aggregated per-pack pick counts.
//!
//! A session's chronological picks collapse into one line per pack before they
//! cross the storage boundary. Each line keeps the pack's display label so a
//! revert can recreate a pack that was deleted after the draft.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Pack;
use crate::domain::foundation::PackId;

/// One aggregated line: how many units of a pack, plus its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickLine {
    pub count: u32,
    pub name: String,
    pub image_url: String,
}

/// Multiplicity of picks per pack.
///
/// Ordered by `PackId` so transactional adapters touch rows in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickCounts(BTreeMap<PackId, PickLine>);

impl PickCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses a sequence of picked packs into counts.
    pub fn from_picks<'a>(picks: impl IntoIterator<Item = &'a Pack>) -> Self {
        let mut counts = Self::new();
        for pack in picks {
            counts.add(pack.id, &pack.name, &pack.image_url, 1);
        }
        counts
    }

    /// Adds `count` units of a pack. Zero counts are ignored.
    pub fn add(&mut self, id: PackId, name: &str, image_url: &str, count: u32) {
        if count == 0 {
            return;
        }
        self.0
            .entry(id)
            .and_modify(|line| line.count = line.count.saturating_add(count))
            .or_insert_with(|| PickLine {
                count,
                name: name.to_string(),
                image_url: image_url.to_string(),
            });
    }

    /// Units picked for a pack; zero when absent.
    pub fn get(&self, id: &PackId) -> u32 {
        self.0.get(id).map(|line| line.count).unwrap_or(0)
    }

    pub fn line(&self, id: &PackId) -> Option<&PickLine> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackId, &PickLine)> {
        self.0.iter()
    }

    pub fn pack_ids(&self) -> Vec<PackId> {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct packs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Total units across all packs.
    pub fn total(&self) -> u64 {
        self.0.values().map(|line| u64::from(line.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::inventory::NewPack;

    fn pack(name: &str) -> Pack {
        Pack::from_new(
            PackId::new(),
            UserId::new("owner").unwrap(),
            NewPack::new(name, format!("{}.png", name), 5, 0),
        )
    }

    #[test]
    fn from_picks_collapses_multiplicities() {
        let a = pack("A");
        let b = pack("B");
        let counts = PickCounts::from_picks([&a, &b, &a, &a]);

        assert_eq!(counts.get(&a.id), 3);
        assert_eq!(counts.get(&b.id), 1);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.line(&a.id).unwrap().name, "A");
    }

    #[test]
    fn absent_pack_counts_zero() {
        assert_eq!(PickCounts::new().get(&PackId::new()), 0);
    }

    #[test]
    fn add_ignores_zero() {
        let mut counts = PickCounts::new();
        counts.add(PackId::new(), "A", "", 0);
        assert!(counts.is_empty());
    }
}

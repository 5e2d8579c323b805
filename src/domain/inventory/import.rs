//! Bulk import planning.
//!
//! The repository never merges packs by name on `add`, so bulk import does it
//! up front: incoming rows are merged with each other and with the packs
//! already in the inventory, keyed by trimmed case-insensitive name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pack::name_key;
use super::{NewPack, Pack};
use crate::domain::foundation::{PackId, ValidationError};

/// One incoming row of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub in_person: u32,
    #[serde(default)]
    pub in_transit: u32,
}

/// Units to add to an existing pack.
///
/// Applied against the stored record at write time, never against the
/// snapshot the import was planned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDelta {
    pub pack_id: PackId,
    pub in_person: u32,
    pub in_transit: u32,
    /// Replacement image, if the import supplied a non-empty one.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CountDelta {
    pub fn new(pack_id: PackId) -> Self {
        Self {
            pack_id,
            in_person: 0,
            in_transit: 0,
            image_url: None,
        }
    }

    /// Adds the delta to `pack`, saturating at `u32::MAX`.
    pub fn apply_to(&self, pack: &mut Pack) {
        pack.in_person = pack.in_person.saturating_add(self.in_person);
        pack.in_transit = pack.in_transit.saturating_add(self.in_transit);
        if let Some(image_url) = &self.image_url {
            pack.image_url = image_url.clone();
        }
    }
}

/// Collapses deltas that target the same pack, keeping first-seen order.
///
/// A later non-empty image wins.
pub fn merge_deltas(deltas: &[CountDelta]) -> Vec<CountDelta> {
    let mut merged: Vec<CountDelta> = Vec::with_capacity(deltas.len());
    let mut slots: HashMap<PackId, usize> = HashMap::new();
    for delta in deltas {
        match slots.get(&delta.pack_id) {
            Some(&slot) => {
                let target = &mut merged[slot];
                target.in_person = target.in_person.saturating_add(delta.in_person);
                target.in_transit = target.in_transit.saturating_add(delta.in_transit);
                if delta.image_url.is_some() {
                    target.image_url = delta.image_url.clone();
                }
            }
            None => {
                slots.insert(delta.pack_id, merged.len());
                merged.push(delta.clone());
            }
        }
    }
    merged
}

/// What a bulk import will write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Packs to create, one per previously unknown name.
    pub creates: Vec<NewPack>,
    /// Increments for existing packs, one per matched pack.
    pub updates: Vec<CountDelta>,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

/// Plans the writes for importing `rows` into `existing`.
///
/// When the inventory already holds several packs with the same name, rows are
/// merged into the first of them. An existing image URL is only replaced by a
/// non-empty incoming one.
///
/// # Errors
///
/// - `EmptyField` if any row has a blank name
pub fn plan_import(existing: &[Pack], rows: Vec<ImportRow>) -> Result<ImportPlan, ValidationError> {
    let mut existing_by_key: HashMap<String, usize> = HashMap::new();
    for (index, pack) in existing.iter().enumerate() {
        existing_by_key.entry(pack.name_key()).or_insert(index);
    }

    let mut updates: Vec<CountDelta> = Vec::new();
    let mut update_slots: HashMap<String, usize> = HashMap::new();
    let mut creates: Vec<NewPack> = Vec::new();
    let mut create_slots: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let new_pack = NewPack::new(row.name.trim(), row.image_url.trim(), row.in_person, row.in_transit);
        new_pack.validate()?;
        let key = name_key(&new_pack.name);

        if let Some(&index) = existing_by_key.get(&key) {
            let slot = *update_slots.entry(key).or_insert_with(|| {
                updates.push(CountDelta::new(existing[index].id));
                updates.len() - 1
            });
            let delta = &mut updates[slot];
            delta.in_person = delta.in_person.saturating_add(new_pack.in_person);
            delta.in_transit = delta.in_transit.saturating_add(new_pack.in_transit);
            if !new_pack.image_url.is_empty() {
                delta.image_url = Some(new_pack.image_url);
            }
        } else if let Some(&slot) = create_slots.get(&key) {
            let pending = &mut creates[slot];
            pending.in_person = pending.in_person.saturating_add(new_pack.in_person);
            pending.in_transit = pending.in_transit.saturating_add(new_pack.in_transit);
            if !new_pack.image_url.is_empty() {
                pending.image_url = new_pack.image_url;
            }
        } else {
            create_slots.insert(key, creates.len());
            creates.push(new_pack);
        }
    }

    Ok(ImportPlan { creates, updates })
}

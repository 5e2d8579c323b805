//! Draft history entry - the durable record of one confirmed draft.

use serde::{Deserialize, Serialize};

use crate::domain::draft::Player;
use crate::domain::foundation::{
    DraftHistoryId, DraftSessionId, OwnedByUser, PackId, Timestamp, UserId,
};
use crate::domain::inventory::{Pack, PickCounts};

/// A pack as it was drafted: identity and label only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedPack {
    pub id: PackId,
    pub name: String,
    pub image_url: String,
}

impl From<&Pack> for DraftedPack {
    fn from(pack: &Pack) -> Self {
        Self {
            id: pack.id,
            name: pack.name.clone(),
            image_url: pack.image_url.clone(),
        }
    }
}

/// One player's haul in a recorded draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedPlayer {
    pub name: String,
    pub packs: Vec<DraftedPack>,
}

impl From<&Player> for DraftedPlayer {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            packs: player.selected_packs.iter().map(DraftedPack::from).collect(),
        }
    }
}

/// Flattens every player's packs into per-pack counts.
pub fn drafted_pick_counts(players: &[DraftedPlayer]) -> PickCounts {
    let mut counts = PickCounts::new();
    for pack in players.iter().flat_map(|player| player.packs.iter()) {
        counts.add(pack.id, &pack.name, &pack.image_url, 1);
    }
    counts
}

/// Input for recording a confirmed draft. The store assigns id and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDraftRecord {
    pub session_id: DraftSessionId,
    pub user_id: UserId,
    pub players: Vec<DraftedPlayer>,
}

/// Immutable record of a confirmed draft.
///
/// Only `restock_complete` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftHistoryEntry {
    pub id: DraftHistoryId,
    pub session_id: DraftSessionId,
    pub user_id: UserId,
    pub completed_at: Timestamp,
    pub players: Vec<DraftedPlayer>,
    #[serde(default)]
    pub restock_complete: bool,
}

impl DraftHistoryEntry {
    /// Materializes a record with store-assigned id and completion time.
    pub fn from_record(id: DraftHistoryId, completed_at: Timestamp, record: NewDraftRecord) -> Self {
        Self {
            id,
            session_id: record.session_id,
            user_id: record.user_id,
            completed_at,
            players: record.players,
            restock_complete: false,
        }
    }

    pub fn pick_counts(&self) -> PickCounts {
        drafted_pick_counts(&self.players)
    }

    /// Total packs drafted across all players.
    pub fn total_packs(&self) -> usize {
        self.players.iter().map(|player| player.packs.len()).sum()
    }
}

impl OwnedByUser for DraftHistoryEntry {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

//! Player seats of a draft session.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PlayerId;
use crate::domain::inventory::Pack;

/// One seat at the table. Seat order defines round-robin turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub selected_packs: Vec<Pack>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            selected_packs: Vec::new(),
        }
    }
}

/// Display name for the seat at zero-based `index`.
pub fn default_player_name(index: usize) -> String {
    format!("Player {}", index + 1)
}

/// Builds a roster of exactly `player_count` seats.
///
/// Names are padded or truncated to the count; missing or blank names fall
/// back to `"Player N"`.
pub fn build_roster(player_count: usize, names: &[String]) -> Vec<Player> {
    (0..player_count)
        .map(|index| {
            let name = names
                .get(index)
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_player_name(index));
            Player::new(name)
        })
        .collect()
}

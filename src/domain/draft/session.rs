//! Draft session aggregate.
//!
//! A session owns a point-in-time working copy of the inventory and runs the
//! round-robin draft against it. Nothing here touches storage: the working copy
//! is seeded once, mutated on every pick and undo, and only the aggregated
//! [`PickCounts`] leave the session when it is confirmed.
//!
//! # Turn order
//!
//! The player receiving pick `i` (zero-based) is always `players[i % n]`.
//! Assignment is recomputed from the position in `packs_selected_order`, never
//! stored per pick, so undo and replay use the same formula.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::build_roster;
use super::selection::{pick_weighted, total_weight};
use super::{DraftError, Player};
use crate::domain::foundation::{
    DraftSessionId, DraftStatus, PackId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::inventory::{Pack, PickCounts};

/// Maximum number of seats in one draft.
pub const MAX_PLAYERS: usize = 64;

/// Draft session aggregate.
///
/// # Invariants
///
/// - `players` is non-empty and its order never changes
/// - every entry of `temp_inventory` has `in_person > 0 || in_transit > 0`
/// - `players[k].selected_packs` equals the picks at positions `k, k + n, k + 2n, ...`
/// - a confirmed session accepts no picks and no undo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSession {
    id: DraftSessionId,
    owner_id: UserId,
    status: DraftStatus,
    players: Vec<Player>,
    num_packs: u32,
    packs_selected_order: Vec<Pack>,
    temp_inventory: BTreeMap<PackId, Pack>,
    started_at: Timestamp,
}

/// Display-oriented snapshot of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub picks_made: usize,
    pub picks_remaining: u32,
    pub next_player_index: usize,
    pub next_player_name: String,
    pub remaining_weight: u64,
    pub status: DraftStatus,
}

impl DraftSession {
    /// Starts a new active session over an inventory snapshot.
    ///
    /// `total_packs` defaults to `player_count * packs_per_player`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `player_count` is 0 or above [`MAX_PLAYERS`]
    /// - `ValidationFailed` if `total_packs` is `Some(0)`
    pub fn start(
        owner_id: UserId,
        player_count: usize,
        player_names: &[String],
        total_packs: Option<u32>,
        packs_per_player: u32,
        inventory: Vec<Pack>,
    ) -> Result<Self, DraftError> {
        if player_count == 0 || player_count > MAX_PLAYERS {
            return Err(ValidationError::out_of_range(
                "player_count",
                1,
                MAX_PLAYERS as i64,
                player_count as i64,
            )
            .into());
        }
        if total_packs == Some(0) {
            return Err(DraftError::validation(
                "total_packs",
                "A draft needs at least one pick",
            ));
        }

        let num_packs =
            total_packs.unwrap_or_else(|| (player_count as u32).saturating_mul(packs_per_player));

        Ok(Self {
            id: DraftSessionId::new(),
            owner_id,
            status: DraftStatus::Uninitialized.transition_to(DraftStatus::Active)?,
            players: build_roster(player_count, player_names),
            num_packs,
            packs_selected_order: Vec::new(),
            temp_inventory: seed_pool(inventory),
            started_at: Timestamp::now(),
        })
    }

    /// Returns a fresh active session with the same roster and target.
    ///
    /// Picks are cleared, the working pool is reseeded from `inventory`, and a
    /// new session id is issued. Valid from `Active` and `Confirmed`.
    pub fn restarted(&self, inventory: Vec<Pack>) -> Result<Self, DraftError> {
        let status = self.status.transition_to(DraftStatus::Active)?;
        let players = self
            .players
            .iter()
            .map(|player| Player {
                id: player.id,
                name: player.name.clone(),
                selected_packs: Vec::new(),
            })
            .collect();

        Ok(Self {
            id: DraftSessionId::new(),
            owner_id: self.owner_id.clone(),
            status,
            players,
            num_packs: self.num_packs,
            packs_selected_order: Vec::new(),
            temp_inventory: seed_pool(inventory),
            started_at: Timestamp::now(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &DraftSessionId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == DraftStatus::Confirmed
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Target total number of picks.
    pub fn num_packs(&self) -> u32 {
        self.num_packs
    }

    /// Every pick so far, in chronological order.
    pub fn packs_selected_order(&self) -> &[Pack] {
        &self.packs_selected_order
    }

    /// The working pool, ordered by pack id.
    pub fn temp_inventory(&self) -> impl Iterator<Item = &Pack> + Clone {
        self.temp_inventory.values()
    }

    /// Looks up one entry of the working pool.
    pub fn pool_entry(&self, id: &PackId) -> Option<&Pack> {
        self.temp_inventory.get(id)
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn picks_made(&self) -> usize {
        self.packs_selected_order.len()
    }

    pub fn picks_remaining(&self) -> u32 {
        let made = u32::try_from(self.picks_made()).unwrap_or(u32::MAX);
        self.num_packs.saturating_sub(made)
    }

    /// Total units left to draw from.
    pub fn remaining_weight(&self) -> u64 {
        total_weight(self.temp_inventory.values())
    }

    /// Seat that receives the next pick.
    pub fn next_player_index(&self) -> usize {
        self.player_index_for_pick(self.packs_selected_order.len())
    }

    /// Seat that receives (or received) the pick at zero-based `position`.
    pub fn player_index_for_pick(&self, position: usize) -> usize {
        position % self.players.len()
    }

    pub fn summary(&self) -> DraftSummary {
        let next = self.next_player_index();
        DraftSummary {
            picks_made: self.picks_made(),
            picks_remaining: self.picks_remaining(),
            next_player_index: next,
            next_player_name: self.players[next].name.clone(),
            remaining_weight: self.remaining_weight(),
            status: self.status,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preconditions
    // ─────────────────────────────────────────────────────────────────────────

    /// True when another spin is allowed and can produce a pack.
    pub fn can_spin(&self) -> bool {
        self.status.accepts_picks() && self.picks_remaining() > 0 && self.remaining_weight() > 0
    }

    pub fn can_undo(&self) -> bool {
        self.status.accepts_picks() && !self.packs_selected_order.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Draws a pack from the working pool, weighted by remaining units.
    ///
    /// Returns `None` once confirmed or when no units remain. Does not modify
    /// the session; pass the result to [`select_pack_for_next_player`].
    ///
    /// [`select_pack_for_next_player`]: Self::select_pack_for_next_player
    pub fn pick_weighted_random<R>(&self, rng: &mut R) -> Option<Pack>
    where
        R: Rng + ?Sized,
    {
        if !self.status.accepts_picks() {
            return None;
        }
        pick_weighted(self.temp_inventory.values(), rng).cloned()
    }

    /// Assigns one unit of `pack` to the player whose turn it is.
    ///
    /// Returns the index of the receiving player.
    ///
    /// # Errors
    ///
    /// - `AlreadyConfirmed` if the session is frozen
    /// - `PackUnavailable` if the pack has no units left in the working pool
    pub fn select_pack_for_next_player(&mut self, pack: &Pack) -> Result<usize, DraftError> {
        self.ensure_accepts_picks()?;

        let entry = self
            .temp_inventory
            .get_mut(&pack.id)
            .filter(|entry| entry.in_person > 0)
            .ok_or(DraftError::PackUnavailable(pack.id))?;

        let picked = entry.clone();
        entry.in_person -= 1;
        if entry.is_depleted() {
            self.temp_inventory.remove(&pack.id);
        }

        let player_index = self.next_player_index();
        self.packs_selected_order.push(picked.clone());
        self.players[player_index].selected_packs.push(picked);
        Ok(player_index)
    }

    /// Takes back the most recent pick and returns it.
    ///
    /// No-op returning `None` when nothing was picked or the session is
    /// confirmed.
    pub fn undo_last_pick(&mut self) -> Option<Pack> {
        if !self.status.accepts_picks() {
            return None;
        }
        let pack = self.packs_selected_order.pop()?;

        let player_index = self.player_index_for_pick(self.packs_selected_order.len());
        let returned = self.players[player_index].selected_packs.pop();
        debug_assert_eq!(returned.map(|p| p.id), Some(pack.id));

        match self.temp_inventory.get_mut(&pack.id) {
            Some(entry) => entry.in_person += 1,
            None => {
                let mut restored = pack.clone();
                restored.in_person = 1;
                restored.in_transit = 0;
                self.temp_inventory.insert(restored.id, restored);
            }
        }
        Some(pack)
    }

    /// Aggregates every pick into per-pack counts.
    pub fn pick_counts(&self) -> PickCounts {
        PickCounts::from_picks(&self.packs_selected_order)
    }

    /// Freezes the session after a successful commit.
    ///
    /// # Errors
    ///
    /// - `AlreadyConfirmed` if the session is already frozen
    pub fn mark_confirmed(&mut self) -> Result<(), DraftError> {
        if self.is_confirmed() {
            return Err(DraftError::AlreadyConfirmed);
        }
        self.status = self.status.transition_to(DraftStatus::Confirmed)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_accepts_picks(&self) -> Result<(), DraftError> {
        if self.status.accepts_picks() {
            Ok(())
        } else {
            Err(DraftError::AlreadyConfirmed)
        }
    }
}

fn seed_pool(inventory: Vec<Pack>) -> BTreeMap<PackId, Pack> {
    inventory
        .into_iter()
        .filter(|pack| !pack.is_depleted())
        .map(|pack| (pack.id, pack))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::NewPack;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owner() -> UserId {
        UserId::new("owner-1").unwrap()
    }

    fn pack(name: &str, in_person: u32, in_transit: u32) -> Pack {
        Pack::from_new(PackId::new(), owner(), NewPack::new(name, "", in_person, in_transit))
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn session_with(players: usize, inventory: Vec<Pack>) -> DraftSession {
        DraftSession::start(owner(), players, &[], None, 3, inventory).unwrap()
    }

    // Construction tests

    #[test]
    fn start_rejects_zero_players() {
        let result = DraftSession::start(owner(), 0, &[], None, 3, vec![]);
        assert!(matches!(result, Err(DraftError::ValidationFailed { .. })));
    }

    #[test]
    fn start_rejects_zero_total_packs() {
        let result = DraftSession::start(owner(), 2, &[], Some(0), 3, vec![]);
        assert!(matches!(result, Err(DraftError::ValidationFailed { .. })));
    }

    #[test]
    fn start_defaults_target_to_three_per_player() {
        let session = session_with(4, vec![]);
        assert_eq!(session.num_packs(), 12);
        assert_eq!(session.status(), DraftStatus::Active);
    }

    #[test]
    fn start_uses_explicit_total() {
        let session = DraftSession::start(owner(), 2, &[], Some(5), 3, vec![]).unwrap();
        assert_eq!(session.num_packs(), 5);
    }

    #[test]
    fn start_skips_depleted_packs() {
        let live = pack("Live", 0, 2);
        let session = session_with(1, vec![pack("Gone", 0, 0), live.clone()]);
        let ids: Vec<PackId> = session.temp_inventory().map(|p| p.id).collect();
        assert_eq!(ids, vec![live.id]);
    }

    #[test]
    fn start_pads_player_names() {
        let session = DraftSession::start(owner(), 2, &names(&["Ann"]), None, 3, vec![]).unwrap();
        assert_eq!(session.players()[0].name, "Ann");
        assert_eq!(session.players()[1].name, "Player 2");
    }

    // Selection tests

    #[test]
    fn single_unit_is_depleted_after_selection() {
        let a = pack("A", 1, 0);
        let mut session = session_with(1, vec![a.clone()]);
        let mut rng = StdRng::seed_from_u64(3);

        let drawn = session.pick_weighted_random(&mut rng).unwrap();
        assert_eq!(drawn.id, a.id);
        session.select_pack_for_next_player(&drawn).unwrap();

        assert!(session.pick_weighted_random(&mut rng).is_none());
        assert!(session.pool_entry(&a.id).is_none());
        assert!(!session.can_spin());
    }

    #[test]
    fn in_transit_keeps_entry_but_not_weight() {
        let a = pack("A", 1, 2);
        let mut session = session_with(1, vec![a.clone()]);

        session.select_pack_for_next_player(&a).unwrap();

        let entry = session.pool_entry(&a.id).unwrap();
        assert_eq!(entry.in_person, 0);
        assert_eq!(entry.in_transit, 2);
        assert_eq!(session.remaining_weight(), 0);
        assert!(session.pick_weighted_random(&mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn selecting_exhausted_pack_fails_without_change() {
        let a = pack("A", 0, 1);
        let mut session = session_with(2, vec![a.clone()]);
        let before = session.clone();

        let result = session.select_pack_for_next_player(&a);

        assert_eq!(result, Err(DraftError::PackUnavailable(a.id)));
        assert_eq!(session, before);
    }

    #[test]
    fn picks_rotate_round_robin() {
        let a = pack("A", 10, 0);
        let mut session = session_with(3, vec![a.clone()]);

        let seats: Vec<usize> = (0..7)
            .map(|_| session.select_pack_for_next_player(&a).unwrap())
            .collect();

        assert_eq!(seats, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(session.players()[0].selected_packs.len(), 3);
        assert_eq!(session.players()[1].selected_packs.len(), 2);
        assert_eq!(session.pool_entry(&a.id).unwrap().in_person, 3);
    }

    // Undo tests

    #[test]
    fn undo_on_empty_session_is_noop() {
        let mut session = session_with(2, vec![pack("A", 1, 0)]);
        let before = session.clone();
        assert!(session.undo_last_pick().is_none());
        assert_eq!(session, before);
        assert!(!session.can_undo());
    }

    #[test]
    fn undo_restores_removed_entry_exactly() {
        let a = pack("A", 1, 0);
        let b = pack("B", 2, 0);
        let mut session = session_with(2, vec![a.clone(), b.clone()]);
        session.select_pack_for_next_player(&b).unwrap();
        let before = session.clone();

        session.select_pack_for_next_player(&a).unwrap();
        assert!(session.pool_entry(&a.id).is_none());
        let undone = session.undo_last_pick().unwrap();

        assert_eq!(undone.id, a.id);
        assert_eq!(session, before);
    }

    #[test]
    fn undo_increments_remaining_entry() {
        let a = pack("A", 3, 0);
        let mut session = session_with(2, vec![a.clone()]);
        let before = session.clone();

        session.select_pack_for_next_player(&a).unwrap();
        session.undo_last_pick();

        assert_eq!(session, before);
        assert_eq!(session.pool_entry(&a.id).unwrap().in_person, 3);
    }

    #[test]
    fn undo_takes_pack_from_the_player_who_received_it() {
        let a = pack("A", 5, 0);
        let mut session = session_with(2, vec![a.clone()]);
        for _ in 0..3 {
            session.select_pack_for_next_player(&a).unwrap();
        }

        session.undo_last_pick();

        assert_eq!(session.players()[0].selected_packs.len(), 1);
        assert_eq!(session.players()[1].selected_packs.len(), 1);
        assert_eq!(session.next_player_index(), 0);
    }

    // Confirm tests

    #[test]
    fn confirmed_session_rejects_picks_and_undo() {
        let a = pack("A", 5, 0);
        let mut session = session_with(1, vec![a.clone()]);
        session.select_pack_for_next_player(&a).unwrap();
        session.mark_confirmed().unwrap();

        assert!(session.is_confirmed());
        assert_eq!(
            session.select_pack_for_next_player(&a),
            Err(DraftError::AlreadyConfirmed)
        );
        assert!(session.undo_last_pick().is_none());
        assert!(session.pick_weighted_random(&mut StdRng::seed_from_u64(1)).is_none());
        assert_eq!(session.picks_made(), 1);
        assert!(!session.can_spin());
        assert!(!session.can_undo());
    }

    #[test]
    fn mark_confirmed_twice_fails() {
        let mut session = session_with(1, vec![]);
        session.mark_confirmed().unwrap();
        assert_eq!(session.mark_confirmed(), Err(DraftError::AlreadyConfirmed));
    }

    #[test]
    fn pick_counts_collapse_order() {
        let a = pack("A", 5, 0);
        let b = pack("B", 5, 0);
        let mut session = session_with(2, vec![a.clone(), b.clone()]);
        for p in [&a, &b, &a] {
            session.select_pack_for_next_player(p).unwrap();
        }

        let counts = session.pick_counts();
        assert_eq!(counts.get(&a.id), 2);
        assert_eq!(counts.get(&b.id), 1);
    }

    // Restart tests

    #[test]
    fn restarted_keeps_roster_and_clears_picks() {
        let a = pack("A", 5, 0);
        let mut session =
            DraftSession::start(owner(), 2, &names(&["Ann", "Bo"]), None, 3, vec![a.clone()]).unwrap();
        session.select_pack_for_next_player(&a).unwrap();
        session.select_pack_for_next_player(&a).unwrap();

        let fresh = session.restarted(vec![a.clone()]).unwrap();

        assert_ne!(fresh.id(), session.id());
        let roster: Vec<&str> = fresh.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(roster, vec!["Ann", "Bo"]);
        assert!(fresh.players().iter().all(|p| p.selected_packs.is_empty()));
        assert!(fresh.packs_selected_order().is_empty());
        assert_eq!(fresh.pool_entry(&a.id).unwrap().in_person, 5);
        assert_eq!(fresh.status(), DraftStatus::Active);
    }

    #[test]
    fn confirmed_session_restarts_as_active() {
        let a = pack("A", 5, 0);
        let mut session =
            DraftSession::start(owner(), 1, &names(&["Ann"]), Some(1), 3, vec![a.clone()]).unwrap();
        session.select_pack_for_next_player(&a).unwrap();
        session.mark_confirmed().unwrap();

        let fresh = session.restarted(vec![a.clone()]).unwrap();

        assert_eq!(session.status(), DraftStatus::Confirmed);
        assert_eq!(fresh.status(), DraftStatus::Active);
        assert!(fresh.packs_selected_order().is_empty());
    }

    #[test]
    fn summary_reports_progress() {
        let a = pack("A", 4, 0);
        let mut session =
            DraftSession::start(owner(), 2, &names(&["Ann", "Bo"]), Some(3), 3, vec![a.clone()]).unwrap();
        session.select_pack_for_next_player(&a).unwrap();

        let summary = session.summary();
        assert_eq!(summary.picks_made, 1);
        assert_eq!(summary.picks_remaining, 2);
        assert_eq!(summary.next_player_name, "Bo");
        assert_eq!(summary.remaining_weight, 3);
    }

    #[test]
    fn can_spin_stops_at_target() {
        let a = pack("A", 10, 0);
        let mut session = DraftSession::start(owner(), 1, &[], Some(2), 3, vec![a.clone()]).unwrap();
        session.select_pack_for_next_player(&a).unwrap();
        assert!(session.can_spin());
        session.select_pack_for_next_player(&a).unwrap();
        assert!(!session.can_spin());
    }
}

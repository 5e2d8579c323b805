//! DraftEngine - Application service driving one user's draft session.
//!
//! Holds at most one [`DraftSession`] at a time. Picks and undo are local;
//! initialize, reset and confirm cross the storage boundary.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::DraftConfig;
use crate::domain::draft::{DraftError, DraftSession, DraftSummary};
use crate::domain::foundation::{DraftHistoryId, DraftSessionId, UserId};
use crate::domain::history::{DraftedPlayer, NewDraftRecord};
use crate::domain::inventory::{Pack, PickCounts};
use crate::ports::{DraftHistoryRepository, InventoryRepository};

/// Outcome of a successful confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmReceipt {
    pub session_id: DraftSessionId,
    /// Units taken from each pack.
    pub picks: PickCounts,
    /// `None` when the inventory was committed but the history write failed.
    pub history_id: Option<DraftHistoryId>,
}

/// Drives a draft session for one owner.
pub struct DraftEngine {
    inventory: Arc<dyn InventoryRepository>,
    history: Arc<dyn DraftHistoryRepository>,
    owner: UserId,
    config: DraftConfig,
    rng: StdRng,
    session: Option<DraftSession>,
}

impl DraftEngine {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        history: Arc<dyn DraftHistoryRepository>,
        owner: UserId,
        config: DraftConfig,
    ) -> Self {
        Self::with_rng(inventory, history, owner, config, StdRng::from_entropy())
    }

    /// Engine with a deterministic random source.
    pub fn seeded(
        inventory: Arc<dyn InventoryRepository>,
        history: Arc<dyn DraftHistoryRepository>,
        owner: UserId,
        config: DraftConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(inventory, history, owner, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        inventory: Arc<dyn InventoryRepository>,
        history: Arc<dyn DraftHistoryRepository>,
        owner: UserId,
        config: DraftConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            inventory,
            history,
            owner,
            config,
            rng,
            session: None,
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// The current session, if one was initialized.
    pub fn session(&self) -> Option<&DraftSession> {
        self.session.as_ref()
    }

    pub fn summary(&self) -> Option<DraftSummary> {
        self.session.as_ref().map(DraftSession::summary)
    }

    /// Starts a new session over a fresh inventory snapshot.
    ///
    /// Replaces any existing session, confirmed or not. On error the engine
    /// keeps its previous state.
    #[tracing::instrument(skip(self, player_names), fields(owner = %self.owner))]
    pub async fn initialize_session(
        &mut self,
        player_count: usize,
        player_names: &[String],
        total_packs: Option<u32>,
    ) -> Result<&DraftSession, DraftError> {
        let snapshot = self.inventory.load(&self.owner).await?;

        let session = DraftSession::start(
            self.owner.clone(),
            player_count,
            player_names,
            total_packs,
            self.config.packs_per_player,
            snapshot,
        )?;

        tracing::info!(
            session_id = %session.id(),
            players = session.players().len(),
            num_packs = session.num_packs(),
            pool_weight = session.remaining_weight(),
            "Draft session initialized"
        );

        Ok(self.session.insert(session))
    }

    /// Draws a pack from the working pool without assigning it.
    pub fn pick_weighted_random(&mut self) -> Option<Pack> {
        let session = self.session.as_ref()?;
        session.pick_weighted_random(&mut self.rng)
    }

    /// Gives one unit of `pack` to the player whose turn it is.
    pub fn select_pack_for_next_player(&mut self, pack: &Pack) -> Result<usize, DraftError> {
        let session = self.session.as_mut().ok_or(DraftError::NotStarted)?;
        let player_index = session.select_pack_for_next_player(pack).map_err(|err| {
            tracing::warn!(pack_id = %pack.id, error = %err, "Pick rejected");
            err
        })?;

        tracing::debug!(
            pack_id = %pack.id,
            player_index,
            picks_made = session.picks_made(),
            "Pack assigned"
        );
        Ok(player_index)
    }

    /// Draws and assigns in one step.
    ///
    /// Returns `None` when [`can_spin`](Self::can_spin) is false.
    pub fn spin(&mut self) -> Result<Option<(usize, Pack)>, DraftError> {
        if self.session.is_none() {
            return Err(DraftError::NotStarted);
        }
        if !self.can_spin() {
            return Ok(None);
        }
        let Some(pack) = self.pick_weighted_random() else {
            return Ok(None);
        };
        let player_index = self.select_pack_for_next_player(&pack)?;
        Ok(Some((player_index, pack)))
    }

    /// Takes back the last pick. No-op when nothing can be undone.
    pub fn undo_last_pick(&mut self) -> Option<Pack> {
        let session = self.session.as_mut()?;
        let pack = session.undo_last_pick()?;
        tracing::debug!(
            pack_id = %pack.id,
            picks_made = session.picks_made(),
            "Pick undone"
        );
        Some(pack)
    }

    /// Restarts the draft with the same roster over a fresh snapshot.
    ///
    /// # Errors
    ///
    /// - `NotStarted` if no session exists
    /// - storage errors from the snapshot, with the session left as it was
    #[tracing::instrument(skip(self), fields(owner = %self.owner))]
    pub async fn reset_session(&mut self) -> Result<&DraftSession, DraftError> {
        let current = self.session.as_ref().ok_or(DraftError::NotStarted)?;
        let snapshot = self.inventory.load(&self.owner).await?;

        let restarted = current.restarted(snapshot)?;
        tracing::info!(
            previous_session = %current.id(),
            session_id = %restarted.id(),
            "Draft session reset"
        );
        Ok(self.session.insert(restarted))
    }

    /// Commits the picks to the inventory and records the draft.
    ///
    /// Returns `Ok(None)` when there is nothing to commit. A failed history
    /// write after a committed decrement is logged and reported through
    /// [`ConfirmReceipt::history_id`]; the session stays confirmed.
    ///
    /// # Errors
    ///
    /// - `NotStarted` if no session exists
    /// - `AlreadyConfirmed` if the session was already committed
    /// - `NotFound`, `Forbidden`, `Conflict` or `Connectivity` from the
    ///   inventory commit, with the session left unconfirmed
    #[tracing::instrument(skip(self), fields(owner = %self.owner))]
    pub async fn confirm_session(&mut self) -> Result<Option<ConfirmReceipt>, DraftError> {
        let session = self.session.as_mut().ok_or(DraftError::NotStarted)?;
        if session.is_confirmed() {
            return Err(DraftError::AlreadyConfirmed);
        }
        if session.picks_made() == 0 {
            tracing::debug!(session_id = %session.id(), "Nothing to confirm");
            return Ok(None);
        }

        let picks = session.pick_counts();
        if let Err(err) = self.inventory.confirm_picks(&self.owner, &picks).await {
            tracing::warn!(
                session_id = %session.id(),
                error = %err,
                "Confirm failed, session left open"
            );
            return Err(err.into());
        }
        session.mark_confirmed()?;

        let record = NewDraftRecord {
            session_id: *session.id(),
            user_id: self.owner.clone(),
            players: session.players().iter().map(DraftedPlayer::from).collect(),
        };
        let history_id = match self.history.record(record).await {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::error!(
                    session_id = %session.id(),
                    error = %err,
                    "Inventory committed but draft history was not recorded"
                );
                None
            }
        };

        tracing::info!(
            session_id = %session.id(),
            packs = picks.total(),
            history_recorded = history_id.is_some(),
            "Draft confirmed"
        );

        Ok(Some(ConfirmReceipt {
            session_id: *session.id(),
            picks,
            history_id,
        }))
    }

    /// True when another pick may be drawn.
    pub fn can_spin(&self) -> bool {
        self.session.as_ref().is_some_and(DraftSession::can_spin)
    }

    /// True when the last pick may be taken back.
    pub fn can_undo(&self) -> bool {
        self.session.as_ref().is_some_and(DraftSession::can_undo)
    }
}

//! Inventory repository port.
//!
//! Defines the contract for durable, owner-scoped pack storage.
//!
//! # Design
//!
//! - **Owner-scoped**: every method takes the caller's `UserId`; records
//!   owned by someone else are never read or written on their behalf
//! - **Transactional batches**: `confirm_picks`, `revert_picks` and
//!   `increment_counts` read every
//!   referenced pack before writing any of them and apply all-or-nothing
//! - **Retry inside**: implementations retry a conflicted batch against fresh
//!   reads up to their configured attempt budget before reporting `Conflict`

use crate::domain::foundation::{DomainError, PackId, UserId};
use crate::domain::inventory::{CountDelta, NewPack, Pack, PickCounts};
use async_trait::async_trait;

/// Repository port for a user's pack inventory.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Load every pack owned by `owner`, ordered by name.
    ///
    /// # Errors
    ///
    /// - `Connectivity` if the backend is unreachable
    /// - `DatabaseError` on any other storage failure
    async fn load(&self, owner: &UserId) -> Result<Vec<Pack>, DomainError>;

    /// Find a single owned pack.
    ///
    /// Returns `None` if the pack does not exist.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the pack belongs to another user
    async fn find_by_id(&self, owner: &UserId, id: &PackId) -> Result<Option<Pack>, DomainError>;

    /// Create a pack. No implicit merge by name.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a blank or overlong name
    async fn add(&self, owner: &UserId, pack: NewPack) -> Result<Pack, DomainError>;

    /// Replace the mutable fields of an existing pack.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `pack.owner_id` or the stored owner differs from `owner`
    /// - `PackNotFound` if the pack does not exist
    /// - `ValidationFailed` for a blank or overlong name
    async fn update(&self, owner: &UserId, pack: &Pack) -> Result<(), DomainError>;

    /// Delete an owned pack.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the pack belongs to another user
    /// - `PackNotFound` if the pack does not exist
    async fn delete(&self, owner: &UserId, id: &PackId) -> Result<(), DomainError>;

    /// Delete every pack owned by `owner` atomically. Returns the number removed.
    async fn clear_all(&self, owner: &UserId) -> Result<usize, DomainError>;

    /// Decrement `in_person` by each count, clamping at zero.
    ///
    /// Nothing is written unless every referenced pack exists and is owned.
    ///
    /// # Errors
    ///
    /// - `PackNotFound` if any pack is missing
    /// - `Forbidden` if any pack belongs to another user
    /// - `Conflict` if concurrent writers exhausted the attempt budget
    async fn confirm_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError>;

    /// Increment `in_person` by each count.
    ///
    /// A pack deleted since the draft is recreated under the same id with
    /// `in_person = count` and `in_transit = 0`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if any pack belongs to another user
    /// - `Conflict` if concurrent writers exhausted the attempt budget
    async fn revert_picks(&self, owner: &UserId, picks: &PickCounts) -> Result<(), DomainError>;

    /// Add each delta to the stored counts of an existing pack.
    ///
    /// Increments apply to the values current at commit time. Nothing is
    /// written unless every referenced pack exists and is owned.
    ///
    /// # Errors
    ///
    /// - `PackNotFound` if any pack is missing
    /// - `Forbidden` if any pack belongs to another user
    /// - `Conflict` if concurrent writers exhausted the attempt budget
    async fn increment_counts(&self, owner: &UserId, deltas: &[CountDelta]) -> Result<(), DomainError>;
}

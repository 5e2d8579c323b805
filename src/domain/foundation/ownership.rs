//! Ownership trait for user-owned records.
//!
//! Every pack and every draft history entry belongs to exactly one account,
//! and every read or write is scoped to the calling user. Implementors get a
//! uniform `check_ownership()` that yields a `Forbidden` domain error.
//!
//! # Example
//!
//! ```ignore
//! let pack = repo.find_by_id(&owner, pack_id).await?
//!     .ok_or_else(|| DomainError::new(ErrorCode::PackNotFound, "Pack not found"))?;
//!
//! pack.check_ownership(&owner)?;  // Err(Forbidden) for someone else's pack
//! ```

use super::{DomainError, ErrorCode, UserId};

/// Trait for records that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this record.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Validates ownership, returning a `Forbidden` error if the user is not the owner.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", user_id.to_string()))
        }
    }
}

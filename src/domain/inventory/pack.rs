//! Pack record - one quantity-tracked inventory item.

use serde::{Deserialize, Serialize};

use super::PickLine;
use crate::domain::foundation::{OwnedByUser, PackId, UserId, ValidationError};

/// Maximum length for a pack name.
pub const MAX_NAME_LENGTH: usize = 200;

/// A unit of inventory owned by one account.
///
/// # Invariants
///
/// - `id` is assigned by the repository and never reassigned
/// - `in_person` is the draft weight; `in_transit` is carried for display only
/// - a pack with both counts at zero is depleted but stays in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub id: PackId,
    pub owner_id: UserId,
    pub name: String,
    pub image_url: String,
    pub in_person: u32,
    pub in_transit: u32,
}

impl Pack {
    /// Builds a pack record from validated input and a repository-assigned id.
    pub fn from_new(id: PackId, owner_id: UserId, new_pack: NewPack) -> Self {
        Self {
            id,
            owner_id,
            name: new_pack.name.trim().to_string(),
            image_url: new_pack.image_url,
            in_person: new_pack.in_person,
            in_transit: new_pack.in_transit,
        }
    }

    /// Recreates a pack that was deleted after it was drafted.
    ///
    /// Keeps the original id; the returned units are all in person.
    pub fn restored(id: PackId, owner_id: UserId, line: &PickLine) -> Self {
        let name = if line.name.trim().is_empty() {
            format!("Restored pack {}", id)
        } else {
            line.name.trim().to_string()
        };
        Self {
            id,
            owner_id,
            name,
            image_url: line.image_url.clone(),
            in_person: line.count,
            in_transit: 0,
        }
    }

    /// Weight of this pack in a weighted draw.
    pub fn weight(&self) -> u32 {
        self.in_person
    }

    /// True when no copies are available or on the way.
    pub fn is_depleted(&self) -> bool {
        self.in_person == 0 && self.in_transit == 0
    }

    /// Key used to merge packs by name: trimmed and case-insensitive.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    /// Validates the mutable fields before a full replace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

impl OwnedByUser for Pack {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

/// Input for creating a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPack {
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub in_person: u32,
    #[serde(default)]
    pub in_transit: u32,
}

impl NewPack {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>, in_person: u32, in_transit: u32) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            in_person,
            in_transit,
        }
    }

    /// Validates the input.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `InvalidFormat` if the name is too long
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

/// Normalizes a pack name for case-insensitive matching.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::invalid_format(
            "name",
            format!("must be {} characters or less", MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

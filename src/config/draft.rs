//! Draft engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::retry::RetryPolicy;

const MAX_PACKS_PER_PLAYER: u32 = 100;
const MAX_TRANSACTION_ATTEMPTS: u32 = 20;

/// Draft behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftConfig {
    /// Default picks per player when no total is given
    #[serde(default = "default_packs_per_player")]
    pub packs_per_player: u32,

    /// Attempts for a conflicted inventory transaction, first one included
    #[serde(default = "default_max_transaction_attempts")]
    pub max_transaction_attempts: u32,
}

impl DraftConfig {
    /// Retry policy for the storage adapters.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_transaction_attempts)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_PACKS_PER_PLAYER).contains(&self.packs_per_player) {
            return Err(ValidationError::InvalidPacksPerPlayer {
                max: MAX_PACKS_PER_PLAYER,
            });
        }
        if !(1..=MAX_TRANSACTION_ATTEMPTS).contains(&self.max_transaction_attempts) {
            return Err(ValidationError::InvalidTransactionAttempts {
                max: MAX_TRANSACTION_ATTEMPTS,
            });
        }
        Ok(())
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            packs_per_player: default_packs_per_player(),
            max_transaction_attempts: default_max_transaction_attempts(),
        }
    }
}

fn default_packs_per_player() -> u32 {
    3
}

fn default_max_transaction_attempts() -> u32 {
    5
}

//! DraftStatus enum for tracking the lifecycle of a draft session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a draft session.
///
/// `Uninitialized` is the state of an engine before its first
/// `initialize_session`. Reset moves `Active` or `Confirmed` back to `Active`
/// with the picks cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Uninitialized,
    Active,
    Confirmed,
}

impl DraftStatus {
    /// Returns true if picks and undo are allowed.
    pub fn accepts_picks(&self) -> bool {
        matches!(self, DraftStatus::Active)
    }
}

impl StateMachine for DraftStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DraftStatus::*;
        matches!(
            (self, target),
            (Uninitialized, Active)
                | (Active, Active)
                | (Active, Confirmed)
                | (Confirmed, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DraftStatus::*;
        match self {
            Uninitialized => vec![Active],
            Active => vec![Active, Confirmed],
            Confirmed => vec![Active],
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftStatus::Uninitialized => "Uninitialized",
            DraftStatus::Active => "Active",
            DraftStatus::Confirmed => "Confirmed",
        };
        write!(f, "{}", s)
    }
}

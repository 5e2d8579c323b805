//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the chaos draft domain.

mod draft_status;
mod errors;
mod ids;
mod ownership;
mod state_machine;
mod timestamp;

pub use draft_status::DraftStatus;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{DraftHistoryId, DraftSessionId, PackId, PlayerId, UserId};
pub use ownership::OwnedByUser;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

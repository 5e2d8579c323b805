//! Draft-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, PackId, ValidationError};

/// Errors returned by draft session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// No session has been initialized.
    NotStarted,
    /// The session was confirmed and is frozen.
    AlreadyConfirmed,
    /// The pack is not in the working pool or has no units left.
    PackUnavailable(PackId),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// A referenced pack no longer exists.
    NotFound(String),
    /// A referenced pack belongs to another user.
    Forbidden,
    /// The commit lost a race with another writer.
    Conflict(String),
    /// The backend could not be reached.
    Connectivity(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl DraftError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DraftError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DraftError::NotStarted => ErrorCode::SessionNotStarted,
            DraftError::AlreadyConfirmed => ErrorCode::SessionConfirmed,
            DraftError::PackUnavailable(_) => ErrorCode::PoolExhausted,
            DraftError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            DraftError::NotFound(_) => ErrorCode::PackNotFound,
            DraftError::Forbidden => ErrorCode::Forbidden,
            DraftError::Conflict(_) => ErrorCode::Conflict,
            DraftError::Connectivity(_) => ErrorCode::Connectivity,
            DraftError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True when the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    pub fn message(&self) -> String {
        match self {
            DraftError::NotStarted => "No draft session has been started".to_string(),
            DraftError::AlreadyConfirmed => "Draft session is already confirmed".to_string(),
            DraftError::PackUnavailable(id) => format!("Pack is not available in this draft: {}", id),
            DraftError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            DraftError::NotFound(msg) => format!("Not found: {}", msg),
            DraftError::Forbidden => "Permission denied".to_string(),
            DraftError::Conflict(msg) => format!("Inventory changed concurrently: {}", msg),
            DraftError::Connectivity(msg) => format!("Backend unreachable: {}", msg),
            DraftError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DraftError {}

impl From<DomainError> for DraftError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PackNotFound | ErrorCode::DraftNotFound => DraftError::NotFound(err.message),
            ErrorCode::Forbidden => DraftError::Forbidden,
            ErrorCode::Conflict => DraftError::Conflict(err.message),
            ErrorCode::Connectivity => DraftError::Connectivity(err.message),
            ErrorCode::SessionConfirmed => DraftError::AlreadyConfirmed,
            ErrorCode::SessionNotStarted => DraftError::NotStarted,
            ErrorCode::ValidationFailed => DraftError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => DraftError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for DraftError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}

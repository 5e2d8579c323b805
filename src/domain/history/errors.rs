//! History-specific error types.

use crate::domain::foundation::{DomainError, DraftHistoryId, ErrorCode};

/// Errors returned by draft history operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The history entry does not exist.
    NotFound(DraftHistoryId),
    /// The entry or a referenced pack belongs to another user.
    Forbidden,
    /// The transaction lost a race with another writer.
    Conflict(String),
    /// The backend could not be reached.
    Connectivity(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl HistoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HistoryError::NotFound(_) => ErrorCode::DraftNotFound,
            HistoryError::Forbidden => ErrorCode::Forbidden,
            HistoryError::Conflict(_) => ErrorCode::Conflict,
            HistoryError::Connectivity(_) => ErrorCode::Connectivity,
            HistoryError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            HistoryError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    pub fn message(&self) -> String {
        match self {
            HistoryError::NotFound(id) => format!("Draft not found: {}", id),
            HistoryError::Forbidden => "Permission denied".to_string(),
            HistoryError::Conflict(msg) => format!("Inventory changed concurrently: {}", msg),
            HistoryError::Connectivity(msg) => format!("Backend unreachable: {}", msg),
            HistoryError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            HistoryError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for HistoryError {}

impl From<DomainError> for HistoryError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DraftNotFound => err
                .details
                .get("draft_id")
                .and_then(|id| id.parse().ok())
                .map(HistoryError::NotFound)
                .unwrap_or_else(|| HistoryError::Infrastructure(err.to_string())),
            ErrorCode::Forbidden => HistoryError::Forbidden,
            ErrorCode::Conflict => HistoryError::Conflict(err.message),
            ErrorCode::Connectivity => HistoryError::Connectivity(err.message),
            ErrorCode::ValidationFailed => HistoryError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => HistoryError::Infrastructure(err.to_string()),
        }
    }
}

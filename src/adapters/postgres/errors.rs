//! Mapping from sqlx errors to domain errors.

use crate::domain::foundation::{DomainError, ErrorCode};

/// SQLSTATE for a serialization failure under SERIALIZABLE isolation.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock.
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error, prefixing the message with what was being done.
///
/// Serialization failures and deadlocks become `Conflict` so the retry
/// runner re-executes the transaction. Pool and socket failures become
/// `Connectivity`.
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    let code = match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => ErrorCode::Conflict,
            _ => ErrorCode::DatabaseError,
        },
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => ErrorCode::Connectivity,
        _ => ErrorCode::DatabaseError,
    };
    DomainError::new(code, format!("{}: {}", context, err))
}

/// Like [`map_sqlx_error`], but a unique violation is also a `Conflict`.
///
/// Used for inserts that race with a concurrent insert of the same key.
pub(crate) fn map_insert_race(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DomainError::conflict(format!("{}: {}", context, err));
        }
    }
    map_sqlx_error(context, err)
}

//! Mapping from database failures to [`StoreError`].

use domain::store::StoreError;
use thiserror::Error;

/// A stored value that does not decode into its domain type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid stored value: {0}")]
pub struct DecodeError(pub String);

impl From<String> for DecodeError {
    fn from(message: String) -> Self {
        DecodeError(message)
    }
}

/// Errors raised inside the PostgreSQL repositories.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Sqlx(e) => from_sqlx(e),
            PersistenceError::Decode(e) => StoreError::Database(e.to_string()),
            PersistenceError::Store(e) => e,
        }
    }
}

impl From<DecodeError> for StoreError {
    fn from(err: DecodeError) -> Self {
        StoreError::Database(err.to_string())
    }
}

fn from_sqlx(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("Resource not found".into()),
        sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
        sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
        sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict("Resource already exists".into()),
            Some("23503") => StoreError::NotFound("Referenced resource not found".into()),
            Some("23514") | Some("22P02") | Some("23502") => {
                StoreError::Invalid(format!("Invalid value: {}", db_err.message()))
            }
            code => {
                tracing::error!(code = ?code, error = %db_err, "Unmapped database error");
                StoreError::Database(format!("Database error: {}", db_err))
            }
        },
        other => {
            tracing::error!(error = %other, "Database failure");
            StoreError::Database(format!("Database error: {}", other))
        }
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = PersistenceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err, StoreError::NotFound("Resource not found".into()));
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err: StoreError = PersistenceError::from(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_decode_error_is_database() {
        let err: StoreError = PersistenceError::from(DecodeError("Unknown TicketStatus: x".into())).into();
        assert_eq!(
            err,
            StoreError::Database("Invalid stored value: Unknown TicketStatus: x".into())
        );
    }

    #[test]
    fn test_store_error_passes_through() {
        let err: StoreError =
            PersistenceError::from(StoreError::not_found("Integration")).into();
        assert_eq!(err, StoreError::not_found("Integration"));
    }
}

//! # Storage Error Types
//!
//! Error types for the local cache and the remote document store.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / MigrateError          reqwest::Error / HTTP status       │
//! │       │                                    │                            │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │  StoreError (this module) ← Adds context and categorization             │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  SyncError (pakwan-sync) ← remote failures become soft fallbacks        │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  ApiError (app) ← Serialized for the front end                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Local cache and remote store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The remote store could not be reached (DNS, refused, TLS, offline).
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote store took too long to answer.
    #[error("Remote store timed out")]
    RemoteTimeout,

    /// The remote store answered with a non-success status.
    #[error("Remote store returned HTTP {status} for {path}")]
    RemoteStatus { status: u16, path: String },

    /// The remote store URL could not be built.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// A document could not be encoded or decoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// True for every failure that came from the remote side.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StoreError::RemoteUnavailable(_)
                | StoreError::RemoteTimeout
                | StoreError::RemoteStatus { .. }
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::RemoteTimeout
        } else if err.is_decode() {
            StoreError::InvalidPayload(err.to_string())
        } else {
            StoreError::RemoteUnavailable(err.to_string())
        }
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidPayload(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(StoreError::RemoteTimeout.is_remote());
        assert!(StoreError::RemoteStatus {
            status: 503,
            path: "posData".to_string()
        }
        .is_remote());
        assert!(!StoreError::PoolExhausted.is_remote());
        assert!(!StoreError::InvalidPayload("x".to_string()).is_remote());
    }

    #[test]
    fn test_json_error_becomes_invalid_payload() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::InvalidPayload(_)));
    }
}

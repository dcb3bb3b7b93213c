//! # Sync Error Types
//!
//! Error types for reconciliation, persistence and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │       Payload           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Timeout        │  │  InvalidPayload         │ │
//! │  │  InvalidUrl     │  │  Unavailable    │  │  SerializationFailed    │ │
//! │  │  ConfigLoad/Save│  │  Rejected       │  │  ImportRejected         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Remote and payload errors never leave the Reconciler: they select the │
//! │  next data source. Only cache and config errors reach the caller.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use pakwan_core::ValidationError;
use pakwan_store::StoreError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid remote URL.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The remote store did not answer within the configured bound.
    #[error("Remote store timeout after {0:?}")]
    Timeout(Duration),

    /// The remote store could not be reached.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote store answered with an error status.
    #[error("Remote store rejected {path} with HTTP {status}")]
    RemoteRejected { status: u16, path: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// A dataset document is structurally unusable.
    #[error("Invalid dataset payload: {0}")]
    InvalidPayload(String),

    /// Failed to encode a dataset document.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// An imported document failed structural validation.
    #[error("Import rejected: {0}")]
    ImportRejected(#[from] ValidationError),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// The local cache could not be read or written.
    #[error("Local cache error: {0}")]
    CacheFailed(String),

    /// Internal sync error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RemoteTimeout => SyncError::RemoteUnavailable("request timed out".into()),
            StoreError::RemoteUnavailable(msg) => SyncError::RemoteUnavailable(msg),
            StoreError::RemoteStatus { status, path } => SyncError::RemoteRejected { status, path },
            StoreError::InvalidUrl(msg) => SyncError::InvalidUrl(msg),
            StoreError::InvalidPayload(msg) => SyncError::InvalidPayload(msg),
            other => SyncError::CacheFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if a later attempt may succeed.
    ///
    /// ## Retryable Errors
    /// - Timeouts and unreachable remote
    /// - 5xx answers from the remote
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Malformed payloads and rejected imports
    /// - 4xx answers (auth, bad path)
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Timeout(_) | SyncError::RemoteUnavailable(_) => true,
            SyncError::RemoteRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the failure happened on the remote side. These are
    /// the soft failures that select the next data source.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Timeout(_)
                | SyncError::RemoteUnavailable(_)
                | SyncError::RemoteRejected { .. }
        )
    }
}

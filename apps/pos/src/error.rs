//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Pakwan POS                             │
//! │                                                                         │
//! │  Command Function  ── Result<T, ApiError> ──────────────────────────┐  │
//! │         │                                                           │  │
//! │         ▼                                                           │  │
//! │  ValidationError ─────────────────────────────► VALIDATION_ERROR ──►│  │
//! │  CoreError (not found) ───────────────────────► NOT_FOUND ─────────►│  │
//! │  CoreError (in use, bad transition) ──────────► BUSINESS_LOGIC ────►│  │
//! │  CoreError (empty cart, bad line) ────────────► CART_ERROR ────────►│  │
//! │  StoreError / cache failure ──────────────────► STORAGE_ERROR ─────►│  │
//! │  SyncError (config, remote) ──────────────────► SYNC_ERROR ────────►│  │
//! │                                                                     ▼  │
//! │                       { "code": "NOT_FOUND", "message": "..." }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote failures during load and persist never get here: the sync layer
//! absorbs them. What reaches the caller is user error or a broken local
//! cache.

use serde::Serialize;

use pakwan_core::{CoreError, ValidationError};
use pakwan_store::StoreError;
use pakwan_sync::SyncError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "BUSINESS_LOGIC",
///   "message": "Category karahi is used by 3 product(s)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Business rule rejected the operation
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// Local cache could not be read or written
    StorageError,

    /// Sync configuration or remote store problem
    SyncError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a business logic error.
    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            e @ (CoreError::CategoryInUse { .. }
            | CoreError::InvalidStatusTransition { .. }
            | CoreError::SequenceExhausted(_)) => ApiError::business(e.to_string()),
            e @ (CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::CartLineNotFound { .. }) => ApiError::new(ErrorCode::CartError, e.to_string()),
            e @ (CoreError::UnknownPaymentMethod(_) | CoreError::UnknownOrderType(_)) => {
                ApiError::validation(e.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts sync errors to API errors.
impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::ImportRejected(e) => e.into(),
            SyncError::InvalidPayload(msg) => ApiError::validation(msg),
            SyncError::CacheFailed(msg) => {
                tracing::error!("Local cache failure: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Local cache operation failed")
            }
            SyncError::Internal(msg) => ApiError::internal(msg),
            other => ApiError::new(ErrorCode::SyncError, other.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_remote() {
            return ApiError::new(ErrorCode::SyncError, err.to_string());
        }
        tracing::error!("Local store failure: {}", err);
        ApiError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: ApiError = CoreError::CategoryInUse { id: "karahi".into(), count: 3 }.into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.contains("3 product"));

        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: ApiError = CoreError::OrderNotFound("ORD-404".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = CoreError::Validation(ValidationError::Required { field: "name".into() }).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_import_rejection_is_validation_error() {
        let err: ApiError = SyncError::ImportRejected(ValidationError::Required { field: "store".into() }).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "store is required");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::not_found("Order", "ORD-009")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: ORD-009");
    }
}

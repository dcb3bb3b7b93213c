//! # Error Types
//!
//! Domain-specific error types for pakwan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pakwan-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule / invariant violations             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pakwan-store errors  └── StoreError  - cache + remote I/O             │
//! │  pakwan-sync errors   └── SyncError   - reconcile / persist / config   │
//! │  app errors           └── ApiError    - what the front end sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `CoreError` never implies partial mutation: every operation that can
//! fail checks its preconditions before touching the dataset or cart.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the cart, catalog and ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category id is not in the catalog.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Order id is not in the ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// A category cannot be removed while products still reference it.
    ///
    /// ## User Workflow
    /// ```text
    /// Delete "Karahi" ──► 3 products use it ──► CategoryInUse { count: 3 }
    ///                                              │
    ///                                              ▼
    ///                   UI: "Move or delete the 3 products first"
    /// ```
    #[error("Category {id} is used by {count} product(s)")]
    CategoryInUse { id: String, count: usize },

    /// Status transitions are only allowed out of `completed`.
    #[error("Order {order_id} is {current}, cannot change status")]
    InvalidStatusTransition { order_id: String, current: String },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Cart line index does not exist.
    #[error("Cart line {index} does not exist")]
    CartLineNotFound { index: usize },

    /// The order counter cannot advance any further.
    #[error("Order number sequence exhausted at {0}")]
    SequenceExhausted(u64),

    /// Payment method id is not configured.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Order type id is not configured.
    #[error("Unknown order type: {0}")]
    UnknownOrderType(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is outside the accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format or shape (e.g. wrong JSON type in an import).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. duplicate category name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CategoryInUse {
            id: "karahi".to_string(),
            count: 3,
        };
        assert_eq!(err.to_string(), "Category karahi is used by 3 product(s)");

        let err = CoreError::InvalidStatusTransition {
            order_id: "ORD-004".to_string(),
            current: "returned".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order ORD-004 is returned, cannot change status"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "category".to_string(),
            value: "Karahi".to_string(),
        };
        assert_eq!(err.to_string(), "category 'Karahi' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

//! # Validation Module
//!
//! Input validation for catalog edits, checkout selections and imports.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Empty fields, number inputs                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service command (Rust)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Dataset invariants (ledger / catalog)                        │
//! │  └── Unique ids, category-in-use, status transitions                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pakwan_core::validation::{validate_name, validate_import};
//!
//! assert_eq!(validate_name("category", "  Karahi ").unwrap(), "Karahi");
//!
//! let import = serde_json::json!({"store": {}, "products": [], "orders": []});
//! assert!(validate_import(&import).is_ok());
//! ```

use serde_json::Value;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted category/product name.
pub const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Fails with `Required` when `value` is empty after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();
    validate_required(field, name)?;

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Prices must be strictly positive.
pub fn validate_positive_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive
/// - At most [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Measured quantities (kg, litres, ...) must be finite and > 0.
pub fn validate_measure_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Import Validation
// =============================================================================

/// Structural check applied to an imported dataset before it replaces the
/// in-memory one.
///
/// ## Rules
/// - Top level is a JSON object
/// - `products` and `orders` are arrays
/// - `store` is an object
///
/// Field-level decoding happens afterwards; this only rejects documents
/// that are not a dataset at all.
pub fn validate_import(value: &Value) -> ValidationResult<()> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "dataset".to_string(),
            reason: "must be a JSON object".to_string(),
        })?;

    for key in ["products", "orders"] {
        match object.get(key) {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ValidationError::InvalidFormat {
                    field: key.to_string(),
                    reason: "must be an array".to_string(),
                })
            }
            None => {
                return Err(ValidationError::Required {
                    field: key.to_string(),
                })
            }
        }
    }

    match object.get("store") {
        Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "store".to_string(),
            reason: "must be an object".to_string(),
        }),
        None => Err(ValidationError::Required {
            field: "store".to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

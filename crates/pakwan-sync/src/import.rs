//! # Dataset Import
//!
//! Parses an uploaded dataset document. The result replaces the in-memory
//! dataset wholesale, so nothing is merged here and the catalog is taken as
//! given.

use serde_json::Value;
use tracing::debug;

use pakwan_core::validation::validate_import;
use pakwan_core::Dataset;

use crate::error::{SyncError, SyncResult};
use crate::repair::{repair_document, CatalogPolicy, RepairSummary};

/// Parses, validates and repairs an import document.
///
/// ## Rules
/// - Text must be JSON (`InvalidPayload` otherwise)
/// - `products` and `orders` arrays plus a `store` object are required
///   (`ImportRejected`)
/// - Orders without a status become `completed`
pub fn parse_import(text: &str) -> SyncResult<(Dataset, RepairSummary)> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| SyncError::InvalidPayload(format!("import is not valid JSON: {e}")))?;
    validate_import(&doc)?;

    let (dataset, summary) = repair_document(doc, CatalogPolicy::Keep)?;
    debug!(
        orders = dataset.orders.len(),
        products = dataset.products.len(),
        repaired = summary.repaired_statuses,
        "Import document accepted"
    );
    Ok((dataset, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakwan_core::{OrderStatus, ValidationError};

    #[test]
    fn test_valid_import_is_repaired() {
        let text = r#"{
            "store": {"name": "Pakwan Gulberg"},
            "products": [],
            "orders": [{
                "id": "ORD-007",
                "timestamp": "2025-01-05T08:00:00Z",
                "items": [{"productId": "chai", "name": "Chai", "quantity": 2, "price": 60}],
                "subtotal": 120, "tax": 0, "total": 120,
                "paymentMethod": "cash", "orderType": "takeaway"
            }]
        }"#;
        let (dataset, summary) = parse_import(text).unwrap();

        assert_eq!(summary.repaired_statuses, 1);
        assert_eq!(dataset.orders.as_slice()[0].status, OrderStatus::Completed);
        assert_eq!(dataset.store.name, "Pakwan Gulberg");
        assert!(dataset.products.is_empty());
        assert_eq!(dataset.settings.next_order_number, 8);
    }

    #[test]
    fn test_structural_failures_are_rejected() {
        let err = parse_import(r#"{"products": [], "orders": {}, "store": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            SyncError::ImportRejected(ValidationError::InvalidFormat { ref field, .. }) if field == "orders"
        ));

        let err = parse_import(r#"{"products": [], "orders": []}"#).unwrap_err();
        assert!(matches!(err, SyncError::ImportRejected(ValidationError::Required { .. })));
    }

    #[test]
    fn test_malformed_json_is_invalid_payload() {
        assert!(matches!(parse_import("{not json"), Err(SyncError::InvalidPayload(_))));
    }
}

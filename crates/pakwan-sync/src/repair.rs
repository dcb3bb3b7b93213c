//! # Dataset Repair
//!
//! Turns a raw JSON document from any source into a usable [`Dataset`].
//!
//! ## Repair Pipeline
//! ```text
//! raw Value
//!    │  not an object / no `orders` collection ──► InvalidPayload
//!    ▼
//! normalize_collections     index-keyed maps → arrays
//!    │
//! repair_missing_status     orders without status → completed
//!    │
//! serde decode              Money rounding, defaults for absent fields
//!    │
//! fill gaps                 store, payment methods, order types,
//!    │                      catalog (remote only)
//!    ▼
//! raise_sequence_to_ledger  nextOrderNumber > every ORD-NNN
//! ```
//!
//! The orders collection is never substituted: an empty ledger stays empty.

use serde_json::Value;

use pakwan_core::defaults::{
    builtin_catalog, builtin_order_types, builtin_payment_methods, builtin_store,
};
use pakwan_core::payload::{has_orders_collection, normalize_collections, repair_missing_status};
use pakwan_core::Dataset;

use crate::error::{SyncError, SyncResult};

/// What the pipeline had to fix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Orders that had no status and were set to `completed`.
    pub repaired_statuses: usize,
    /// Categories/products were missing and the built-in menu was used.
    pub substituted_catalog: bool,
    /// Store info, payment methods or order types were filled in.
    pub filled_reference_data: bool,
    /// New `nextOrderNumber`, when it lagged behind the ledger.
    pub sequence_raised_to: Option<u64>,
}

impl RepairSummary {
    pub fn is_clean(&self) -> bool {
        *self == RepairSummary::default()
    }
}

/// Catalog policy for [`repair_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPolicy {
    /// Replace a missing or empty catalog with the built-in one.
    SubstituteEmpty,
    /// Keep whatever the document holds.
    Keep,
}

/// Validates, repairs and decodes a dataset document.
pub fn repair_document(
    mut doc: Value,
    catalog: CatalogPolicy,
) -> SyncResult<(Dataset, RepairSummary)> {
    if !doc.is_object() {
        return Err(SyncError::InvalidPayload("document is not a JSON object".into()));
    }
    if !has_orders_collection(&doc) {
        return Err(SyncError::InvalidPayload("document has no orders collection".into()));
    }

    normalize_collections(&mut doc);
    let mut summary = RepairSummary {
        repaired_statuses: repair_missing_status(&mut doc),
        ..RepairSummary::default()
    };
    let has_store = doc.get("store").is_some_and(Value::is_object);

    let mut dataset: Dataset = serde_json::from_value(doc)
        .map_err(|e| SyncError::InvalidPayload(format!("dataset does not decode: {e}")))?;

    if !has_store {
        dataset.store = builtin_store();
        summary.filled_reference_data = true;
    }
    if dataset.payment_methods.is_empty() {
        dataset.payment_methods = builtin_payment_methods();
        summary.filled_reference_data = true;
    }
    if dataset.order_types.is_empty() {
        dataset.order_types = builtin_order_types();
        summary.filled_reference_data = true;
    }
    if catalog == CatalogPolicy::SubstituteEmpty && dataset.catalog_is_empty() {
        let (categories, products) = builtin_catalog();
        dataset.categories = categories;
        dataset.products = products;
        summary.substituted_catalog = true;
    }

    summary.sequence_raised_to = dataset.raise_sequence_to_ledger();
    Ok((dataset, summary))
}

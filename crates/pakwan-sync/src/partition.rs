//! # Month Partitioning
//!
//! In partitioned mode the remote side holds one reference document and one
//! order list per calendar month:
//!
//! ```text
//! posData/reference      { store, categories, products, paymentMethods,
//!                          orderTypes, settings, months: ["2025-02", "2025-03"] }
//! posData/orders/2025-02 [ order, order, ... ]
//! posData/orders/2025-03 [ order, ... ]
//! ```
//!
//! `months` lists every partition written so far, so a full load knows
//! which order documents to fetch. The local cache always holds the whole,
//! unpartitioned dataset.

use std::collections::BTreeMap;

use serde_json::Value;

use pakwan_core::payload::map_to_array;
use pakwan_core::{Dataset, MonthKey, Order};

use crate::error::{SyncError, SyncResult};

/// Key of the partition index inside the reference document.
pub const MONTHS_KEY: &str = "months";

/// A dataset cut into its remote documents.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedDataset {
    pub reference: Value,
    pub months: BTreeMap<MonthKey, Vec<Order>>,
}

/// Groups the ledger by month and strips it from the reference document.
///
/// Every month the ledger touches gets its own slice, in ledger order.
pub fn split_by_month(dataset: &Dataset) -> SyncResult<PartitionedDataset> {
    let mut months: BTreeMap<MonthKey, Vec<Order>> = BTreeMap::new();
    for order in dataset.orders.iter() {
        months.entry(order.month()).or_default().push(order.clone());
    }

    let mut reference = serde_json::to_value(dataset)?;
    let object = reference
        .as_object_mut()
        .ok_or_else(|| SyncError::Internal("dataset did not serialize to an object".into()))?;
    object.remove("orders");
    object.insert(
        MONTHS_KEY.to_string(),
        Value::Array(months.keys().map(|m| Value::String(m.to_string())).collect()),
    );

    Ok(PartitionedDataset { reference, months })
}

/// Partition keys listed in a reference document.
///
/// A reference document without a `months` array is malformed; entries that
/// do not parse as `YYYY-MM` are skipped.
pub fn listed_months(reference: &Value) -> SyncResult<Vec<MonthKey>> {
    let Some(Value::Array(entries)) = reference.get(MONTHS_KEY) else {
        return Err(SyncError::InvalidPayload(
            "reference document has no months index".into(),
        ));
    };
    Ok(entries
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| s.parse().ok())
        .collect())
}

/// Rebuilds a single dataset document from the reference document and the
/// fetched month slices. Missing months (`None`) contribute no orders.
pub fn assemble(reference: Value, slices: Vec<Option<Value>>) -> SyncResult<Value> {
    let Value::Object(mut object) = reference else {
        return Err(SyncError::InvalidPayload("reference document is not an object".into()));
    };
    object.remove(MONTHS_KEY);

    let mut orders = Vec::new();
    for slice in slices.into_iter().flatten() {
        match slice {
            Value::Array(items) => orders.extend(items),
            Value::Object(map) => orders.extend(map_to_array(map)),
            other => {
                return Err(SyncError::InvalidPayload(format!(
                    "month partition is neither a list nor a map: {other}"
                )))
            }
        }
    }
    object.insert("orders".to_string(), Value::Array(orders));
    Ok(Value::Object(object))
}

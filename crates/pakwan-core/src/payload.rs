//! # Payload Repair
//!
//! Structural fixes applied to a raw dataset document before it is decoded.
//!
//! The remote document store drops empty arrays and may hand back sparse
//! arrays as index-keyed maps (`{"0": {...}, "2": {...}}`). Older terminals
//! wrote orders without a `status`. Both are repaired here on the raw
//! `serde_json::Value` so the typed decode never has to guess.

use serde_json::{Map, Value};

use crate::types::OrderStatus;

/// Top-level collections of a dataset document.
pub const COLLECTION_KEYS: [&str; 5] = [
    "categories",
    "products",
    "orders",
    "paymentMethods",
    "orderTypes",
];

/// True when the document is an object whose `orders` key holds an array
/// or an index-keyed map. This separates a real (possibly empty) ledger
/// from a missing or malformed document.
pub fn has_orders_collection(doc: &Value) -> bool {
    matches!(
        doc.get("orders"),
        Some(Value::Array(_)) | Some(Value::Object(_))
    )
}

/// Converts an index-keyed map into an array, ordered by numeric key
/// (non-numeric keys sort after, alphabetically). `null` entries are dropped.
pub fn map_to_array(map: Map<String, Value>) -> Vec<Value> {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    entries
        .into_iter()
        .map(|(_, v)| v)
        .filter(|v| !v.is_null())
        .collect()
}

fn normalize_array(slot: &mut Value) {
    match slot {
        Value::Object(map) => {
            let map = std::mem::take(map);
            *slot = Value::Array(map_to_array(map));
        }
        Value::Array(items) => items.retain(|v| !v.is_null()),
        _ => {}
    }
}

/// Turns map-shaped collections (and map-shaped order item lists) into
/// arrays. Non-object documents are left untouched.
pub fn normalize_collections(doc: &mut Value) {
    let Some(object) = doc.as_object_mut() else {
        return;
    };
    for key in COLLECTION_KEYS {
        if let Some(slot) = object.get_mut(key) {
            normalize_array(slot);
        }
    }
    if let Some(Value::Array(orders)) = object.get_mut("orders") {
        for order in orders.iter_mut() {
            if let Some(items) = order.get_mut("items") {
                normalize_array(items);
            }
        }
    }
}

/// Sets `status: "completed"` on every order that has none.
///
/// ## Returns
/// How many orders were repaired.
pub fn repair_missing_status(doc: &mut Value) -> usize {
    let Some(Value::Array(orders)) = doc.get_mut("orders") else {
        return 0;
    };
    let mut repaired = 0;
    for order in orders.iter_mut().filter_map(Value::as_object_mut) {
        let missing = matches!(order.get("status"), None | Some(Value::Null));
        if missing {
            order.insert(
                "status".to_string(),
                Value::String(OrderStatus::Completed.as_str().to_string()),
            );
            repaired += 1;
        }
    }
    repaired
}

//! # Order Commands
//!
//! Status changes and ledger maintenance. Orders are never removed by
//! these commands (except duplicate cleanup): return and delete only move
//! a `completed` order to a terminal status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use pakwan_core::report::sales_listing;
use pakwan_core::{Dataset, DuplicateReport, Order, OrderStatus, Period};

use crate::error::ApiError;
use crate::state::{ConfigState, DatasetState, SyncState};

/// Result of a status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub order_id: String,
    pub status: OrderStatus,
    /// Ledger records that carried this id (more than one only when the
    /// ledger holds duplicates).
    pub records: usize,
}

/// Marks a completed order as returned.
pub async fn return_order(
    dataset: &DatasetState,
    sync: &SyncState,
    order_id: &str,
    now: DateTime<Utc>,
) -> Result<StatusChangeResponse, ApiError> {
    debug!(order_id = %order_id, "return_order command");
    set_status(dataset, sync, order_id, OrderStatus::Returned, now).await
}

/// Marks a completed order as deleted. The record stays in the ledger.
pub async fn delete_order(
    dataset: &DatasetState,
    sync: &SyncState,
    order_id: &str,
    now: DateTime<Utc>,
) -> Result<StatusChangeResponse, ApiError> {
    debug!(order_id = %order_id, "delete_order command");
    set_status(dataset, sync, order_id, OrderStatus::Deleted, now).await
}

async fn set_status(
    dataset: &DatasetState,
    sync: &SyncState,
    order_id: &str,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<StatusChangeResponse, ApiError> {
    let records = dataset.with_dataset_mut(|d| d.set_order_status(order_id, status, now))?;

    if records > 1 {
        warn!(order_id = %order_id, records, "Status applied to duplicate order records");
    }
    info!(order_id = %order_id, status = %status, "Order status changed");
    sync.persist(dataset).await;

    Ok(StatusChangeResponse {
        order_id: order_id.to_string(),
        status,
        records,
    })
}

/// Removes repeated order ids, keeping the last record of each.
pub async fn cleanup_duplicates(
    dataset: &DatasetState,
    sync: &SyncState,
) -> DuplicateReport {
    debug!("cleanup_duplicates command");

    let report = dataset.with_dataset_mut(Dataset::cleanup_duplicates);

    match report.removed {
        0 => info!("No duplicate orders found"),
        _ => {
            info!(
                removed = report.removed,
                ids = ?report.duplicate_ids,
                "Duplicate orders removed"
            );
            sync.persist(dataset).await;
        }
    }
    report
}

/// Orders in `period`, newest first.
pub fn list_orders(
    dataset: &DatasetState,
    config: &ConfigState,
    period: Period,
    now: DateTime<Utc>,
) -> Vec<Order> {
    debug!(period = %period, "list_orders command");
    let now = config.local_time(now);
    dataset.with_dataset(|d| {
        sales_listing(d.orders.iter(), period, &now)
            .into_iter()
            .cloned()
            .collect()
    })
}

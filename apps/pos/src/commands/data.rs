//! # Data Commands
//!
//! Whole-dataset operations: reload, month views, settings refresh,
//! import, and re-persisting when the terminal comes back to the
//! foreground.

use serde::Serialize;
use tracing::{debug, info, warn};

use pakwan_core::{MonthKey, Order, SalesSummary};
use pakwan_sync::{parse_import, LoadReport};

use crate::error::ApiError;
use crate::state::{CheckoutState, DatasetState, SyncState};

/// One month of orders, loaded for a sales view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub month: MonthKey,
    pub report: LoadReport,
    pub summary: SalesSummary,
    pub orders: Vec<Order>,
}

/// Result of an import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub orders: usize,
    pub products: usize,
    pub categories: usize,
    pub repaired_statuses: usize,
    pub next_order_number: u64,
}

/// Re-runs reconciliation and replaces the in-memory dataset with the
/// winner. Never fails; the report says where the data came from.
///
/// A staged order belongs to the dataset it was numbered against, so it
/// is discarded along with that dataset.
pub async fn load(dataset: &DatasetState, pending_slot: &CheckoutState, sync: &SyncState) -> LoadReport {
    debug!("load command");
    let loaded = sync.reconciler().load_dataset().await;
    dataset.replace(loaded.dataset);
    discard_pending(pending_slot);
    // a command that persisted during the load wrote the old dataset
    sync.write_local(dataset).await;
    loaded.report
}

/// Loads a single month for a sales view. The terminal's own dataset is
/// left alone.
pub async fn load_month(sync: &SyncState, month: MonthKey) -> MonthView {
    debug!(month = %month, "load_month command");
    let loaded = sync.reconciler().load_month(month).await;
    let orders = loaded.dataset.orders.into_inner();
    MonthView {
        month,
        summary: SalesSummary::from_orders(&orders),
        report: loaded.report,
        orders,
    }
}

/// Pulls store info and settings from the remote store and merges them in.
///
/// ## Returns
/// Whether anything changed. Remote failures return `Ok(false)`.
pub async fn refresh_settings(dataset: &DatasetState, sync: &SyncState) -> Result<bool, ApiError> {
    debug!("refresh_settings command");

    let Some(patch) = sync.reconciler().fetch_settings_patch().await else {
        return Ok(false);
    };
    let changed = dataset.with_dataset_mut(|d| patch.apply_to(d))?;

    sync.write_local(dataset).await;
    info!(changed, "Store settings refreshed");
    Ok(changed)
}

/// Replaces the whole dataset with an uploaded document, then persists it.
///
/// ## Rules
/// - Invalid JSON, or missing `products`/`orders` arrays or `store` object:
///   rejected, current dataset untouched
/// - Orders without status become `completed`
/// - No merge with the current dataset
/// - A staged order is discarded; it was numbered against the old dataset
pub async fn import_dataset(
    dataset: &DatasetState,
    pending_slot: &CheckoutState,
    sync: &SyncState,
    text: &str,
) -> Result<ImportResponse, ApiError> {
    debug!(bytes = text.len(), "import_dataset command");

    let (imported, summary) = parse_import(text)?;
    let response = ImportResponse {
        orders: imported.orders.len(),
        products: imported.products.len(),
        categories: imported.categories.len(),
        repaired_statuses: summary.repaired_statuses,
        next_order_number: imported.settings.next_order_number,
    };

    dataset.replace(imported);
    discard_pending(pending_slot);
    info!(orders = response.orders, products = response.products, "Dataset imported");
    sync.persist(dataset).await;
    Ok(response)
}

/// Re-persists the current dataset (the terminal regained focus).
///
/// ## Returns
/// Whether the local copy was written.
pub async fn resume(dataset: &DatasetState, sync: &SyncState) -> bool {
    debug!("resume command");
    sync.persist(dataset).await
}

/// Empties the local cache slot. The in-memory dataset is kept and will be
/// written again by the next persist.
pub async fn clear_local_cache(sync: &SyncState) -> Result<bool, ApiError> {
    debug!("clear_local_cache command");
    Ok(sync.persister().clear_local().await?)
}

fn discard_pending(pending_slot: &CheckoutState) {
    if let Some(pending) = pending_slot.take() {
        warn!(order_id = %pending.cancel(), "Pending order discarded with the old dataset");
    }
}

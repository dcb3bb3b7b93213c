//! # Reconciliation Engine
//!
//! Picks the authoritative dataset at startup and on explicit refresh.
//!
//! ## Source Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        load_dataset()                                   │
//! │                                                                         │
//! │  1. Remote store (bounded by remote.timeout_secs)                      │
//! │     │  timeout / unreachable / HTTP error / invalid payload            │
//! │     ▼                                                                   │
//! │  2. Local cache slot                                                   │
//! │     │  empty / unparseable / no orders collection                      │
//! │     ▼                                                                   │
//! │  3. Bundled dataset document                                           │
//! │     │  does not decode                                                 │
//! │     ▼                                                                   │
//! │  4. Built-in dataset (always succeeds)                                 │
//! │                                                                         │
//! │  Whatever wins is repaired (repair.rs) and written back to the local   │
//! │  cache. Nothing here returns an error: every failure is a warning and  │
//! │  a step down the list.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use pakwan_core::defaults::{builtin_dataset, BUNDLED_DATASET_JSON};
use pakwan_core::{Dataset, MonthKey, Settings, StoreInfo};
use pakwan_store::{LocalCache, RemoteStore};

use crate::config::RemoteLayout;
use crate::error::{SyncError, SyncResult};
use crate::partition::{assemble, listed_months};
use crate::repair::{repair_document, CatalogPolicy, RepairSummary};

// =============================================================================
// Load Report
// =============================================================================

/// Where a loaded dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Remote,
    LocalCache,
    Bundled,
    BuiltIn,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSource::Remote => "remote",
            DataSource::LocalCache => "local_cache",
            DataSource::Bundled => "bundled",
            DataSource::BuiltIn => "built_in",
        })
    }
}

/// What happened during a load, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub source: DataSource,
    pub orders: usize,
    pub repaired_statuses: usize,
    pub substituted_catalog: bool,
    pub sequence_raised_to: Option<u64>,
    /// Why the remote store was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

/// A dataset plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub report: LoadReport,
}

impl Loaded {
    fn new(dataset: Dataset, summary: RepairSummary, source: DataSource, remote_error: Option<String>) -> Self {
        let report = LoadReport {
            source,
            orders: dataset.orders.len(),
            repaired_statuses: summary.repaired_statuses,
            substituted_catalog: summary.substituted_catalog,
            sequence_raised_to: summary.sequence_raised_to,
            remote_error,
        };
        Loaded { dataset, report }
    }
}

// =============================================================================
// Settings Patch
// =============================================================================

/// The `store` and `settings` blocks of a remote document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub store: Option<Map<String, Value>>,
    pub settings: Option<Map<String, Value>>,
}

impl SettingsPatch {
    /// Extracts the patch from a full dataset or reference document.
    pub fn from_document(doc: &Value) -> Self {
        SettingsPatch {
            store: doc.get("store").and_then(Value::as_object).cloned(),
            settings: doc.get("settings").and_then(Value::as_object).cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_none() && self.settings.is_none()
    }

    /// Merges the patch over the dataset, key by key.
    ///
    /// ## Rules
    /// - Keys absent from the patch keep their current value
    /// - `nextOrderNumber` is never lowered
    /// - If either block fails to decode, nothing is changed
    ///
    /// ## Returns
    /// Whether the dataset changed.
    pub fn apply_to(&self, dataset: &mut Dataset) -> SyncResult<bool> {
        let store: Option<StoreInfo> = self
            .store
            .as_ref()
            .map(|patch| merge_object(&dataset.store, patch))
            .transpose()?;
        let settings: Option<Settings> = self
            .settings
            .as_ref()
            .map(|patch| merge_object(&dataset.settings, patch))
            .transpose()?;

        let mut changed = false;
        if let Some(store) = store.filter(|s| *s != dataset.store) {
            dataset.store = store;
            changed = true;
        }
        if let Some(mut settings) = settings {
            settings.next_order_number = settings
                .next_order_number
                .max(dataset.settings.next_order_number);
            if settings != dataset.settings {
                dataset.settings = settings;
                changed = true;
            }
        }
        Ok(changed)
    }
}

fn merge_object<T: Serialize + DeserializeOwned>(current: &T, patch: &Map<String, Value>) -> SyncResult<T> {
    let mut value = serde_json::to_value(current)?;
    if let Value::Object(object) = &mut value {
        for (key, v) in patch {
            object.insert(key.clone(), v.clone());
        }
    }
    serde_json::from_value(value).map_err(|e| SyncError::InvalidPayload(e.to_string()))
}

// =============================================================================
// Reconciler
// =============================================================================

/// Loads datasets from the remote store, the local cache or the defaults.
#[derive(Clone)]
pub struct Reconciler {
    remote: Option<Arc<dyn RemoteStore>>,
    cache: LocalCache,
    layout: RemoteLayout,
    timeout: Duration,
}

impl Reconciler {
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        cache: LocalCache,
        layout: RemoteLayout,
        timeout: Duration,
    ) -> Self {
        Reconciler {
            remote,
            cache,
            layout,
            timeout,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Startup load. Always returns a usable dataset and writes it to the
    /// local cache, whichever source it came from.
    pub async fn load_dataset(&self) -> Loaded {
        let mut remote_error = None;

        if let Some(remote) = &self.remote {
            let attempt = self
                .bounded(self.fetch_full(remote.as_ref()))
                .await
                .and_then(|doc| repair_document(doc, CatalogPolicy::SubstituteEmpty));
            match attempt {
                Ok((dataset, summary)) => {
                    let loaded = Loaded::new(dataset, summary, DataSource::Remote, None);
                    return self.finish(loaded).await;
                }
                Err(e) => {
                    warn!(error = %e, "Could not load from remote store, trying local cache");
                    remote_error = Some(e.to_string());
                }
            }
        }

        let loaded = match self.load_local().await {
            Some((dataset, summary)) => {
                Loaded::new(dataset, summary, DataSource::LocalCache, remote_error)
            }
            None => {
                let (dataset, summary, source) = load_bundled();
                Loaded::new(dataset, summary, source, remote_error)
            }
        };
        self.finish(loaded).await
    }

    /// One month of orders plus current reference data, for sales views.
    ///
    /// Same fallback chain as [`load_dataset`](Self::load_dataset) but the
    /// local cache is only read, never written: the result is a partial
    /// view, not the terminal's dataset.
    pub async fn load_month(&self, month: MonthKey) -> Loaded {
        let mut remote_error = None;

        if let Some(remote) = &self.remote {
            let attempt = self
                .bounded(self.fetch_month(remote.as_ref(), month))
                .await
                .and_then(|doc| repair_document(doc, CatalogPolicy::SubstituteEmpty));
            match attempt {
                Ok((dataset, summary)) => {
                    return month_view(Loaded::new(dataset, summary, DataSource::Remote, None), month);
                }
                Err(e) => {
                    warn!(month = %month, error = %e, "Could not load month from remote store");
                    remote_error = Some(e.to_string());
                }
            }
        }

        let loaded = match self.load_local().await {
            Some((dataset, summary)) => {
                Loaded::new(dataset, summary, DataSource::LocalCache, remote_error)
            }
            None => {
                let (dataset, summary, source) = load_bundled();
                Loaded::new(dataset, summary, source, remote_error)
            }
        };
        month_view(loaded, month)
    }

    /// Fetches the remote `store`/`settings` blocks.
    ///
    /// `None` on any failure (logged) or when there is no remote store.
    pub async fn fetch_settings_patch(&self) -> Option<SettingsPatch> {
        let remote = self.remote.as_ref()?;
        let path = if self.layout.partitioned {
            &self.layout.reference_path
        } else {
            &self.layout.dataset_path
        };

        let fetched = self
            .bounded(async { remote.fetch(path).await.map_err(SyncError::from) })
            .await;
        match fetched {
            Ok(Some(doc)) => {
                let patch = SettingsPatch::from_document(&doc);
                (!patch.is_empty()).then_some(patch)
            }
            Ok(None) => {
                debug!(path = %path, "Remote has no document to refresh settings from");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not refresh settings from remote store");
                None
            }
        }
    }

    /// Merges remote store info and settings into `dataset` and writes the
    /// result to the local cache. Failures leave `dataset` untouched.
    ///
    /// ## Returns
    /// Whether anything changed.
    pub async fn refresh_store_settings(&self, dataset: &mut Dataset) -> bool {
        let Some(patch) = self.fetch_settings_patch().await else {
            return false;
        };
        match patch.apply_to(dataset) {
            Ok(changed) => {
                self.write_cache(dataset).await;
                info!(changed, "Store settings refreshed from remote store");
                changed
            }
            Err(e) => {
                warn!(error = %e, "Remote settings did not decode, keeping local ones");
                false
            }
        }
    }

    // =========================================================================
    // Sources
    // =========================================================================

    async fn bounded<T>(&self, fut: impl Future<Output = SyncResult<T>>) -> SyncResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        }
    }

    async fn fetch_full(&self, remote: &dyn RemoteStore) -> SyncResult<Value> {
        if !self.layout.partitioned {
            return remote
                .fetch(&self.layout.dataset_path)
                .await?
                .ok_or_else(|| SyncError::InvalidPayload("remote dataset is empty".into()));
        }

        let reference = self.fetch_reference(remote).await?;
        let months = listed_months(&reference)?;
        let mut slices = Vec::with_capacity(months.len());
        for month in months {
            slices.push(remote.fetch(&self.layout.month_path(month)).await?);
        }
        assemble(reference, slices)
    }

    async fn fetch_month(&self, remote: &dyn RemoteStore, month: MonthKey) -> SyncResult<Value> {
        if !self.layout.partitioned {
            return self.fetch_full(remote).await;
        }
        let reference = self.fetch_reference(remote).await?;
        let slice = remote.fetch(&self.layout.month_path(month)).await?;
        assemble(reference, vec![slice])
    }

    async fn fetch_reference(&self, remote: &dyn RemoteStore) -> SyncResult<Value> {
        remote
            .fetch(&self.layout.reference_path)
            .await?
            .ok_or_else(|| SyncError::InvalidPayload("remote reference document is empty".into()))
    }

    async fn load_local(&self) -> Option<(Dataset, RepairSummary)> {
        let doc = match self.cache.read_json().await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(key = %self.cache.key(), "Local cache is empty");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not read local cache");
                return None;
            }
        };
        match repair_document(doc, CatalogPolicy::Keep) {
            Ok(repaired) => Some(repaired),
            Err(e) => {
                warn!(error = %e, "Local cache holds an unusable dataset");
                None
            }
        }
    }

    async fn write_cache(&self, dataset: &Dataset) {
        let result = match serde_json::to_string(dataset) {
            Ok(text) => self.cache.write(&text).await.map_err(SyncError::from),
            Err(e) => Err(SyncError::from(e)),
        };
        if let Err(e) = result {
            warn!(error = %e, "Could not write dataset to local cache");
        }
    }

    async fn finish(&self, loaded: Loaded) -> Loaded {
        let report = &loaded.report;
        if report.repaired_statuses > 0 {
            warn!(count = report.repaired_statuses, "Orders without status set to completed");
        }
        if report.substituted_catalog {
            warn!("Remote catalog was empty, using built-in menu");
        }
        if let Some(next) = report.sequence_raised_to {
            warn!(next_order_number = next, "Order counter was behind the ledger, raised");
        }

        self.write_cache(&loaded.dataset).await;
        info!(source = %report.source, orders = report.orders, "Dataset loaded");
        loaded
    }
}

/// Bundled document, or the built-in dataset if even that fails.
fn load_bundled() -> (Dataset, RepairSummary, DataSource) {
    let bundled = serde_json::from_str::<Value>(BUNDLED_DATASET_JSON)
        .map_err(SyncError::from)
        .and_then(|doc| repair_document(doc, CatalogPolicy::SubstituteEmpty));
    match bundled {
        Ok((dataset, summary)) => (dataset, summary, DataSource::Bundled),
        Err(e) => {
            error!(error = %e, "Bundled dataset is unusable, using built-in defaults");
            (builtin_dataset(), RepairSummary::default(), DataSource::BuiltIn)
        }
    }
}

fn month_view(mut loaded: Loaded, month: MonthKey) -> Loaded {
    loaded.dataset.orders = loaded.dataset.orders.in_month(month).cloned().collect();
    loaded.report.orders = loaded.dataset.orders.len();
    debug!(month = %month, source = %loaded.report.source, orders = loaded.report.orders, "Month loaded");
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::Persister;
    use crate::SyncConfig;
    use chrono::{TimeZone, Utc};
    use pakwan_core::{Cart, OrderStatus};
    use pakwan_store::{Database, DbConfig, MemoryRemote};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(4);

    async fn cache() -> LocalCache {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .local_cache("posData")
    }

    fn reconciler(remote: Option<&MemoryRemote>, cache: &LocalCache) -> Reconciler {
        Reconciler::new(
            remote.map(|r| Arc::new(r.clone()) as Arc<dyn RemoteStore>),
            cache.clone(),
            RemoteLayout::default(),
            TIMEOUT,
        )
    }

    fn dataset_with_orders(count: u32, month: u32) -> Dataset {
        let mut dataset = builtin_dataset();
        let mut cart = Cart::new();
        let karahi = dataset.product("mutton_karahi").unwrap().clone();
        cart.add(&karahi, None).unwrap();
        for day in 1..=count {
            let now = Utc.with_ymd_and_hms(2025, month, day, 19, 30, 0).unwrap();
            let pending = dataset.commit_order(&cart, "cash", "takeaway", now).unwrap();
            dataset.confirm_order(pending);
        }
        dataset
    }

    #[tokio::test]
    async fn test_remote_timeout_falls_back_to_local_cache() {
        let cache = cache().await;
        let local = dataset_with_orders(3, 3);
        cache.write(&serde_json::to_string(&local).unwrap()).await.unwrap();

        let remote = MemoryRemote::new()
            .with_document("posData", serde_json::to_value(builtin_dataset()).unwrap());
        remote.set_latency(Duration::from_secs(30));
        let bound = Duration::from_millis(200);
        let reconciler = Reconciler::new(
            Some(Arc::new(remote.clone())),
            cache.clone(),
            RemoteLayout::default(),
            bound,
        );

        let started = std::time::Instant::now();
        let loaded = reconciler.load_dataset().await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(loaded.report.source, DataSource::LocalCache);
        assert_eq!(loaded.dataset.orders.len(), 3);
        assert_eq!(loaded.dataset, local);
        assert!(loaded.report.remote_error.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_remote_wins_and_is_cached() {
        let cache = cache().await;
        let remote_dataset = dataset_with_orders(2, 4);
        let remote = MemoryRemote::new()
            .with_document("posData", serde_json::to_value(&remote_dataset).unwrap());

        let loaded = reconciler(Some(&remote), &cache).load_dataset().await;
        assert_eq!(loaded.report.source, DataSource::Remote);
        assert_eq!(loaded.dataset, remote_dataset);

        let cached = cache.read_json().await.unwrap().unwrap();
        assert_eq!(cached["orders"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_remote_ledger_is_valid_but_missing_catalog_is_substituted() {
        let cache = cache().await;
        cache
            .write(&serde_json::to_string(&dataset_with_orders(5, 1)).unwrap())
            .await
            .unwrap();
        let remote = MemoryRemote::new().with_document("posData", json!({"orders": [], "products": []}));

        let loaded = reconciler(Some(&remote), &cache).load_dataset().await;
        assert_eq!(loaded.report.source, DataSource::Remote);
        assert!(loaded.dataset.orders.is_empty());
        assert!(loaded.report.substituted_catalog);
        assert!(!loaded.dataset.products.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_remote_payloads_fall_back() {
        for doc in [Value::Null, json!({"products": []}), json!("posData")] {
            let cache = cache().await;
            cache
                .write(&serde_json::to_string(&dataset_with_orders(1, 2)).unwrap())
                .await
                .unwrap();
            let remote = MemoryRemote::new().with_document("posData", doc);

            let loaded = reconciler(Some(&remote), &cache).load_dataset().await;
            assert_eq!(loaded.report.source, DataSource::LocalCache);
            assert_eq!(loaded.dataset.orders.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_nothing_anywhere_uses_bundled_and_warms_cache() {
        let cache = cache().await;
        let remote = MemoryRemote::new();
        remote.set_offline(true);

        let loaded = reconciler(Some(&remote), &cache).load_dataset().await;
        assert_eq!(loaded.report.source, DataSource::Bundled);
        assert!(!loaded.dataset.products.is_empty());
        assert!(cache.read().await.unwrap().is_some());

        // the warmed cache is the next load's source
        let again = reconciler(None, &cache).load_dataset().await;
        assert_eq!(again.report.source, DataSource::LocalCache);
        assert_eq!(again.dataset, loaded.dataset);
    }

    #[tokio::test]
    async fn test_persist_then_offline_load_roundtrip_repairs_status() {
        let cache = cache().await;
        let mut doc = serde_json::to_value(dataset_with_orders(2, 5)).unwrap();
        doc["orders"][1].as_object_mut().unwrap().remove("status");
        cache.write(&doc.to_string()).await.unwrap();

        let loaded = reconciler(None, &cache).load_dataset().await;
        assert_eq!(loaded.report.repaired_statuses, 1);
        assert!(loaded.dataset.orders.iter().all(|o| o.status == OrderStatus::Completed));

        let persister = Persister::new(None, cache.clone(), RemoteLayout::default(), TIMEOUT);
        persister.persist(&loaded.dataset).await.unwrap();

        let offline = MemoryRemote::new();
        offline.set_offline(true);
        let reloaded = reconciler(Some(&offline), &cache).load_dataset().await;
        assert_eq!(reloaded.dataset, loaded.dataset);
        assert_eq!(reloaded.report.repaired_statuses, 0);
    }

    #[tokio::test]
    async fn test_partitioned_load_reassembles_ledger() {
        let mut config = SyncConfig::default();
        config.partition.enabled = true;
        let layout = config.layout();

        let remote = MemoryRemote::new();
        let mut dataset = dataset_with_orders(2, 1);
        let mut march = dataset_with_orders(1, 3).orders.into_inner().remove(0);
        march.id = "ORD-003".into();
        dataset.orders.append(march);
        dataset.settings.next_order_number = 4;

        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache().await,
            layout.clone(),
            TIMEOUT,
        );
        persister.persist(&dataset).await.unwrap().unwrap().flush().await;

        let cache = cache().await;
        let reconciler = Reconciler::new(Some(Arc::new(remote.clone())), cache, layout, TIMEOUT);

        let full = reconciler.load_dataset().await;
        assert_eq!(full.report.source, DataSource::Remote);
        assert_eq!(full.dataset, dataset);

        let month = reconciler.load_month(MonthKey::new(2025, 3).unwrap()).await;
        assert_eq!(month.report.source, DataSource::Remote);
        assert_eq!(month.dataset.orders.len(), 1);
        assert_eq!(month.dataset.orders.as_slice()[0].id, "ORD-003");
        assert_eq!(month.dataset.products, dataset.products);
    }

    #[tokio::test]
    async fn test_load_month_falls_back_to_filtered_local_cache() {
        let cache = cache().await;
        let mut dataset = dataset_with_orders(2, 6);
        let mut july = dataset_with_orders(1, 7).orders.into_inner().remove(0);
        july.id = "ORD-010".into();
        dataset.orders.append(july);
        cache.write(&serde_json::to_string(&dataset).unwrap()).await.unwrap();

        let loaded = reconciler(None, &cache)
            .load_month(MonthKey::new(2025, 6).unwrap())
            .await;
        assert_eq!(loaded.report.source, DataSource::LocalCache);
        assert_eq!(loaded.dataset.orders.len(), 2);

        // the cache still holds the full ledger
        let cached = cache.read_json().await.unwrap().unwrap();
        assert_eq!(cached["orders"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_store_settings_merges_without_lowering_counter() {
        let cache = cache().await;
        let remote = MemoryRemote::new().with_document(
            "posData",
            json!({
                "orders": [],
                "store": {"name": "Pakwan Center (Gulshan)", "phone": "+92 21 1111111"},
                "settings": {"nextOrderNumber": 2, "printCopies": 2}
            }),
        );
        let mut dataset = dataset_with_orders(4, 8);
        let address = dataset.store.address.clone();

        let changed = reconciler(Some(&remote), &cache)
            .refresh_store_settings(&mut dataset)
            .await;

        assert!(changed);
        assert_eq!(dataset.store.name, "Pakwan Center (Gulshan)");
        assert_eq!(dataset.store.address, address);
        assert_eq!(dataset.settings.print_copies, 2);
        assert_eq!(dataset.settings.next_order_number, 5);
        assert!(cache.read().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_dataset_untouched() {
        let cache = cache().await;
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        let mut dataset = dataset_with_orders(1, 8);
        let before = dataset.clone();

        assert!(!reconciler(Some(&remote), &cache).refresh_store_settings(&mut dataset).await);
        assert_eq!(dataset, before);

        let bad = MemoryRemote::new()
            .with_document("posData", json!({"settings": {"nextOrderNumber": "many"}}));
        assert!(!reconciler(Some(&bad), &cache).refresh_store_settings(&mut dataset).await);
        assert_eq!(dataset, before);
    }
}

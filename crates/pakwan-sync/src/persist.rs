//! # Persistence
//!
//! Local first, remote best effort.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  persist(&dataset)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LocalCache::write(json)   ← awaited; an error here is returned         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tokio::spawn ───────────► wait for the previous remote write           │
//! │       │                    RemoteStore::put(path, doc)  (each bounded)  │
//! │       │                    failures logged, never retried               │
//! │       ▼                                                                 │
//! │  Ok(Some(RemoteWrite))     ← caller may flush() or drop it              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote writes land in the order `persist` was called: each one waits for
//! its predecessor, so an older dataset never overwrites a newer one.
//!
//! Dropping a [`RemoteWrite`] does not cancel the write. A process that
//! exits before it finishes may lose it; the local copy is already safe.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pakwan_core::Dataset;
use pakwan_store::{LocalCache, RemoteStore};

use crate::config::RemoteLayout;
use crate::error::SyncResult;
use crate::partition::split_by_month;

/// Outcome of one background remote write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub failed: usize,
}

impl WriteSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Handle to a spawned remote write.
#[derive(Debug)]
pub struct RemoteWrite {
    handle: JoinHandle<WriteSummary>,
}

impl RemoteWrite {
    /// Waits for the remote write to finish.
    pub async fn flush(self) -> WriteSummary {
        match self.handle.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Remote write task did not complete");
                WriteSummary::default()
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Writes datasets to the local cache and the remote store.
#[derive(Clone)]
pub struct Persister {
    remote: Option<Arc<dyn RemoteStore>>,
    cache: LocalCache,
    layout: RemoteLayout,
    timeout: Duration,
    /// Completion signal of the most recently started remote write.
    last_remote: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl Persister {
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        cache: LocalCache,
        layout: RemoteLayout,
        timeout: Duration,
    ) -> Self {
        Persister {
            remote,
            cache,
            layout,
            timeout,
            last_remote: Arc::new(Mutex::new(None)),
        }
    }

    /// Saves `dataset` locally, then starts the remote write.
    ///
    /// ## Returns
    /// - `Err` only when the local write fails (nothing is sent remotely then)
    /// - `Ok(None)` when there is no remote store
    /// - `Ok(Some(handle))` otherwise
    pub async fn persist(&self, dataset: &Dataset) -> SyncResult<Option<RemoteWrite>> {
        self.write_local(dataset).await?;

        let Some(remote) = self.remote.clone() else {
            return Ok(None);
        };
        let documents = self.remote_documents(dataset)?;
        let timeout = self.timeout;
        debug!(documents = documents.len(), "Starting background remote write");

        let (done, finished) = oneshot::channel();
        let previous = self
            .last_remote
            .lock()
            .expect("Persister mutex poisoned")
            .replace(finished);

        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                // Err means the previous task is gone; nothing left to wait for
                let _ = previous.await;
            }
            let summary = push_documents(remote, documents, timeout).await;
            let _ = done.send(());
            summary
        });
        Ok(Some(RemoteWrite { handle }))
    }

    /// Overwrites the local cache slot with `dataset`.
    pub async fn write_local(&self, dataset: &Dataset) -> SyncResult<()> {
        let text = serde_json::to_string(dataset)?;
        self.cache.write(&text).await?;
        debug!(
            key = %self.cache.key(),
            orders = dataset.orders.len(),
            "Dataset written to local cache"
        );
        Ok(())
    }

    /// Empties the local cache slot.
    pub async fn clear_local(&self) -> SyncResult<bool> {
        let existed = self.cache.clear().await?;
        info!(key = %self.cache.key(), existed, "Local cache cleared");
        Ok(existed)
    }

    /// `(path, document)` pairs for the remote side.
    ///
    /// Unpartitioned: the whole dataset at `dataset_path`.
    /// Partitioned: every month slice, then the reference document last so
    /// its `months` index never names a partition that was not written.
    pub fn remote_documents(&self, dataset: &Dataset) -> SyncResult<Vec<(String, Value)>> {
        if !self.layout.partitioned {
            return Ok(vec![(
                self.layout.dataset_path.clone(),
                serde_json::to_value(dataset)?,
            )]);
        }

        let parts = split_by_month(dataset)?;
        let mut documents = Vec::with_capacity(parts.months.len() + 1);
        for (month, orders) in &parts.months {
            documents.push((self.layout.month_path(*month), serde_json::to_value(orders)?));
        }
        documents.push((self.layout.reference_path.clone(), parts.reference));
        Ok(documents)
    }
}

async fn push_documents(
    remote: Arc<dyn RemoteStore>,
    documents: Vec<(String, Value)>,
    timeout: Duration,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    for (path, document) in documents {
        match tokio::time::timeout(timeout, remote.put(&path, &document)).await {
            Ok(Ok(())) => summary.written += 1,
            Ok(Err(e)) => {
                warn!(path = %path, error = %e, "Could not save to remote store (local copy kept)");
                summary.failed += 1;
            }
            Err(_) => {
                warn!(
                    path = %path,
                    timeout_secs = timeout.as_secs(),
                    "Remote save timed out (local copy kept)"
                );
                summary.failed += 1;
            }
        }
    }
    if summary.is_complete() {
        info!(documents = summary.written, "Dataset saved to remote store");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pakwan_core::defaults::builtin_dataset;
    use pakwan_core::{Cart, MonthKey};
    use pakwan_store::{Database, DbConfig, MemoryRemote};

    async fn cache() -> LocalCache {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.local_cache("posData")
    }

    fn dataset_with_orders() -> Dataset {
        let mut dataset = builtin_dataset();
        let mut cart = Cart::new();
        let biryani = dataset.product("chicken_biryani").unwrap().clone();
        cart.add(&biryani, None).unwrap();

        for (day, month) in [(3, 2), (20, 3), (21, 3)] {
            let now = Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap();
            let pending = dataset.commit_order(&cart, "cash", "dinein", now).unwrap();
            dataset.confirm_order(pending);
        }
        dataset
    }

    #[tokio::test]
    async fn test_persist_writes_local_then_remote() {
        let remote = MemoryRemote::new();
        let cache = cache().await;
        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache.clone(),
            RemoteLayout::default(),
            Duration::from_secs(4),
        );
        let dataset = dataset_with_orders();

        let write = persister.persist(&dataset).await.unwrap().unwrap();
        assert!(cache.read().await.unwrap().is_some());

        let summary = write.flush().await;
        assert_eq!(summary, WriteSummary { written: 1, failed: 0 });
        let stored = remote.document("posData").unwrap();
        assert_eq!(stored["orders"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_copy() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        let cache = cache().await;
        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache.clone(),
            RemoteLayout::default(),
            Duration::from_secs(4),
        );

        let summary = persister
            .persist(&dataset_with_orders())
            .await
            .unwrap()
            .unwrap()
            .flush()
            .await;
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete());
        assert!(remote.document("posData").is_none());

        let local = cache.read_json().await.unwrap().unwrap();
        assert_eq!(local["orders"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stalled_remote_write_is_bounded() {
        let remote = MemoryRemote::new();
        remote.set_latency(Duration::from_secs(60));
        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache().await,
            RemoteLayout::default(),
            Duration::from_millis(200),
        );

        let started = std::time::Instant::now();
        let summary = persister
            .persist(&builtin_dataset())
            .await
            .unwrap()
            .unwrap()
            .flush()
            .await;
        assert_eq!(summary.failed, 1);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(remote.put_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_writes_land_in_persist_order() {
        let remote = MemoryRemote::new();
        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache().await,
            RemoteLayout::default(),
            Duration::from_secs(4),
        );
        let mut older = builtin_dataset();
        older.store.name = "Before".into();
        let mut newer = builtin_dataset();
        newer.store.name = "After".into();

        // the first put is slow, the second would overtake it
        remote.set_latency(Duration::from_millis(300));
        let first = persister.persist(&older).await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        remote.set_latency(Duration::ZERO);
        let second = persister.persist(&newer).await.unwrap().unwrap();

        assert_eq!(second.flush().await.written, 1);
        assert_eq!(first.flush().await.written, 1);
        assert_eq!(remote.put_count(), 2);
        assert_eq!(remote.document("posData").unwrap()["store"]["name"], "After");
    }

    #[tokio::test]
    async fn test_without_remote_only_local_is_written() {
        let cache = cache().await;
        let persister = Persister::new(None, cache.clone(), RemoteLayout::default(), Duration::from_secs(4));

        assert!(persister.persist(&builtin_dataset()).await.unwrap().is_none());
        assert!(cache.read().await.unwrap().is_some());

        assert!(persister.clear_local().await.unwrap());
        assert!(cache.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partitioned_persist_writes_each_month() {
        let remote = MemoryRemote::new();
        let mut config = crate::SyncConfig::default();
        config.partition.enabled = true;
        let persister = Persister::new(
            Some(Arc::new(remote.clone())),
            cache().await,
            config.layout(),
            Duration::from_secs(4),
        );

        let documents = persister.remote_documents(&dataset_with_orders()).unwrap();
        let paths: Vec<&str> = documents.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            ["posData/orders/2025-02", "posData/orders/2025-03", "posData/reference"]
        );

        let summary = persister
            .persist(&dataset_with_orders())
            .await
            .unwrap()
            .unwrap()
            .flush()
            .await;
        assert_eq!(summary.written, 3);

        let march = remote
            .document(&config.layout().month_path(MonthKey::new(2025, 3).unwrap()))
            .unwrap();
        assert_eq!(march.as_array().unwrap().len(), 2);
        let reference = remote.document("posData/reference").unwrap();
        assert!(reference.get("orders").is_none());
        assert_eq!(reference["settings"]["nextOrderNumber"], 4);
    }
}

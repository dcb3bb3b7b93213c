//! In-process remote store.
//!
//! Used by tests and by `mode = "offline"` demos. Latency and outages can
//! be injected at runtime; clones share the same documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::RemoteStore;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    documents: Mutex<HashMap<String, Value>>,
    latency: Mutex<Duration>,
    offline: AtomicBool,
    puts: AtomicUsize,
}

/// HashMap-backed [`RemoteStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    inner: Arc<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document (builder style).
    pub fn with_document(self, path: &str, document: Value) -> Self {
        self.documents().insert(path.to_string(), document);
        self
    }

    /// Every call sleeps this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().expect("remote latency mutex poisoned") = latency;
    }

    /// While offline every call fails with `RemoteUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Current content at `path`.
    pub fn document(&self, path: &str) -> Option<Value> {
        self.documents().get(path).cloned()
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.inner.puts.load(Ordering::SeqCst)
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.inner
            .documents
            .lock()
            .expect("remote documents mutex poisoned")
    }

    async fn simulate_network(&self) -> StoreResult<()> {
        let latency = *self.inner.latency.lock().expect("remote latency mutex poisoned");
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteUnavailable("network is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch(&self, path: &str) -> StoreResult<Option<Value>> {
        self.simulate_network().await?;
        Ok(self.document(path).filter(|v| !v.is_null()))
    }

    async fn put(&self, path: &str, document: &Value) -> StoreResult<()> {
        self.simulate_network().await?;
        self.documents().insert(path.to_string(), document.clone());
        self.inner.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

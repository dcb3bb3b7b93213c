//! # Sync Engine
//!
//! Wires a [`Reconciler`] and a [`Persister`] to the same remote store and
//! local cache slot.

use std::sync::Arc;

use tracing::info;

use pakwan_store::{Database, RemoteStore};

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::persist::Persister;
use crate::reconcile::Reconciler;

/// The read side and the write side of synchronization.
#[derive(Clone)]
pub struct SyncEngine {
    pub reconciler: Reconciler,
    pub persister: Persister,
}

impl SyncEngine {
    /// Builds the engine from configuration, creating the HTTP client when
    /// the mode and `remote.base_url` allow it.
    pub fn from_config(config: &SyncConfig, db: &Database) -> SyncResult<Self> {
        let remote = config.build_remote()?;
        Ok(Self::with_remote(config, db, remote))
    }

    /// Builds the engine around an explicit remote store.
    pub fn with_remote(
        config: &SyncConfig,
        db: &Database,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        let cache = db.local_cache(config.cache.slot_key.clone());
        let layout = config.layout();
        let timeout = config.remote_timeout();

        info!(
            remote = remote.is_some(),
            partitioned = layout.partitioned,
            timeout_secs = timeout.as_secs(),
            "Sync engine ready"
        );

        SyncEngine {
            reconciler: Reconciler::new(remote.clone(), cache.clone(), layout.clone(), timeout),
            persister: Persister::new(remote, cache, layout, timeout),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.reconciler.has_remote()
    }
}

//! # Sync State
//!
//! The sync engine plus the remote writes that have not finished yet.
//!
//! Persistence never fails a command: the in-memory dataset is the truth
//! for the running terminal, and a failed local write is retried by the
//! next persist. Remote writes are tracked so a short-lived process can
//! [`flush`](SyncState::flush) them before it exits.
//!
//! ## Write Ordering
//! ```text
//! command A: mutate ──────────────► persist ─┐
//! command B: mutate ──► persist ─┐           │
//!                                ▼           ▼
//!                    write_order lock: snapshot → local write → spawn remote
//! ```
//! The snapshot is taken inside `write_order`, so whichever write runs last
//! carries every mutation made before it. An older copy can never
//! overwrite a newer one in the cache slot.

use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use pakwan_sync::{Persister, Reconciler, RemoteWrite, SyncEngine, WriteSummary};

use crate::state::DatasetState;

/// Shared sync handle.
#[derive(Clone)]
pub struct SyncState {
    engine: SyncEngine,
    in_flight: Arc<Mutex<Vec<RemoteWrite>>>,
    write_order: Arc<tokio::sync::Mutex<()>>,
}

impl SyncState {
    pub fn new(engine: SyncEngine) -> Self {
        SyncState {
            engine,
            in_flight: Arc::new(Mutex::new(Vec::new())),
            write_order: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.engine.reconciler
    }

    pub fn persister(&self) -> &Persister {
        &self.engine.persister
    }

    pub fn has_remote(&self) -> bool {
        self.engine.has_remote()
    }

    /// Saves the current dataset locally and starts the remote write.
    ///
    /// ## Returns
    /// Whether the local copy was written.
    pub async fn persist(&self, dataset: &DatasetState) -> bool {
        let _order = self.write_order.lock().await;
        let snapshot = dataset.snapshot();
        match self.engine.persister.persist(&snapshot).await {
            Ok(Some(write)) => {
                let mut in_flight = self.in_flight.lock().expect("Sync mutex poisoned");
                in_flight.retain(|w| !w.is_finished());
                in_flight.push(write);
                true
            }
            Ok(None) => true,
            Err(e) => {
                error!(error = %e, "Could not save dataset to local cache");
                false
            }
        }
    }

    /// Saves the current dataset locally only.
    pub async fn write_local(&self, dataset: &DatasetState) -> bool {
        let _order = self.write_order.lock().await;
        let snapshot = dataset.snapshot();
        match self.engine.persister.write_local(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Could not save dataset to local cache");
                false
            }
        }
    }

    /// Number of remote writes started and not yet awaited.
    pub fn pending_writes(&self) -> usize {
        self.in_flight.lock().expect("Sync mutex poisoned").len()
    }

    /// Waits for every outstanding remote write.
    pub async fn flush(&self) -> WriteSummary {
        let writes = std::mem::take(&mut *self.in_flight.lock().expect("Sync mutex poisoned"));
        debug!(count = writes.len(), "Flushing remote writes");

        let mut total = WriteSummary::default();
        for write in writes {
            let summary = write.flush().await;
            total.written += summary.written;
            total.failed += summary.failed;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use pakwan_sync::DataSource;

    #[tokio::test]
    async fn test_concurrent_persists_leave_latest_dataset_everywhere() {
        let (app, remote) = testing::app().await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move {
                    app.dataset
                        .with_dataset_mut(|d| d.settings.next_order_number += 1);
                    tokio::task::yield_now().await;
                    app.sync.persist(&app.dataset).await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }
        assert!(app.sync.flush().await.is_complete());

        let latest = app.dataset.with_dataset(|d| d.settings.next_order_number);
        assert_eq!(latest, 9);
        assert_eq!(remote.document("posData").unwrap()["settings"]["nextOrderNumber"], 9);

        remote.set_offline(true);
        let cached = app.sync.reconciler().load_dataset().await;
        assert_eq!(cached.report.source, DataSource::LocalCache);
        assert_eq!(cached.dataset.settings.next_order_number, latest);
    }
}

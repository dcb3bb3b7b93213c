//! # Remote Document Store
//!
//! A hierarchical JSON document store addressed by slash-separated paths
//! (`posData`, `posData/reference`, `posData/orders/2025-03`).
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         dyn RemoteStore                                 │
//! │                               │                                         │
//! │              ┌────────────────┴────────────────┐                        │
//! │              ▼                                 ▼                        │
//! │     HttpRemoteStore                      MemoryRemote                   │
//! │     GET/PUT {base}/{path}.json           HashMap<path, Value>           │
//! │     (production)                         latency + outage injection     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing document is `Ok(None)`, never an error. Timeouts are the
//! caller's policy: the sync layer wraps every call in its own deadline.

mod http;
mod memory;

pub use http::{HttpRemoteConfig, HttpRemoteStore};
pub use memory::MemoryRemote;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// Read/write access to remote JSON documents.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads the document at `path`. `None` when nothing is stored there.
    async fn fetch(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Replaces the document at `path`.
    async fn put(&self, path: &str, document: &Value) -> StoreResult<()>;
}

/// Joins path segments with `/`, skipping empty ones.
///
/// ## Example
/// ```
/// use pakwan_store::remote::join_path;
/// assert_eq!(join_path(&["posData", "orders", "2025-03"]), "posData/orders/2025-03");
/// assert_eq!(join_path(&["posData", "", "reference"]), "posData/reference");
/// ```
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

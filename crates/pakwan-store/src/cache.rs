//! # Local Cache
//!
//! The device-local copy of the dataset: a single string-keyed slot that
//! holds the serialized JSON document. Writes are synchronous from the
//! caller's point of view (awaited before anything remote happens).

use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::repository::cache_slot::CacheSlotRepository;

/// Default slot key for the dataset document.
pub const DEFAULT_SLOT_KEY: &str = "posData";

/// One cache slot.
#[derive(Debug, Clone)]
pub struct LocalCache {
    slots: CacheSlotRepository,
    key: String,
}

impl LocalCache {
    pub fn new(slots: CacheSlotRepository, key: impl Into<String>) -> Self {
        LocalCache {
            slots,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored document text, `None` if the slot is empty.
    pub async fn read(&self) -> StoreResult<Option<String>> {
        let slot = self.slots.get(&self.key).await?;
        debug!(key = %self.key, present = slot.is_some(), "Read local cache");
        Ok(slot.map(|s| s.value))
    }

    /// The stored document parsed as JSON.
    ///
    /// Unparseable content is logged and reported as absent so that callers
    /// fall through to the next source instead of failing.
    pub async fn read_json(&self) -> StoreResult<Option<serde_json::Value>> {
        let Some(text) = self.read().await? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Local cache holds unparseable JSON, ignoring");
                Ok(None)
            }
        }
    }

    /// Overwrites the slot.
    pub async fn write(&self, document: &str) -> StoreResult<()> {
        self.slots.put(&self.key, document).await
    }

    /// Empties the slot.
    pub async fn clear(&self) -> StoreResult<bool> {
        self.slots.delete(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_write_then_read() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.local_cache(DEFAULT_SLOT_KEY);

        assert!(cache.read().await.unwrap().is_none());

        cache.write(r#"{"orders":[{"id":"ORD-001"}]}"#).await.unwrap();
        let value = cache.read_json().await.unwrap().unwrap();
        assert_eq!(value["orders"][0]["id"], "ORD-001");

        assert!(cache.clear().await.unwrap());
        assert!(cache.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_garbage_reads_as_absent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.local_cache("posData");
        cache.write("{ definitely not json").await.unwrap();

        assert!(cache.read().await.unwrap().is_some());
        assert!(cache.read_json().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.local_cache("a");
        let b = db.local_cache("b");

        a.write("1").await.unwrap();
        assert!(b.read().await.unwrap().is_none());
        assert_eq!(a.key(), "a");
    }
}

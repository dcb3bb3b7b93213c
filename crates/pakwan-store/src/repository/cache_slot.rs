//! # Cache Slot Repository
//!
//! CRUD over the `cache_slots` table: string key → serialized document.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;

/// One stored slot.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CacheSlot {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for cache slot operations.
#[derive(Debug, Clone)]
pub struct CacheSlotRepository {
    pool: SqlitePool,
}

impl CacheSlotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CacheSlotRepository { pool }
    }

    /// Fetches a slot, `None` if it was never written.
    pub async fn get(&self, key: &str) -> StoreResult<Option<CacheSlot>> {
        let slot = sqlx::query_as::<_, CacheSlot>(
            "SELECT key, value, updated_at FROM cache_slots WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(slot)
    }

    /// Inserts or overwrites a slot.
    pub async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let now = Utc::now();
        debug!(key = %key, bytes = value.len(), "Writing cache slot");

        sqlx::query(
            r#"
            INSERT INTO cache_slots (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes a slot. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cache_slots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All slot keys, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM cache_slots ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_overwrite_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cache_slots();

        assert!(repo.get("posData").await.unwrap().is_none());

        repo.put("posData", r#"{"orders":[]}"#).await.unwrap();
        let first = repo.get("posData").await.unwrap().unwrap();
        assert_eq!(first.value, r#"{"orders":[]}"#);

        repo.put("posData", r#"{"orders":[1]}"#).await.unwrap();
        let second = repo.get("posData").await.unwrap().unwrap();
        assert_eq!(second.value, r#"{"orders":[1]}"#);
        assert!(second.updated_at >= first.updated_at);

        repo.put("other", "{}").await.unwrap();
        assert_eq!(repo.keys().await.unwrap(), vec!["other", "posData"]);

        assert!(repo.delete("posData").await.unwrap());
        assert!(!repo.delete("posData").await.unwrap());
        assert!(repo.get("posData").await.unwrap().is_none());
    }
}

//! # pakwan-store: Storage Layer for the Pakwan POS terminal
//!
//! The two places a dataset document can live: the device-local cache and
//! the remote document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pakwan POS Data Flow                             │
//! │                                                                         │
//! │  pakwan-sync (Reconciler / Persister)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pakwan-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  LocalCache   │    │ RemoteStore  │  │   │
//! │  │   │   (pool.rs)   │◄───│  (cache.rs)   │    │  (remote/)   │  │   │
//! │  │   │ SqlitePool    │    │ one slot,     │    │ HTTP / Memory│  │   │
//! │  │   │ + migrations  │    │ one document  │    │ GET/PUT JSON │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                            │                    │
//! │       ▼                                            ▼                    │
//! │  pakwan.db (SQLite, WAL)                  {base_url}/posData.json       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Raw slot table access
//! - [`cache`] - The local cache slot holding the dataset document
//! - [`remote`] - Remote document store trait and implementations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pakwan_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pakwan.db")).await?;
//! let cache = db.local_cache("posData");
//! cache.write(&document).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod remote;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{LocalCache, DEFAULT_SLOT_KEY};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use remote::{HttpRemoteConfig, HttpRemoteStore, MemoryRemote, RemoteStore};
pub use repository::cache_slot::CacheSlotRepository;

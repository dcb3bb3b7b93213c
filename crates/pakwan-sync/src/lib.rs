//! # pakwan-sync: Reconciliation and Persistence for Pakwan POS
//!
//! Decides which copy of the dataset is authoritative and keeps the local
//! cache and the remote store in step with the in-memory dataset.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SyncEngine                               │  │
//! │  │  built from SyncConfig (TOML + PAKWAN_* env) and a Database      │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  ▼                              ▼                      │
//! │  ┌────────────────────────────┐  ┌────────────────────────────────┐   │
//! │  │        Reconciler          │  │          Persister             │   │
//! │  │                            │  │                                │   │
//! │  │ remote → cache → bundled   │  │ local cache write (awaited)    │   │
//! │  │ → built-in fallback chain  │  │ remote write (spawned, bounded)│   │
//! │  │ month views, settings      │  │ month partitions, reference    │   │
//! │  │ refresh                    │  │ document last                  │   │
//! │  └─────────────┬──────────────┘  └────────────────────────────────┘   │
//! │                ▼                                                        │
//! │  ┌────────────────────────────┐  ┌────────────────────────────────┐   │
//! │  │         repair             │  │         partition              │   │
//! │  │ sparse maps, statuses,     │  │ split_by_month / assemble      │   │
//! │  │ defaults, sequence raise   │  │ `months` index                 │   │
//! │  └────────────────────────────┘  └────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Sync configuration (mode, remote, partitioning, cache)
//! - [`engine`] - `SyncEngine` wiring
//! - [`error`] - Sync error types
//! - [`import`] - Uploaded dataset parsing
//! - [`partition`] - Month partition layout
//! - [`persist`] - Local-first persistence
//! - [`reconcile`] - Source selection on load
//! - [`repair`] - Structural repair of raw documents

pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod partition;
pub mod persist;
pub mod reconcile;
pub mod repair;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{RemoteLayout, SyncConfig, SyncMode};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use import::parse_import;
pub use persist::{Persister, RemoteWrite, WriteSummary};
pub use reconcile::{DataSource, LoadReport, Loaded, Reconciler, SettingsPatch};
pub use repair::{repair_document, CatalogPolicy, RepairSummary};

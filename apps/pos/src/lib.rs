//! # Pakwan POS Service Layer
//!
//! Library half of the terminal app: state holders and command functions.
//! `main.rs` is a thin CLI over it.
//!
//! ## Module Structure
//! ```text
//! pakwan_pos/
//! ├── lib.rs       ◄─── You are here (PosApp bootstrap)
//! ├── error.rs     ◄─── ApiError (code + message)
//! ├── state/       ◄─── DatasetState, CartState, CheckoutState,
//! │                     SyncState, ConfigState
//! └── commands/    ◄─── The only mutation entry points
//!     ├── cart.rs
//!     ├── checkout.rs
//!     ├── orders.rs
//!     ├── catalog.rs
//!     ├── reports.rs
//!     └── data.rs
//! ```
//!
//! ## Startup Sequence
//! ```text
//! SyncConfig::load_or_default ──► Database::new (SQLite cache file)
//!          │                              │
//!          └──────────► SyncEngine ◄──────┘
//!                           │
//!                           ▼
//!               Reconciler::load_dataset()  (remote → cache → bundled)
//!                           │
//!                           ▼
//!             PosApp { dataset, cart, checkout, sync, config }
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use tracing::info;

use pakwan_store::{Database, DbConfig, RemoteStore};
use pakwan_sync::{LoadReport, SyncConfig, SyncEngine};

pub use error::{ApiError, ErrorCode};
use state::{CartState, CheckoutState, ConfigState, DatasetState, SyncState};

/// Every piece of state the commands operate on.
#[derive(Clone)]
pub struct PosApp {
    pub dataset: DatasetState,
    pub cart: CartState,
    pub checkout: CheckoutState,
    pub sync: SyncState,
    pub config: ConfigState,
}

impl PosApp {
    /// Opens the local cache database named by `sync_config`, builds the
    /// remote client and reconciles the dataset.
    pub async fn open(
        sync_config: &SyncConfig,
        config: ConfigState,
    ) -> Result<(Self, LoadReport), ApiError> {
        let db = Database::new(DbConfig::new(sync_config.database_path())).await?;
        let engine = SyncEngine::from_config(sync_config, &db)?;
        Ok(Self::start(engine, config).await)
    }

    /// Same as [`open`](Self::open) with an explicit database and remote store.
    pub async fn open_with(
        sync_config: &SyncConfig,
        db: &Database,
        remote: Option<Arc<dyn RemoteStore>>,
        config: ConfigState,
    ) -> (Self, LoadReport) {
        let engine = SyncEngine::with_remote(sync_config, db, remote);
        Self::start(engine, config).await
    }

    async fn start(engine: SyncEngine, config: ConfigState) -> (Self, LoadReport) {
        let loaded = engine.reconciler.load_dataset().await;
        info!(
            source = %loaded.report.source,
            orders = loaded.report.orders,
            next_order_number = loaded.dataset.settings.next_order_number,
            "Terminal ready"
        );

        let app = PosApp {
            dataset: DatasetState::new(loaded.dataset),
            cart: CartState::new(),
            checkout: CheckoutState::new(),
            sync: SyncState::new(engine),
            config,
        };
        (app, loaded.report)
    }
}

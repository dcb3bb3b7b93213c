//! # State Module
//!
//! Application state for the terminal.
//!
//! Each concern gets its own state type instead of one `AppState` struct,
//! so a command signature names exactly the state it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌───────────────┐                   │
//! │  │ DatasetState │ │  CartState   │ │ CheckoutState │                   │
//! │  │ Arc<Mutex<   │ │ Arc<Mutex<   │ │ Arc<Mutex<    │                   │
//! │  │  Dataset>>   │ │  Cart>>      │ │  Option<      │                   │
//! │  │              │ │              │ │  PendingOrder>│                   │
//! │  └──────────────┘ └──────────────┘ └───────────────┘                   │
//! │  ┌──────────────────────────────┐  ┌──────────────────┐                │
//! │  │          SyncState           │  │   ConfigState    │                │
//! │  │  SyncEngine + in-flight      │  │  currency symbol │                │
//! │  │  remote writes               │  │  UTC offset      │                │
//! │  └──────────────────────────────┘  └──────────────────┘                │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Mutex-backed states are locked only inside closures; no lock is     │
//! │    held across an `.await`. Commands clone a snapshot, release the     │
//! │    lock, then persist the snapshot.                                    │
//! │  • Order ids are assigned inside the DatasetState lock.                │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod checkout;
mod config;
mod dataset;
mod sync;

pub use cart::CartState;
pub use checkout::CheckoutState;
pub use config::ConfigState;
pub use dataset::DatasetState;
pub use sync::SyncState;

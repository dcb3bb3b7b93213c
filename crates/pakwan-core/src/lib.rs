//! # pakwan-core: Pure Business Logic for the Pakwan POS terminal
//!
//! Everything the terminal decides, with none of what it does to the
//! outside world. Storage, network and the clock are the caller's problem.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pakwan POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/pos (service layer + CLI)                 │   │
//! │  │   add_to_cart, checkout, confirm_order, return_order, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pakwan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  cart   │ │ catalog │ │ ledger  │ │ report  │  │   │
//! │  │   │ Dataset │ │  Cart   │ │ add/edit│ │ ORD-NNN │ │ summary │  │   │
//! │  │   │  Order  │ │CartLine │ │ delete  │ │ pending │ │analytics│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      pakwan-sync (reconcile / persist) over pakwan-store        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The dataset document: catalog, orders, settings
//! - [`money`] - Integer money in whole currency units
//! - [`cart`] - The basket being rung up
//! - [`catalog`] - Category and product maintenance rules
//! - [`ledger`] - Order numbering, two-phase checkout, status changes
//! - [`report`] - Period filters, sales summary, analytics
//! - [`payload`] - Raw JSON repairs applied before decoding
//! - [`validation`] - Input validation
//! - [`defaults`] - Bundled and built-in fallback data
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use pakwan_core::{defaults::builtin_dataset, Cart, Money};
//!
//! let mut dataset = builtin_dataset();
//! let mut cart = Cart::new();
//! let biryani = dataset.product("chicken_biryani").unwrap().clone();
//! cart.add(&biryani, dataset.category("biryanis")).unwrap();
//! cart.add(&biryani, dataset.category("biryanis")).unwrap();
//!
//! let pending = dataset.commit_order(&cart, "cash", "dinein", Utc::now()).unwrap();
//! assert_eq!(pending.id(), "ORD-001");
//! assert_eq!(pending.order().total, Money::from_units(640));
//! dataset.confirm_order(pending);
//! assert_eq!(dataset.orders.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod defaults;
pub mod error;
pub mod ledger;
pub mod money;
pub mod payload;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use catalog::{CategoryDraft, ProductDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{ConfirmOutcome, DuplicateReport, Ledger, PendingOrder};
pub use money::Money;
pub use report::{Analytics, Period, SalesSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Catches a mistyped count (1000 instead of 10) before it reaches a
/// receipt.
pub const MAX_ITEM_QUANTITY: i64 = 999;

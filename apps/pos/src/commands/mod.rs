//! # Commands Module
//!
//! The operations the terminal exposes. Every mutation of the dataset or
//! the cart goes through one of these functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── checkout.rs  ◄─── Checkout, confirm, cancel
//! ├── orders.rs    ◄─── Return, delete, duplicate cleanup, listing
//! ├── catalog.rs   ◄─── Category and product CRUD
//! ├── reports.rs   ◄─── Sales summary and analytics
//! └── data.rs      ◄─── Load, month view, settings refresh, import, resume
//! ```
//!
//! ## Command Shape
//! ```text
//! pub async fn command(state: &XState, ..., args) -> Result<Response, ApiError>
//!      │
//!      ├── with_dataset_mut(|d| core operation)   lock held, no await
//!      └── sync.persist(dataset).await            lock released; snapshot
//!                                                 taken in write order
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod data;
pub mod orders;
pub mod reports;

pub use cart::*;
pub use catalog::*;
pub use checkout::*;
pub use data::*;
pub use orders::*;
pub use reports::*;

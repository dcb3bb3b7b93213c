//! # Cart State
//!
//! The basket being rung up.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action                   Command                 Cart State Change     │
//! │  ──────                   ───────                 ─────────────────     │
//! │  Tap product ────────────► add_to_cart() ───────► line.qty += 1 / push │
//! │  Weigh & price ──────────► add_custom_line() ───► push custom line     │
//! │  +/- buttons ────────────► adjust_quantity() ───► qty += delta         │
//! │  Remove ─────────────────► remove_line() ───────► lines.remove(i)      │
//! │  Confirm order ──────────► confirm_order() ─────► lines.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use pakwan_core::Cart;

/// Shared cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }
}

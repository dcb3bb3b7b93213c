//! # Checkout State
//!
//! Holds the order between "Checkout" and "Confirm" (the receipt preview).
//! At most one order is pending; staging a new one discards the old one,
//! whose id stays consumed.

use std::sync::{Arc, Mutex};

use pakwan_core::{Order, PendingOrder};

/// Pending order slot.
#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    pending: Arc<Mutex<Option<PendingOrder>>>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `pending`, returning the order it displaced, if any.
    pub fn stage(&self, pending: PendingOrder) -> Option<PendingOrder> {
        self.lock().replace(pending)
    }

    /// A copy of the staged order, left in place.
    pub fn current(&self) -> Option<PendingOrder> {
        self.lock().clone()
    }

    /// The staged order, for display.
    pub fn preview(&self) -> Option<Order> {
        self.lock().as_ref().map(|p| p.order().clone())
    }

    /// Removes the staged order.
    pub fn take(&self) -> Option<PendingOrder> {
        self.lock().take()
    }

    /// Clears the slot only if it still holds order `id`.
    pub fn clear_if(&self, id: &str) {
        let mut pending = self.lock();
        if pending.as_ref().is_some_and(|p| p.id() == id) {
            *pending = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingOrder>> {
        self.pending.lock().expect("Checkout mutex poisoned")
    }
}

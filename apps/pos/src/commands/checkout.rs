//! # Checkout Commands
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(payment, type)                                                │
//! │     │  DatasetState lock: validate → next_order_id → build order        │
//! │     │  (counter bumped and saved locally even if never confirmed)       │
//! │     ▼                                                                   │
//! │  CheckoutState: pending order   ──► receipt preview                     │
//! │     │                                                                   │
//! │     ├── confirm_order() ──► ledger append (idempotent by id)            │
//! │     │                       cart cleared, dataset persisted             │
//! │     │                                                                   │
//! │     └── cancel_pending_order() ──► discarded, id NOT reclaimed          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use pakwan_core::{Cart, ConfirmOutcome, Order, OrderId};

use crate::error::ApiError;
use crate::state::{CartState, CheckoutState, DatasetState, SyncState};

/// Result of confirming the pending order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub order: Order,
    pub outcome: ConfirmOutcome,
}

/// Turns the cart into a pending order awaiting confirmation.
///
/// ## Rules
/// - Empty cart, blank or unknown payment method/order type are rejected
///   before any number is consumed
/// - The id is assigned and the counter advanced under the dataset lock
/// - The cart is left as is until confirmation
/// - A previously staged order is discarded (its id stays used)
///
/// ## Returns
/// The order as it will appear on the receipt.
pub async fn checkout(
    dataset: &DatasetState,
    cart: &CartState,
    pending_slot: &CheckoutState,
    sync: &SyncState,
    payment_method: &str,
    order_type: &str,
    now: DateTime<Utc>,
) -> Result<Order, ApiError> {
    debug!(payment_method = %payment_method, order_type = %order_type, "checkout command");

    let basket: Cart = cart.snapshot();
    let (pending, next_order_number) = dataset.with_dataset_mut(|d| {
        let pending = d.commit_order(&basket, payment_method, order_type, now)?;
        Ok::<_, ApiError>((pending, d.settings.next_order_number))
    })?;

    let order = pending.order().clone();
    if let Some(displaced) = pending_slot.stage(pending) {
        warn!(order_id = %displaced.cancel(), "Pending order replaced before confirmation");
    }
    info!(
        order_id = %order.id,
        total = %order.total,
        next_order_number,
        "Order pending confirmation"
    );

    sync.write_local(dataset).await;
    Ok(order)
}

/// Appends the pending order to the ledger.
///
/// ## Behavior
/// - Nothing staged: `BUSINESS_LOGIC` error
/// - Order already in the ledger: `AlreadyCommitted`, nothing else happens
/// - Otherwise: appended, cart cleared, dataset persisted
pub async fn confirm_order(
    dataset: &DatasetState,
    cart: &CartState,
    pending_slot: &CheckoutState,
    sync: &SyncState,
) -> Result<ConfirmResponse, ApiError> {
    debug!("confirm_order command");

    let pending = pending_slot
        .current()
        .ok_or_else(|| ApiError::business("No order is awaiting confirmation"))?;
    let order = pending.order().clone();

    let outcome = dataset.with_dataset_mut(|d| d.confirm_order(pending));
    pending_slot.clear_if(&order.id);

    match outcome {
        ConfirmOutcome::Appended => {
            cart.with_cart_mut(Cart::clear);
            info!(order_id = %order.id, total = %order.total, "Order confirmed");
            sync.persist(dataset).await;
        }
        ConfirmOutcome::AlreadyCommitted => {
            warn!(order_id = %order.id, "Order was already committed, skipping append")
        }
    }

    Ok(ConfirmResponse { order, outcome })
}

/// Discards the pending order. The cart is kept so it can be checked out
/// again; the consumed id is not reused.
pub fn cancel_pending_order(pending_slot: &CheckoutState) -> Result<OrderId, ApiError> {
    debug!("cancel_pending_order command");

    let pending = pending_slot
        .take()
        .ok_or_else(|| ApiError::business("No order is awaiting confirmation"))?;
    let id = pending.cancel();
    info!(order_id = %id, "Pending order cancelled");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::error::ErrorCode;
    use crate::testing;
    use pakwan_core::Money;

    fn now() -> DateTime<Utc> {
        "2025-03-14T12:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_checkout_totals_and_id() {
        let (app, _) = testing::app().await;
        app.dataset.with_dataset_mut(|d| d.settings.next_order_number = 7);
        add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();
        add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();
        add_to_cart(&app.dataset, &app.cart, "mutton_karahi").unwrap();

        let order = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();

        assert_eq!(order.id, "ORD-007");
        assert_eq!(order.subtotal, Money::from_units(1190));
        assert_eq!(order.total, Money::from_units(1190));
        assert_eq!(order.tax, Money::zero());
        assert_eq!(app.dataset.with_dataset(|d| d.settings.next_order_number), 8);
        assert!(app.dataset.with_dataset(|d| d.orders.is_empty()));
        assert_eq!(app.cart.with_cart(|c| c.line_count()), 2);
    }

    #[tokio::test]
    async fn test_confirm_twice_appends_once() {
        let (app, remote) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "seekh_kabab").unwrap();
        checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "card", "takeaway", now())
            .await
            .unwrap();

        let first = confirm_order(&app.dataset, &app.cart, &app.checkout, &app.sync).await.unwrap();
        assert_eq!(first.outcome, ConfirmOutcome::Appended);
        assert!(app.cart.with_cart(Cart::is_empty));

        let err = confirm_order(&app.dataset, &app.cart, &app.checkout, &app.sync).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(app.dataset.with_dataset(|d| d.orders.len()), 1);

        app.sync.flush().await;
        let stored = remote.document("posData").unwrap();
        assert_eq!(stored["orders"][0]["id"], first.order.id.as_str());
    }

    #[tokio::test]
    async fn test_staged_order_already_in_ledger_is_not_duplicated() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "plain_naan").unwrap();
        checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();

        let staged = app.checkout.current().unwrap();
        app.dataset.with_dataset_mut(|d| d.confirm_order(staged));

        let response = confirm_order(&app.dataset, &app.cart, &app.checkout, &app.sync).await.unwrap();
        assert_eq!(response.outcome, ConfirmOutcome::AlreadyCommitted);
        assert_eq!(app.dataset.with_dataset(|d| d.orders.len()), 1);
        assert_eq!(app.cart.with_cart(|c| c.line_count()), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_checkouts_get_increasing_ids() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "soft_drink").unwrap();

        let first = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();
        let second = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();

        assert_eq!(first.id, "ORD-001");
        assert_eq!(second.id, "ORD-002");
        assert_eq!(app.checkout.preview().unwrap().id, "ORD-002");
    }

    #[tokio::test]
    async fn test_cancel_keeps_counter_and_cart() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "chicken_tikka").unwrap();
        checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();

        assert_eq!(cancel_pending_order(&app.checkout).unwrap(), "ORD-001");
        assert!(cancel_pending_order(&app.checkout).is_err());
        assert_eq!(app.dataset.with_dataset(|d| d.settings.next_order_number), 2);
        assert_eq!(app.cart.with_cart(|c| c.line_count()), 1);

        let next = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap();
        assert_eq!(next.id, "ORD-002");
    }

    #[tokio::test]
    async fn test_invalid_checkout_consumes_no_number() {
        let (app, _) = testing::app().await;

        let err = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "cash", "dinein", now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();
        let err = checkout(&app.dataset, &app.cart, &app.checkout, &app.sync, "bitcoin", "dinein", now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(app.dataset.with_dataset(|d| d.settings.next_order_number), 1);
        assert!(app.checkout.current().is_none());
    }
}

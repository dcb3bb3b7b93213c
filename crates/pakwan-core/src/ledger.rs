//! # Order Ledger
//!
//! Order numbering, the two-phase checkout, and status transitions.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Two-Phase Checkout                                │
//! │                                                                         │
//! │  Cart ──► commit_order() ──► PendingOrder (ORD-007, counter now 8)     │
//! │                │                     │                                  │
//! │                │          ┌──────────┴──────────┐                       │
//! │                │          ▼                     ▼                       │
//! │                │    confirm_order()       PendingOrder::cancel()        │
//! │                │    ledger += ORD-007     ORD-007 is burned,            │
//! │                │    (no-op if present)    never reissued                │
//! │                ▼                                                        │
//! │   validation failure: nothing moves, counter untouched                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - The counter is incremented at the moment an id is handed out, before the
//!   order exists anywhere. Ids are never reused, gaps are acceptable.
//! - Appending is idempotent by id.
//! - Only `completed` orders may become `returned` or `deleted`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Dataset, MonthKey, Order, OrderId, OrderItem, OrderStatus};
use crate::validation::validate_required;

// =============================================================================
// Ledger
// =============================================================================

/// Append-only list of committed orders, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Ledger(Vec<Order>);

impl Ledger {
    pub fn new(orders: Vec<Order>) -> Self {
        Ledger(orders)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Order] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Order> {
        self.0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|o| o.id == id)
    }

    /// First record with this id.
    pub fn find(&self, id: &str) -> Option<&Order> {
        self.0.iter().find(|o| o.id == id)
    }

    /// Highest `ORD-NNN` number present, ignoring ids of other shapes.
    pub fn highest_sequence(&self) -> Option<u64> {
        self.0.iter().filter_map(Order::sequence_number).max()
    }

    /// Orders whose timestamp falls in `month`.
    pub fn in_month(&self, month: MonthKey) -> impl Iterator<Item = &Order> {
        self.0.iter().filter(move |o| o.month() == month)
    }

    /// Appends unless an order with the same id is already present.
    pub fn append(&mut self, order: Order) -> ConfirmOutcome {
        if self.contains(&order.id) {
            return ConfirmOutcome::AlreadyCommitted;
        }
        self.0.push(order);
        ConfirmOutcome::Appended
    }

    /// Moves every `completed` record with `id` to `status`.
    ///
    /// ## Rules
    /// - `status` must be `returned` or `deleted`
    /// - unknown id → `OrderNotFound`
    /// - first record not `completed` → `InvalidStatusTransition`
    /// - the matching timestamp field (`returnedAt`/`deletedAt`) is set to `at`
    ///
    /// ## Returns
    /// Number of records transitioned (more than 1 only for duplicated ids).
    pub fn set_status(
        &mut self,
        id: &str,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> CoreResult<usize> {
        if status == OrderStatus::Completed {
            return Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["returned".to_string(), "deleted".to_string()],
            }
            .into());
        }

        let current = self
            .find(id)
            .map(|o| o.status)
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;
        if current != OrderStatus::Completed {
            return Err(CoreError::InvalidStatusTransition {
                order_id: id.to_string(),
                current: current.to_string(),
            });
        }

        let mut changed = 0;
        for order in self
            .0
            .iter_mut()
            .filter(|o| o.id == id && o.status == OrderStatus::Completed)
        {
            order.status = status;
            match status {
                OrderStatus::Returned => order.returned_at = Some(at),
                OrderStatus::Deleted => order.deleted_at = Some(at),
                OrderStatus::Completed => {}
            }
            changed += 1;
        }
        Ok(changed)
    }

    /// Drops duplicated ids, keeping the LAST instance of each.
    /// Relative order of the surviving records is preserved.
    pub fn cleanup_duplicates(&mut self) -> DuplicateReport {
        let before = self.0.len();
        let mut seen = HashSet::new();
        let mut duplicate_ids = Vec::new();
        let mut kept = Vec::with_capacity(before);

        for order in self.0.drain(..).rev() {
            if seen.insert(order.id.clone()) {
                kept.push(order);
            } else if !duplicate_ids.contains(&order.id) {
                duplicate_ids.push(order.id);
            }
        }
        kept.reverse();
        duplicate_ids.reverse();
        self.0 = kept;

        DuplicateReport {
            removed: before - self.0.len(),
            duplicate_ids,
        }
    }
}

impl FromIterator<Order> for Ledger {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        Ledger(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of confirming a pending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// The order was new and is now in the ledger.
    Appended,
    /// An order with this id was already committed; nothing changed.
    AlreadyCommitted,
}

/// What `cleanup_duplicates` removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub removed: usize,
    pub duplicate_ids: Vec<OrderId>,
}

/// An order that has an id but is not yet in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingOrder(Order);

impl PendingOrder {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn order(&self) -> &Order {
        &self.0
    }

    /// Discards the order. The id stays consumed; it is returned for logging.
    pub fn cancel(self) -> OrderId {
        self.0.id
    }
}

// =============================================================================
// Sequencing
// =============================================================================

/// `ORD-` followed by the number left-padded to at least three digits.
///
/// ## Example
/// ```rust
/// use pakwan_core::ledger::format_order_id;
///
/// assert_eq!(format_order_id(7), "ORD-007");
/// assert_eq!(format_order_id(1234), "ORD-1234");
/// ```
pub fn format_order_id(number: u64) -> OrderId {
    format!("ORD-{:03}", number)
}

impl Dataset {
    /// Hands out the next order id and advances the counter.
    ///
    /// The increment happens here, before any order is built, so two
    /// checkouts can never observe the same number. Fails with
    /// `SequenceExhausted` rather than wrapping when the counter is at
    /// `u64::MAX`; the counter is left unchanged in that case.
    pub fn next_order_id(&mut self) -> CoreResult<OrderId> {
        let number = self.settings.next_order_number.max(1);
        let next = number
            .checked_add(1)
            .ok_or(CoreError::SequenceExhausted(number))?;
        self.settings.next_order_number = next;
        Ok(format_order_id(number))
    }

    /// Raises the counter past the highest `ORD-NNN` in the ledger.
    ///
    /// Never lowers it. Returns the new value when it moved.
    pub fn raise_sequence_to_ledger(&mut self) -> Option<u64> {
        let highest = self.orders.highest_sequence()?;
        if self.settings.next_order_number > highest || self.settings.next_order_number == u64::MAX {
            return None;
        }
        let next = highest.saturating_add(1);
        self.settings.next_order_number = next;
        Some(next)
    }

    /// Builds a pending order from the cart.
    ///
    /// ## Rules
    /// - Validation runs first; on failure the counter does not move
    /// - The id is consumed immediately (`next_order_id`)
    /// - `subtotal == total == cart.subtotal()`, `tax == 0`
    /// - The cart itself is not modified; it is cleared only after confirmation
    pub fn commit_order(
        &mut self,
        cart: &Cart,
        payment_method: &str,
        order_type: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<PendingOrder> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_required("paymentMethod", payment_method)?;
        validate_required("orderType", order_type)?;
        if !self.payment_methods.is_empty() && self.payment_method(payment_method).is_none() {
            return Err(CoreError::UnknownPaymentMethod(payment_method.to_string()));
        }
        if !self.order_types.is_empty() && self.order_type(order_type).is_none() {
            return Err(CoreError::UnknownOrderType(order_type.to_string()));
        }

        let id = self.next_order_id()?;
        let items: Vec<OrderItem> = cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                name: Some(line.name.clone()),
                quantity: line.quantity,
                price: line.price,
                category: (!line.category.is_empty()).then(|| line.category.clone()),
            })
            .collect();
        let subtotal = cart.subtotal();

        Ok(PendingOrder(Order {
            id,
            timestamp: now,
            items,
            subtotal,
            tax: crate::Money::zero(),
            total: subtotal,
            payment_method: payment_method.to_string(),
            order_type: order_type.to_string(),
            status: OrderStatus::Completed,
            returned_at: None,
            deleted_at: None,
        }))
    }

    /// Appends the pending order to the ledger (idempotent by id).
    ///
    /// After an append the counter is raised past the ledger, so an order
    /// staged against an earlier dataset cannot leave its number to be
    /// handed out again.
    pub fn confirm_order(&mut self, pending: PendingOrder) -> ConfirmOutcome {
        let outcome = self.orders.append(pending.0);
        if outcome == ConfirmOutcome::Appended {
            self.raise_sequence_to_ledger();
        }
        outcome
    }

    pub fn set_order_status(
        &mut self,
        id: &str,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> CoreResult<usize> {
        self.orders.set_status(id, status, at)
    }

    pub fn cleanup_duplicates(&mut self) -> DuplicateReport {
        self.orders.cleanup_duplicates()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_dataset;
    use crate::Money;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 13, 30, 0).unwrap()
    }

    fn cart_with(dataset: &Dataset, ids: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for id in ids {
            let product = dataset.product(id).unwrap().clone();
            let category = dataset.category(&product.category).cloned();
            cart.add(&product, category.as_ref()).unwrap();
        }
        cart
    }

    fn order(id: &str, total: i64) -> Order {
        Order {
            id: id.to_string(),
            timestamp: now(),
            items: vec![OrderItem {
                product_id: "chicken_biryani".to_string(),
                name: None,
                quantity: 1,
                price: Money::from_units(total),
                category: None,
            }],
            subtotal: Money::from_units(total),
            tax: Money::zero(),
            total: Money::from_units(total),
            payment_method: "cash".to_string(),
            order_type: "dinein".to_string(),
            status: OrderStatus::Completed,
            returned_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_format_order_id() {
        assert_eq!(format_order_id(1), "ORD-001");
        assert_eq!(format_order_id(42), "ORD-042");
        assert_eq!(format_order_id(999), "ORD-999");
        assert_eq!(format_order_id(1000), "ORD-1000");
    }

    #[test]
    fn test_next_order_id_increments_first() {
        let mut dataset = builtin_dataset();
        dataset.settings.next_order_number = 7;

        assert_eq!(dataset.next_order_id().unwrap(), "ORD-007");
        assert_eq!(dataset.settings.next_order_number, 8);
        assert_eq!(dataset.next_order_id().unwrap(), "ORD-008");
    }

    #[test]
    fn test_exhausted_counter_is_an_error_not_a_wrap() {
        let mut dataset = builtin_dataset();
        dataset.settings.next_order_number = u64::MAX;
        let cart = cart_with(&dataset, &["chicken_biryani"]);

        let err = dataset.commit_order(&cart, "cash", "dinein", now()).unwrap_err();
        assert!(matches!(err, CoreError::SequenceExhausted(n) if n == u64::MAX));
        assert_eq!(dataset.settings.next_order_number, u64::MAX);
    }

    #[test]
    fn test_confirm_raises_counter_past_appended_id() {
        let mut dataset = builtin_dataset();
        dataset.settings.next_order_number = 50;
        let cart = cart_with(&dataset, &["chicken_biryani"]);
        let pending = dataset.commit_order(&cart, "cash", "dinein", now()).unwrap();
        assert_eq!(pending.id(), "ORD-050");

        // the order lands in a ledger whose counter is behind it
        let mut other = builtin_dataset();
        other.settings.next_order_number = 49;
        assert_eq!(other.confirm_order(pending), ConfirmOutcome::Appended);
        assert_eq!(other.settings.next_order_number, 51);

        let next = other.commit_order(&cart, "cash", "dinein", now()).unwrap();
        assert_eq!(next.id(), "ORD-051");
    }

    #[test]
    fn test_commit_builds_consistent_order() {
        let mut dataset = builtin_dataset();
        let cart = cart_with(
            &dataset,
            &["chicken_biryani", "chicken_biryani", "mutton_karahi"],
        );

        let pending = dataset.commit_order(&cart, "cash", "dinein", now()).unwrap();
        let order = pending.order();

        assert_eq!(order.id, "ORD-001");
        assert_eq!(order.subtotal, Money::from_units(1190));
        assert_eq!(order.total, Money::from_units(1190));
        assert!(order.tax.is_zero());
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert!(order.is_consistent());
        assert_eq!(dataset.settings.next_order_number, 2);
        assert!(dataset.orders.is_empty());
    }

    #[test]
    fn test_cancel_burns_the_id() {
        let mut dataset = builtin_dataset();
        dataset.settings.next_order_number = 7;
        let cart = cart_with(&dataset, &["beef_biryani"]);

        let pending = dataset.commit_order(&cart, "card", "takeaway", now()).unwrap();
        assert_eq!(pending.id(), "ORD-007");
        assert_eq!(dataset.settings.next_order_number, 8);

        assert_eq!(pending.cancel(), "ORD-007");
        assert!(!dataset.orders.contains("ORD-007"));

        let next = dataset.commit_order(&cart, "card", "takeaway", now()).unwrap();
        assert_eq!(next.id(), "ORD-008");
    }

    #[test]
    fn test_confirm_is_idempotent() {
        let mut dataset = builtin_dataset();
        let cart = cart_with(&dataset, &["chicken_handi"]);
        let pending = dataset.commit_order(&cart, "cash", "dinein", now()).unwrap();

        assert_eq!(dataset.confirm_order(pending.clone()), ConfirmOutcome::Appended);
        assert_eq!(
            dataset.confirm_order(pending),
            ConfirmOutcome::AlreadyCommitted
        );
        assert_eq!(dataset.orders.len(), 1);
    }

    #[test]
    fn test_commit_validation_does_not_consume_id() {
        let mut dataset = builtin_dataset();
        let empty = Cart::new();
        assert!(matches!(
            dataset.commit_order(&empty, "cash", "dinein", now()),
            Err(CoreError::EmptyCart)
        ));

        let cart = cart_with(&dataset, &["chicken_biryani"]);
        assert!(matches!(
            dataset.commit_order(&cart, "", "dinein", now()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            dataset.commit_order(&cart, "bitcoin", "dinein", now()),
            Err(CoreError::UnknownPaymentMethod(_))
        ));
        assert!(matches!(
            dataset.commit_order(&cart, "cash", "drive_thru", now()),
            Err(CoreError::UnknownOrderType(_))
        ));

        assert_eq!(dataset.settings.next_order_number, 1);
    }

    #[test]
    fn test_set_status_transitions() {
        let mut ledger = Ledger::new(vec![order("ORD-001", 320), order("ORD-002", 550)]);

        let changed = ledger
            .set_status("ORD-001", OrderStatus::Returned, now())
            .unwrap();
        assert_eq!(changed, 1);
        let returned = ledger.find("ORD-001").unwrap();
        assert_eq!(returned.status, OrderStatus::Returned);
        assert_eq!(returned.returned_at, Some(now()));

        let err = ledger
            .set_status("ORD-001", OrderStatus::Deleted, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));

        let err = ledger
            .set_status("ORD-404", OrderStatus::Deleted, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::OrderNotFound(_)));

        let err = ledger
            .set_status("ORD-002", OrderStatus::Completed, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        ledger
            .set_status("ORD-002", OrderStatus::Deleted, now())
            .unwrap();
        assert!(ledger.find("ORD-002").unwrap().deleted_at.is_some());
    }

    #[test]
    fn test_set_status_updates_every_duplicate() {
        let mut ledger = Ledger::new(vec![order("ORD-004", 320), order("ORD-004", 320)]);
        let changed = ledger
            .set_status("ORD-004", OrderStatus::Returned, now())
            .unwrap();
        assert_eq!(changed, 2);
        assert!(ledger.iter().all(|o| o.status == OrderStatus::Returned));
    }

    #[test]
    fn test_cleanup_keeps_last_instance() {
        let mut ledger = Ledger::new(vec![
            order("ORD-001", 100),
            order("ORD-002", 200),
            order("ORD-001", 111),
            order("ORD-003", 300),
            order("ORD-002", 222),
        ]);

        let report = ledger.cleanup_duplicates();

        assert_eq!(report.removed, 2);
        assert_eq!(report.duplicate_ids, vec!["ORD-001", "ORD-002"]);
        let ids: Vec<_> = ledger.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["ORD-001", "ORD-003", "ORD-002"]);
        assert_eq!(ledger.find("ORD-001").unwrap().total, Money::from_units(111));
        assert_eq!(ledger.find("ORD-002").unwrap().total, Money::from_units(222));

        assert_eq!(ledger.cleanup_duplicates(), DuplicateReport::default());
    }

    #[test]
    fn test_raise_sequence_to_ledger() {
        let mut dataset = builtin_dataset();
        dataset.orders = Ledger::new(vec![order("ORD-012", 100), order("ORD-003", 100)]);
        dataset.settings.next_order_number = 5;

        assert_eq!(dataset.raise_sequence_to_ledger(), Some(13));
        assert_eq!(dataset.settings.next_order_number, 13);
        assert_eq!(dataset.raise_sequence_to_ledger(), None);

        dataset.settings.next_order_number = 40;
        assert_eq!(dataset.raise_sequence_to_ledger(), None);
        assert_eq!(dataset.settings.next_order_number, 40);
    }
}

//! # Cart
//!
//! The transient basket being rung up. Never persisted.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Tap product ───────────► add() ─────────────► qty += 1 or new line    │
//! │                                                                         │
//! │  Weigh & type price ────► add_custom_line() ─► new line, qty 1,        │
//! │                                                 synthetic "custom-" id  │
//! │                                                                         │
//! │  [+] / [-] ─────────────► adjust_quantity() ─► line removed at qty 0   │
//! │                                                                         │
//! │  Trash ─────────────────► remove_line()                                 │
//! │                                                                         │
//! │  Order confirmed ───────► clear()                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Catalog lines are unique by `product_id`
//! - Every line has `quantity >= 1`
//! - `subtotal() == Σ price × quantity`

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Category, Product, ProductId};
use crate::validation::{validate_positive_price, validate_quantity};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// Prefix of synthetic ids given to custom lines.
pub const CUSTOM_LINE_PREFIX: &str = "custom-";

/// A line in the cart.
///
/// Price, name and category are copied from the catalog when the line is
/// created, so later catalog edits do not change a basket in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub category: String,
    pub category_color: String,
}

impl CartLine {
    fn from_product(product: &Product, category: Option<&Category>) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            category: product.category.clone(),
            category_color: category.map(|c| c.color.clone()).unwrap_or_default(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }

    /// Ad-hoc lines created by `add_custom_line`.
    pub fn is_custom(&self) -> bool {
        self.product_id.starts_with(CUSTOM_LINE_PREFIX)
    }

    /// Measured amount a custom line represents (e.g. `0.75` kg).
    ///
    /// Back-calculated as `price / category.base_price`. `None` for catalog
    /// lines and for categories without a positive base price.
    pub fn measured_quantity(&self, category: &Category) -> Option<f64> {
        if !self.is_custom() || !category.unit.is_measured() {
            return None;
        }
        self.price.ratio_to(category.base_price)
    }
}

/// The cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds one unit of a catalog product.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity goes up by one, up to
    ///   [`MAX_ITEM_QUANTITY`]
    /// - Otherwise: a new line with quantity 1 is appended
    pub fn add(&mut self, product: &Product, category: Option<&Category>) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let quantity = line.quantity + 1;
            validate_quantity(quantity)?;
            line.quantity = quantity;
            return Ok(());
        }
        self.push(CartLine::from_product(product, category))
    }

    /// Adds a one-off line priced by hand, typically a weighed amount of a
    /// measured category.
    ///
    /// Custom lines never merge: each call creates a distinct line with a
    /// synthetic id that cannot collide with catalog ids.
    ///
    /// ## Returns
    /// The synthetic product id of the new line.
    pub fn add_custom_line(
        &mut self,
        category: &Category,
        manual_price: Money,
    ) -> CoreResult<ProductId> {
        validate_positive_price(manual_price)?;

        let id = format!("{}{}", CUSTOM_LINE_PREFIX, Uuid::new_v4().simple());
        let name = match manual_price.ratio_to(category.base_price) {
            Some(qty) if category.unit.is_measured() => {
                format!("{} ({:.3} {})", category.name, qty, category.unit.label())
            }
            _ => category.name.clone(),
        };
        self.push(CartLine {
            product_id: id.clone(),
            name,
            price: manual_price,
            quantity: 1,
            category: category.id.clone(),
            category_color: category.color.clone(),
        })?;
        Ok(id)
    }

    /// Changes the quantity of the line at `index` by `delta`.
    /// A result of zero or less removes the line; a result above
    /// [`MAX_ITEM_QUANTITY`] is rejected and the line is left as it was.
    pub fn adjust_quantity(&mut self, index: usize, delta: i64) -> CoreResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::CartLineNotFound { index })?;
        let quantity = line.quantity.checked_add(delta).unwrap_or(i64::MAX);
        if quantity <= 0 {
            self.lines.remove(index);
            return Ok(());
        }
        validate_quantity(quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::CartLineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ price × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Equal to the subtotal; orders carry no tax.
    pub fn total(&self) -> Money {
        self.subtotal()
    }

    fn push(&mut self, line: CartLine) -> CoreResult<()> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        self.lines.push(line);
        Ok(())
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            total: cart.total(),
        }
    }
}

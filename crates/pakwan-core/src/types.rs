//! # Domain Types
//!
//! The dataset document and everything inside it.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dataset (one JSON document)                     │
//! │                                                                         │
//! │  store ─────────► StoreInfo        name, address, receipt header/footer │
//! │  categories ────► [Category]       id, name, color, emoji, unit, base   │
//! │  products ──────► [Product]        id, name, category, price            │
//! │  orders ────────► Ledger           [Order { items: [OrderItem] }]       │
//! │  paymentMethods ► [PaymentMethod]  cash, card, easypaisa, jazzcash      │
//! │  orderTypes ────► [OrderType]      dinein, takeaway, delivery           │
//! │  settings ──────► Settings         nextOrderNumber + print options      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Field names are camelCase (`paymentMethod`, `nextOrderNumber`,
//! `returnedAt`) because the same document is read back from the local
//! cache and the remote store, including documents written by older
//! terminals. Unknown keys in `store` and `settings` are kept verbatim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::ledger::Ledger;
use crate::money::Money;

/// Category slug, e.g. `biryanis`.
pub type CategoryId = String;
/// Product slug, e.g. `chickenbiryani`.
pub type ProductId = String;
/// Sequential order number, e.g. `ORD-007`.
pub type OrderId = String;

// =============================================================================
// Catalog
// =============================================================================

/// Selling unit of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Sold by the piece (plates, naans, bottles).
    #[default]
    Pcs,
    Kg,
    Gram,
    Ml,
    Liter,
}

impl Unit {
    /// Everything except `pcs` is priced from a per-unit base price.
    pub fn is_measured(&self) -> bool {
        !matches!(self, Unit::Pcs)
    }

    /// Short label used next to quantities.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Pcs => "pcs",
            Unit::Kg => "kg",
            Unit::Gram => "g",
            Unit::Ml => "ml",
            Unit::Liter => "L",
        }
    }
}

/// A menu section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub unit: Unit,
    /// Price of one `unit`; only meaningful for measured units.
    #[serde(default)]
    pub base_price: Money,
}

/// A sellable menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: CategoryId,
    pub price: Money,
    /// Measured quantity the price was computed from (weighed categories).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Reference entry for the payment picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

/// Reference entry for the order-type picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle state of a committed order.
///
/// ```text
///            ┌──────────► returned
/// completed ─┤
///            └──────────► deleted
/// ```
/// Both targets are terminal. A record with no status is read as `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Completed,
    Returned,
    Deleted,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Returned => "returned",
            OrderStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of a committed order.
/// Snapshot pattern: price and labels are frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: i64,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// A committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    #[serde(default)]
    pub tax: Money,
    pub total: Money,
    pub payment_method: String,
    pub order_type: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub returned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Σ price × quantity over the items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// `items` non-empty, `tax == 0`, `subtotal == total == Σ line totals`.
    pub fn is_consistent(&self) -> bool {
        let expected = self.items_total();
        !self.items.is_empty()
            && self.tax.is_zero()
            && self.subtotal == expected
            && self.total == expected
    }

    /// Calendar month the order belongs to (its partition).
    pub fn month(&self) -> MonthKey {
        MonthKey::of(&self.timestamp)
    }

    /// Sequence number encoded in an `ORD-NNN` id, if it has that shape.
    pub fn sequence_number(&self) -> Option<u64> {
        self.id.strip_prefix("ORD-")?.parse().ok()
    }
}

// =============================================================================
// Month Partition Key
// =============================================================================

/// A `YYYY-MM` calendar month (UTC), used to partition the order ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `1 <= month <= 12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthKey { year, month })
    }

    pub fn of(timestamp: &DateTime<Utc>) -> Self {
        MonthKey {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("expected YYYY-MM, got '{}'", s),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Store & Settings
// =============================================================================

/// Receipt/letterhead information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_footer: Option<String>,
    /// Keys this version does not model, preserved on write-back.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Terminal settings. `next_order_number` is the order sequence counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub next_order_number: u64,
    pub currency: String,
    pub receipt_width: u32,
    pub auto_print: bool,
    pub show_tax: bool,
    pub thermal_width: u32,
    pub print_orientation: String,
    pub print_margin: u32,
    pub print_copies: u32,
    /// Keys this version does not model, preserved on write-back.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            next_order_number: 1,
            currency: "PKR".to_string(),
            receipt_width: 80,
            auto_print: false,
            show_tax: false,
            thermal_width: 80,
            print_orientation: "portrait".to_string(),
            print_margin: 0,
            print_copies: 1,
            extra: serde_json::Map::new(),
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// The whole persisted state of the terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub store: StoreInfo,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Ledger,
    pub payment_methods: Vec<PaymentMethod>,
    pub order_types: Vec<OrderType>,
    pub settings: Settings,
}

impl Dataset {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|m| m.id == id)
    }

    pub fn order_type(&self, id: &str) -> Option<&OrderType> {
        self.order_types.iter().find(|t| t.id == id)
    }

    /// True when there is nothing to sell from.
    pub fn catalog_is_empty(&self) -> bool {
        self.categories.is_empty() || self.products.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

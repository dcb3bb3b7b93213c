//! # Sales Reports
//!
//! Period filtering, the sales summary cards and the analytics rankings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders ──► Period::filter(now) ──┬──► SalesSummary                     │
//! │                                   │      revenue / count / average      │
//! │                                   │      returned count / amount        │
//! │                                   │                                     │
//! │                                   └──► Analytics (completed only)       │
//! │                                          top products by quantity (5)   │
//! │                                          revenue by item (5)            │
//! │                                          revenue by category (6)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Revenue only ever counts `completed` orders.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Dataset, Order, OrderStatus};

/// Entries shown in the "top products" and "revenue by item" lists.
pub const TOP_ITEMS: usize = 5;
/// Entries shown in the "revenue by category" list.
pub const TOP_CATEGORIES: usize = 6;

// =============================================================================
// Period
// =============================================================================

/// Reporting window, relative to "now" in the terminal's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Same calendar day as now.
    #[default]
    Today,
    /// The last 7 × 24 hours.
    Week,
    /// Since midnight of the same day one calendar month ago.
    Month,
    /// Since midnight of the same day one calendar year ago.
    Year,
    All,
}

impl Period {
    /// Whether an order placed at `timestamp` falls in this period.
    pub fn contains<Tz: TimeZone>(&self, timestamp: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let local = timestamp.with_timezone(&now.timezone());
        match self {
            Period::Today => local.date_naive() == now.date_naive(),
            Period::Week => *timestamp >= now.with_timezone(&Utc) - Duration::days(7),
            Period::Month => Self::since_months_ago(&local, now, 1),
            Period::Year => Self::since_months_ago(&local, now, 12),
            Period::All => true,
        }
    }

    fn since_months_ago<Tz: TimeZone>(local: &DateTime<Tz>, now: &DateTime<Tz>, months: u32) -> bool {
        let start = now
            .date_naive()
            .checked_sub_months(Months::new(months))
            .map(|d| d.and_time(NaiveTime::MIN));
        match start {
            Some(start) => local.naive_local() >= start,
            None => true,
        }
    }

    /// Orders inside the period, in ledger order.
    pub fn filter<'a, Tz: TimeZone>(
        &self,
        orders: impl IntoIterator<Item = &'a Order>,
        now: &DateTime<Tz>,
    ) -> Vec<&'a Order> {
        orders
            .into_iter()
            .filter(|o| self.contains(&o.timestamp, now))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: ["today", "week", "month", "year", "all"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// The sales summary cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub revenue: Money,
    pub order_count: usize,
    /// Revenue / order count, rounded half up. Zero without orders.
    pub average_order: Money,
    pub returned_count: usize,
    pub returned_amount: Money,
}

impl SalesSummary {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut revenue = Money::zero();
        let mut order_count = 0;
        let mut returned_amount = Money::zero();
        let mut returned_count = 0;

        for order in orders {
            match order.status {
                OrderStatus::Completed => {
                    revenue += order.total;
                    order_count += 1;
                }
                OrderStatus::Returned => {
                    returned_amount += order.total;
                    returned_count += 1;
                }
                OrderStatus::Deleted => {}
            }
        }

        SalesSummary {
            revenue,
            order_count,
            average_order: revenue.average_over(order_count),
            returned_count,
            returned_amount,
        }
    }
}

// =============================================================================
// Analytics
// =============================================================================

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Summary plus the three ranking lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub summary: SalesSummary,
    pub top_products: Vec<RankedEntry>,
    pub revenue_by_item: Vec<RankedEntry>,
    pub revenue_by_category: Vec<RankedEntry>,
}

/// Accumulates rows keyed by id, remembering first-seen order so ties rank
/// deterministically.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    rows: Vec<RankedEntry>,
}

impl Tally {
    fn add(&mut self, id: &str, name: &str, quantity: i64, revenue: Money) {
        match self.index.get(id) {
            Some(&i) => {
                self.rows[i].quantity += quantity;
                self.rows[i].revenue += revenue;
            }
            None => {
                self.index.insert(id.to_string(), self.rows.len());
                self.rows.push(RankedEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                    quantity,
                    revenue,
                });
            }
        }
    }

    fn top_by<K: Ord>(&self, limit: usize, key: impl Fn(&RankedEntry) -> K) -> Vec<RankedEntry> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        rows.truncate(limit);
        rows
    }
}

impl Analytics {
    /// Builds analytics for `orders` (already period-filtered).
    ///
    /// Item and category names come from the catalog, falling back to the
    /// snapshot stored on the order item; items with neither are skipped.
    pub fn compute<'a>(dataset: &Dataset, orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let orders: Vec<&Order> = orders.into_iter().collect();
        let summary = SalesSummary::from_orders(orders.iter().copied());

        let mut items = Tally::default();
        let mut categories = Tally::default();

        for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
            for item in &order.items {
                let product = dataset.product(&item.product_id);
                let name = product
                    .map(|p| p.name.as_str())
                    .or(item.name.as_deref());
                let Some(name) = name else { continue };
                let revenue = item.line_total();
                items.add(&item.product_id, name, item.quantity, revenue);

                let category_id = product
                    .map(|p| p.category.as_str())
                    .or(item.category.as_deref());
                if let Some(category_id) = category_id {
                    let category_name = dataset
                        .category(category_id)
                        .map(|c| c.name.as_str())
                        .unwrap_or("Unknown");
                    categories.add(category_id, category_name, item.quantity, revenue);
                }
            }
        }

        Analytics {
            summary,
            top_products: items.top_by(TOP_ITEMS, |r| r.quantity),
            revenue_by_item: items.top_by(TOP_ITEMS, |r| r.revenue),
            revenue_by_category: categories.top_by(TOP_CATEGORIES, |r| r.revenue),
        }
    }
}

/// Sales listing: the period's orders, newest first.
pub fn sales_listing<'a, Tz: TimeZone>(
    orders: impl IntoIterator<Item = &'a Order>,
    period: Period,
    now: &DateTime<Tz>,
) -> Vec<&'a Order> {
    let mut listed = period.filter(orders, now);
    listed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    listed
}

//! # Report Commands
//!
//! Read-only views over the ledger. Periods are evaluated on the
//! terminal's wall clock ([`ConfigState::local_time`]).

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use pakwan_core::{Analytics, Order, Period, SalesSummary};

use crate::state::{ConfigState, DatasetState};

/// The sales screen: summary cards plus the order list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesResponse {
    pub period: Period,
    pub summary: SalesSummary,
    /// Formatted revenue, e.g. "Rs. 12,450".
    pub revenue_display: String,
    pub orders: Vec<Order>,
}

pub fn sales_summary(
    dataset: &DatasetState,
    config: &ConfigState,
    period: Period,
    now: DateTime<Utc>,
) -> SalesResponse {
    debug!(period = %period, "sales_summary command");
    let orders = super::orders::list_orders(dataset, config, period, now);
    let summary = SalesSummary::from_orders(&orders);
    SalesResponse {
        period,
        revenue_display: config.format_money(summary.revenue),
        summary,
        orders,
    }
}

pub fn analytics(
    dataset: &DatasetState,
    config: &ConfigState,
    period: Period,
    now: DateTime<Utc>,
) -> Analytics {
    debug!(period = %period, "analytics command");
    let now = config.local_time(now);
    dataset.with_dataset(|d| Analytics::compute(d, period.filter(d.orders.iter(), &now)))
}

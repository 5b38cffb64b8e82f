//! Totals and display summaries computed from the ledger.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::catalog::Variant;
use crate::ledger::Ledger;
use crate::order::parse_timestamp;

/// Quantity per variant. Every variant is always present.
pub type VariantTotals = BTreeMap<Variant, i64>;

fn zeroed_totals() -> VariantTotals {
    Variant::ALL.into_iter().map(|v| (v, 0)).collect()
}

/// Sums every variant across all orders and sizes.
pub fn totals(ledger: &Ledger) -> VariantTotals {
    let mut totals = zeroed_totals();
    for order in ledger {
        for variant in Variant::ALL {
            let total = totals.entry(variant).or_insert(0);
            *total = total.saturating_add(order.total_for(variant));
        }
    }
    totals
}

/// Display row for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub timestamp: String,
    pub customer_name: String,
    pub total_per_variant: VariantTotals,
    pub total_overall: i64,
}

impl OrderSummary {
    pub fn total_for(&self, variant: Variant) -> i64 {
        self.total_per_variant.get(&variant).copied().unwrap_or(0)
    }
}

/// Per-order totals, most recent first.
pub fn summarize(ledger: &Ledger) -> Vec<OrderSummary> {
    let mut summaries: Vec<OrderSummary> = ledger
        .iter()
        .map(|order| {
            let total_per_variant: VariantTotals = Variant::ALL
                .into_iter()
                .map(|v| (v, order.total_for(v)))
                .collect();
            OrderSummary {
                timestamp: order.timestamp.clone(),
                customer_name: order.customer_name.clone(),
                total_overall: total_per_variant
                    .values()
                    .fold(0i64, |acc, total| acc.saturating_add(*total)),
                total_per_variant,
            }
        })
        .collect();

    sort_newest_first(&mut summaries, |s| s.timestamp.as_str());
    summaries
}

/// Stable sort by ledger timestamp, newest first.
///
/// Empty or malformed timestamps compare as the earliest instant, so those
/// entries end up last. Entries with equal timestamps keep their order.
pub fn sort_newest_first<T, F>(items: &mut [T], timestamp: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| {
        Reverse(parse_timestamp(timestamp(item)).unwrap_or(NaiveDateTime::MIN))
    });
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub orders: Vec<OrderSummary>,
    pub totals: VariantTotals,
    pub order_count: usize,
}

impl Dashboard {
    pub fn build(ledger: &Ledger) -> Self {
        let orders = summarize(ledger);
        Self {
            order_count: orders.len(),
            totals: totals(ledger),
            orders,
        }
    }

    pub fn total_for(&self, variant: Variant) -> i64 {
        self.totals.get(&variant).copied().unwrap_or(0)
    }
}

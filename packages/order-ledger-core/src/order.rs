//! Order records.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::catalog::Variant;

/// Wall-clock format stored in the `Timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Formats a wall-clock time the way the ledger stores it.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time in ledger format.
pub fn now_timestamp() -> String {
    format_timestamp(Local::now().naive_local())
}

/// Largest quantity accepted in one cell.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;
/// Smallest quantity accepted in one cell.
pub const MIN_QUANTITY: i64 = i32::MIN as i64;

/// Keeps a cell quantity inside `MIN_QUANTITY..=MAX_QUANTITY`; anything
/// outside reads as 0, like any other unusable value.
pub fn normalize_quantity(quantity: i64) -> i64 {
    if (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        quantity
    } else {
        0
    }
}

/// Parses a ledger timestamp; `None` for empty or malformed values.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

/// One row of the shared ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub timestamp: String,
    pub customer_name: String,
    quantities: BTreeMap<(Variant, u16), i64>,
}

impl Order {
    pub fn new(timestamp: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            customer_name: customer_name.into(),
            quantities: BTreeMap::new(),
        }
    }

    pub fn with_quantity(mut self, variant: Variant, size: u16, quantity: i64) -> Self {
        self.set_quantity(variant, size, quantity);
        self
    }

    pub fn set_quantity(&mut self, variant: Variant, size: u16, quantity: i64) {
        self.quantities.insert((variant, size), quantity);
    }

    /// Quantity for one (variant, size) cell; absent cells count as zero.
    pub fn quantity(&self, variant: Variant, size: u16) -> i64 {
        self.quantities.get(&(variant, size)).copied().unwrap_or(0)
    }

    /// Sum of every size of `variant`.
    pub fn total_for(&self, variant: Variant) -> i64 {
        self.quantities
            .iter()
            .filter(|((v, _), _)| *v == variant)
            .fold(0i64, |acc, (_, quantity)| acc.saturating_add(*quantity))
    }

    /// Sum across every variant and size.
    pub fn total(&self) -> i64 {
        self.quantities
            .values()
            .fold(0i64, |acc, quantity| acc.saturating_add(*quantity))
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

/// A single-item order written to its own file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOrder {
    pub timestamp: String,
    pub customer_name: String,
    pub variant: Variant,
    pub size: u16,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_timestamp_format_round_trip() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let formatted = format_timestamp(at);
        assert_eq!(formatted, "09/03/2024 07:05:01");
        assert_eq!(parse_timestamp(&formatted), Some(at));
    }

    #[test]
    fn test_parse_timestamp_rejects_other_formats() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("2024-03-09 07:05:01"), None);
        assert_eq!(parse_timestamp("31/02/2024 10:00:00"), None);
    }

    #[test]
    fn test_order_totals() {
        let order = Order::new("01/01/2024 10:00:00", "Ana")
            .with_quantity(Variant::Azul, 36, 3)
            .with_quantity(Variant::Azul, 40, 2)
            .with_quantity(Variant::Preta, 38, 4);

        assert_eq!(order.quantity(Variant::Azul, 36), 3);
        assert_eq!(order.quantity(Variant::Preta, 36), 0);
        assert_eq!(order.total_for(Variant::Azul), 5);
        assert_eq!(order.total_for(Variant::Preta), 4);
        assert_eq!(order.total(), 9);
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize_quantity(MAX_QUANTITY), MAX_QUANTITY);
        assert_eq!(normalize_quantity(MIN_QUANTITY), MIN_QUANTITY);
        assert_eq!(normalize_quantity(MAX_QUANTITY + 1), 0);
        assert_eq!(normalize_quantity(i64::MIN), 0);
    }

    #[test]
    fn test_order_totals_saturate() {
        let order = Order::new("01/01/2024 10:00:00", "Ana")
            .with_quantity(Variant::Azul, 36, i64::MAX)
            .with_quantity(Variant::Azul, 38, 1)
            .with_quantity(Variant::Preta, 36, 1);

        assert_eq!(order.total_for(Variant::Azul), i64::MAX);
        assert_eq!(order.total(), i64::MAX);
    }
}

//! Column layout of the ledger file.

use csv::StringRecord;

use crate::catalog::{SizeCatalog, Variant};
use crate::order::{normalize_quantity, Order};

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const CUSTOMER_COLUMN: &str = "Nome do Cliente";

/// Header layout shared by the read and write paths.
///
/// Columns are `Timestamp`, `Nome do Cliente`, then `Azul_<size>` and
/// `Preta_<size>` for every catalog size in order.
#[derive(Debug, Clone)]
pub struct LedgerSchema {
    catalog: SizeCatalog,
}

impl LedgerSchema {
    pub fn new(catalog: SizeCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SizeCatalog {
        &self.catalog
    }

    pub fn column_name(variant: Variant, size: u16) -> String {
        format!("{}_{}", variant.column_prefix(), size)
    }

    fn quantity_cells(&self) -> impl Iterator<Item = (Variant, u16)> + '_ {
        self.catalog
            .sizes()
            .iter()
            .flat_map(|&size| Variant::ALL.into_iter().map(move |v| (v, size)))
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![TIMESTAMP_COLUMN.to_string(), CUSTOMER_COLUMN.to_string()];
        headers.extend(self.quantity_cells().map(|(v, s)| Self::column_name(v, s)));
        headers
    }

    pub fn encode_row(&self, order: &Order) -> Vec<String> {
        let mut row = vec![order.timestamp.clone(), order.customer_name.clone()];
        row.extend(
            self.quantity_cells()
                .map(|(v, s)| order.quantity(v, s).to_string()),
        );
        row
    }

    /// Maps the columns found in a file header onto the schema.
    ///
    /// Missing columns are tolerated; unknown ones are ignored.
    pub fn resolve(&self, headers: &StringRecord) -> ColumnIndex {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        ColumnIndex {
            timestamp: position(TIMESTAMP_COLUMN),
            customer: position(CUSTOMER_COLUMN),
            quantities: self
                .quantity_cells()
                .filter_map(|(v, s)| position(&Self::column_name(v, s)).map(|i| (v, s, i)))
                .collect(),
        }
    }
}

/// Column positions resolved against one file header.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    timestamp: Option<usize>,
    customer: Option<usize>,
    quantities: Vec<(Variant, u16, usize)>,
}

impl ColumnIndex {
    pub fn decode_row(&self, record: &StringRecord) -> Order {
        let text = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let mut order = Order::new(text(self.timestamp), text(self.customer));
        for &(variant, size, index) in &self.quantities {
            order.set_quantity(variant, size, parse_cell(record.get(index)));
        }
        order
    }
}

/// Quantity cell; empty, non-numeric and out-of-range cells are zero.
///
/// Spreadsheet exports sometimes write whole numbers as `3.0`, so a
/// finite float is truncated.
fn parse_cell(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(value) = raw.parse::<i64>() {
        return normalize_quantity(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => normalize_quantity(value.trunc() as i64),
        _ => 0,
    }
}

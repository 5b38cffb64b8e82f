//! Normalization of submitted order forms.

use std::collections::HashMap;

use crate::catalog::{SizeCatalog, Variant};
use crate::error::SubmissionError;
use crate::order::{normalize_quantity, ItemOrder, Order};

/// Customer name field, shared by both forms.
pub const NAME_FIELD: &str = "nome";
/// Colour field of the single-item form.
pub const COLOR_FIELD: &str = "cor";
/// Size field of the single-item form.
pub const SIZE_FIELD: &str = "tamanho";
/// Quantity field of the single-item form.
pub const QUANTITY_FIELD: &str = "quantidade";

/// Decoded form body: field name to first submitted value.
pub type FormFields = HashMap<String, String>;

/// Parses a quantity field permissively.
///
/// Missing, empty, unparseable and out-of-range values become 0. Negative
/// integers are kept as submitted.
pub fn parse_quantity(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
        .map(normalize_quantity)
        .unwrap_or(0)
}

/// Trimmed customer name, rejecting blanks.
pub fn customer_name(fields: &FormFields) -> Result<String, SubmissionError> {
    let name = fields.get(NAME_FIELD).map(|s| s.trim()).unwrap_or_default();
    if name.is_empty() {
        return Err(SubmissionError::MissingCustomerName);
    }
    Ok(name.to_string())
}

/// Builds a ledger order from the per-size form.
pub fn build_order(
    fields: &FormFields,
    catalog: &SizeCatalog,
    timestamp: String,
) -> Result<Order, SubmissionError> {
    let mut order = Order::new(timestamp, customer_name(fields)?);
    for &size in catalog.sizes() {
        for variant in Variant::ALL {
            let raw = fields.get(&variant.field_name(size)).map(String::as_str);
            order.set_quantity(variant, size, parse_quantity(raw));
        }
    }
    Ok(order)
}

/// Builds a single-item order from the (colour, size, quantity) form.
pub fn build_item_order(
    fields: &FormFields,
    catalog: &SizeCatalog,
    timestamp: String,
) -> Result<ItemOrder, SubmissionError> {
    let customer_name = customer_name(fields)?;

    let raw_color = fields.get(COLOR_FIELD).map(String::as_str).unwrap_or("");
    let variant: Variant = raw_color
        .parse()
        .map_err(|_| SubmissionError::UnknownVariant(raw_color.trim().to_string()))?;

    let raw_size = fields.get(SIZE_FIELD).map(String::as_str).unwrap_or("");
    let size = catalog
        .parse_size(raw_size)
        .ok_or_else(|| SubmissionError::UnknownSize(raw_size.trim().to_string()))?;

    Ok(ItemOrder {
        timestamp,
        customer_name,
        variant,
        size,
        quantity: parse_quantity(fields.get(QUANTITY_FIELD).map(String::as_str)),
    })
}

//! Form submission through to the dashboard figures.

use std::collections::HashMap;

use tempfile::tempdir;

use order_ledger_core::aggregate::Dashboard;
use order_ledger_core::error::SubmissionError;
use order_ledger_core::submission::build_order;
use order_ledger_core::{SizeCatalog, Variant};

use super::helpers::store_in;

fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_single_submission_reaches_dashboard() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());
    let catalog = SizeCatalog::ledger();

    let order = build_order(
        &form(&[("nome", "Ana"), ("azul_36", "3")]),
        &catalog,
        "15/06/2024 14:00:00".to_string(),
    )
    .unwrap();
    store.append(&order).unwrap();

    let ledger = store.load();
    assert_eq!(ledger.len(), 1);
    let row = ledger.last().unwrap();
    assert_eq!(row.quantity(Variant::Azul, 36), 3);
    for &size in catalog.sizes() {
        assert_eq!(row.quantity(Variant::Preta, size), 0);
        if size != 36 {
            assert_eq!(row.quantity(Variant::Azul, size), 0);
        }
    }

    let dashboard = Dashboard::build(&ledger);
    assert_eq!(dashboard.total_for(Variant::Azul), 3);
    assert_eq!(dashboard.total_for(Variant::Preta), 0);
    assert_eq!(dashboard.order_count, 1);
}

#[test]
fn test_rejected_submission_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());

    let result = build_order(
        &form(&[("nome", ""), ("azul_36", "3")]),
        &SizeCatalog::ledger(),
        "15/06/2024 14:00:00".to_string(),
    );
    assert_eq!(result, Err(SubmissionError::MissingCustomerName));
    assert!(!store.exists());
    assert_eq!(Dashboard::build(&store.load()).order_count, 0);
}

#[test]
fn test_dashboard_lists_newest_first() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());
    let catalog = SizeCatalog::ledger();

    for (name, at) in [
        ("primeiro", "01/06/2024 09:00:00"),
        ("terceiro", "03/06/2024 09:00:00"),
        ("segundo", "02/06/2024 09:00:00"),
    ] {
        let order = build_order(
            &form(&[("nome", name), ("preta_40", "1")]),
            &catalog,
            at.to_string(),
        )
        .unwrap();
        store.append(&order).unwrap();
    }

    let dashboard = Dashboard::build(&store.load());
    let names: Vec<_> = dashboard
        .orders
        .iter()
        .map(|s| s.customer_name.as_str())
        .collect();
    assert_eq!(names, vec!["terceiro", "segundo", "primeiro"]);
    assert_eq!(dashboard.total_for(Variant::Preta), 3);
}

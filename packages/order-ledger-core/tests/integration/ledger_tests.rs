//! Ledger persistence and totals across many appends.

use std::fs;

use ntest::timeout;
use rand::Rng;
use tempfile::tempdir;

use order_ledger_core::aggregate::{summarize, totals};
use order_ledger_core::order::{format_timestamp, Order};
use order_ledger_core::{SizeCatalog, Variant};

use super::helpers::store_in;

fn random_order(rng: &mut impl Rng, index: usize) -> Order {
    let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(rng.gen_range(0..100_000));

    let mut order = Order::new(format_timestamp(at), format!("Cliente {}", index));
    for &size in SizeCatalog::ledger().sizes() {
        for variant in Variant::ALL {
            order.set_quantity(variant, size, rng.gen_range(0..5));
        }
    }
    order
}

#[timeout(5000)]
#[test]
fn test_append_then_load_returns_last_order() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());
    let mut rng = rand::thread_rng();

    for i in 0..20 {
        let order = random_order(&mut rng, i);
        store.append(&order).unwrap();

        let ledger = store.load();
        assert_eq!(ledger.len(), i + 1);
        assert_eq!(ledger.last(), Some(&order));
    }
}

#[timeout(5000)]
#[test]
fn test_totals_match_sum_of_appended_quantities() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());
    let mut rng = rand::thread_rng();

    let mut expected_azul = 0;
    let mut expected_preta = 0;
    for i in 0..30 {
        let order = random_order(&mut rng, i);
        expected_azul += order.total_for(Variant::Azul);
        expected_preta += order.total_for(Variant::Preta);
        store.append(&order).unwrap();
    }

    let ledger = store.load();
    let totals = totals(&ledger);
    assert_eq!(totals[&Variant::Azul], expected_azul);
    assert_eq!(totals[&Variant::Preta], expected_preta);

    let summaries = summarize(&ledger);
    assert_eq!(summaries.len(), 30);
    let overall: i64 = summaries.iter().map(|s| s.total_overall).sum();
    assert_eq!(overall, expected_azul + expected_preta);
}

#[test]
fn test_hand_edited_ledger_is_read_leniently() {
    let temp_dir = tempdir().unwrap();
    let store = store_in(temp_dir.path());

    // Columns out of order, one unknown column, most sizes missing and a
    // blank cell.
    fs::write(
        store.path(),
        "Nome do Cliente,Timestamp,Observacao,Preta_38,Azul_36\n\
         Ana,01/03/2024 10:00:00,urgente,2,\n\
         Bia,,,,4.0\n",
    )
    .unwrap();

    let ledger = store.load();
    assert_eq!(ledger.len(), 2);

    let ana = &ledger.orders()[0];
    assert_eq!(ana.customer_name, "Ana");
    assert_eq!(ana.quantity(Variant::Preta, 38), 2);
    assert_eq!(ana.quantity(Variant::Azul, 36), 0);

    let bia = &ledger.orders()[1];
    assert_eq!(bia.timestamp, "");
    assert_eq!(bia.quantity(Variant::Azul, 36), 4);

    // Rewriting normalizes the file to the full column layout.
    store.append(&Order::new("02/03/2024 10:00:00", "Caio")).unwrap();
    let header = fs::read_to_string(store.path())
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, store.schema().headers().join(","));
    assert_eq!(store.load().len(), 3);
}

//! File-backed stores for the shared ledger and per-customer order files.

pub mod io_utils;
pub mod ledger_store;
pub mod order_files;
pub mod schema;

pub use ledger_store::LedgerStore;
pub use order_files::{OrderFile, OrderFileStore};
pub use schema::LedgerSchema;

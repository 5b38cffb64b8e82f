//! Integration tests for the ledger store and aggregation.
//!
//! 1. Append and reload through the CSV file
//! 2. Totals over many appended orders
//! 3. Order submission end to end

pub mod end_to_end_tests;
pub mod helpers;
pub mod ledger_tests;

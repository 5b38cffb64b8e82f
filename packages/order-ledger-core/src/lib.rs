//! Core model and storage for the order intake ledger.
//!
//! Provides the variant and size catalogs, order records, CSV-backed
//! persistence, form normalization and the totals shown to administrators.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod order;
pub mod persistence;
pub mod submission;

pub use catalog::{SizeCatalog, Variant};
pub use ledger::Ledger;
pub use order::{ItemOrder, Order};

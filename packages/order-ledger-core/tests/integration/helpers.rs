//! Shared fixtures for integration tests.

use std::path::Path;

use order_ledger_core::config::LedgerConfig;
use order_ledger_core::persistence::LedgerStore;

/// Configuration rooted at a temporary directory, without retry delays.
pub fn config_in(dir: &Path) -> LedgerConfig {
    LedgerConfig {
        data_dir: dir.to_path_buf(),
        persistence_retry_delay_ms: 0,
        ..Default::default()
    }
}

pub fn store_in(dir: &Path) -> LedgerStore {
    LedgerStore::new(&config_in(dir))
}

//! Ledger service configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::SizeCatalog;

/// Which order flow the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    /// Per-size quantities for every variant appended to one shared ledger.
    #[default]
    Ledger,
    /// One (variant, size, quantity) item per submission, one file per order.
    PerCustomer,
}

impl OrderMode {
    /// Size catalog offered by this mode's form.
    pub fn catalog(self) -> SizeCatalog {
        match self {
            OrderMode::Ledger => SizeCatalog::ledger(),
            OrderMode::PerCustomer => SizeCatalog::item(),
        }
    }
}

impl FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ledger" => Ok(OrderMode::Ledger),
            "per-customer" => Ok(OrderMode::PerCustomer),
            other => Err(format!(
                "unknown mode '{}' (expected 'ledger' or 'per-customer')",
                other
            )),
        }
    }
}

/// Ledger service configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Data directory for persistence
    pub data_dir: PathBuf,
    /// Ledger file name inside `data_dir`
    pub ledger_file: String,
    /// Per-customer order directory name inside `data_dir`
    pub orders_dir: String,
    /// Active order flow
    pub mode: OrderMode,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Writer reply timeout in milliseconds
    pub response_timeout_ms: u64,
    /// Maximum accepted form body in bytes
    pub max_form_bytes: usize,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
    /// Capacity of the writer request channel
    pub writer_queue_capacity: usize,
    /// Lifetime of an admin session cookie in seconds
    pub session_max_age_secs: u64,
}

impl LedgerConfig {
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_dir)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            ledger_file: "pedidos.csv".to_string(),
            orders_dir: "pedidos".to_string(),
            mode: OrderMode::Ledger,
            request_timeout_ms: 5000,   // 5 seconds default
            response_timeout_ms: 10000, // 10 seconds default
            max_form_bytes: 64 * 1024,
            persistence_max_retries: 3,
            persistence_retry_delay_ms: 100,
            writer_queue_capacity: 256,
            session_max_age_secs: 8 * 60 * 60,
        }
    }
}

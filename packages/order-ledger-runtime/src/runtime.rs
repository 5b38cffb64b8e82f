//! Writer loop owning the ledger and order-file stores.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use order_ledger_core::config::LedgerConfig;
use order_ledger_core::error::LedgerError;
use order_ledger_core::persistence::{LedgerStore, OrderFileStore};
use tokio::sync::mpsc;

use crate::write_request::WriteRequest;
use crate::Result;

/// Counters kept by the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub appended_orders: u64,
    pub item_orders: u64,
    pub failed_writes: u64,
    /// Requests whose caller stopped waiting before the reply was sent
    pub abandoned_replies: u64,
}

/// Single writer draining the request channel.
pub struct Runtime {
    ledger: LedgerStore,
    order_files: OrderFileStore,
    rx: mpsc::Receiver<WriteRequest>,
    stats: WriterStats,
    last_stats_log: Instant,
}

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(60);

impl Runtime {
    pub fn new(config: &LedgerConfig, rx: mpsc::Receiver<WriteRequest>) -> Self {
        Self::with_stores(LedgerStore::new(config), OrderFileStore::new(config), rx)
    }

    pub fn with_stores(
        ledger: LedgerStore,
        order_files: OrderFileStore,
        rx: mpsc::Receiver<WriteRequest>,
    ) -> Self {
        Self {
            ledger,
            order_files,
            rx,
            stats: WriterStats::default(),
            last_stats_log: Instant::now(),
        }
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Processes requests until every sender is dropped (blocking).
    ///
    /// Must run on a plain thread, not inside an async task.
    pub fn run(&mut self) -> WriterStats {
        tracing::info!("Ledger writer started for {}", self.ledger.path().display());
        while let Some(request) = self.rx.blocking_recv() {
            self.handle(request);
            if self.last_stats_log.elapsed() > STATS_LOG_INTERVAL {
                tracing::info!("Writer metrics: {:?}", self.stats);
                self.last_stats_log = Instant::now();
            }
        }
        tracing::info!("Ledger writer stopped: {:?}", self.stats);
        self.stats
    }

    /// Processes every request already queued without blocking.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(request) = self.rx.try_recv() {
            self.handle(request);
            processed += 1;
        }
        processed
    }

    /// Executes one request and replies to its sender.
    pub fn handle(&mut self, request: WriteRequest) {
        let kind = request.kind();
        let replied = match request {
            WriteRequest::AppendOrder { order, response } => {
                let ledger = &self.ledger;
                let result = isolate_panics(kind, || ledger.append(&order));
                match &result {
                    Ok(()) => {
                        self.stats.appended_orders += 1;
                        tracing::info!(
                            customer = %order.customer_name,
                            total = order.total(),
                            "Order appended to ledger"
                        );
                    }
                    Err(e) => {
                        self.stats.failed_writes += 1;
                        tracing::error!("Failed to append order: {}", e);
                    }
                }
                response.send(result).is_ok()
            }
            WriteRequest::WriteItemOrder { order, response } => {
                let order_files = &self.order_files;
                let result = isolate_panics(kind, || order_files.write(&order));
                match &result {
                    Ok(file_name) => {
                        self.stats.item_orders += 1;
                        tracing::info!(
                            customer = %order.customer_name,
                            file = %file_name,
                            "Item order written"
                        );
                    }
                    Err(e) => {
                        self.stats.failed_writes += 1;
                        tracing::error!("Failed to write item order: {}", e);
                    }
                }
                response.send(result).is_ok()
            }
        };

        if !replied {
            self.stats.abandoned_replies += 1;
            tracing::debug!("Caller dropped before {} completed", kind);
        }
    }
}

/// Runs one write, turning a panic into an error reply so the writer
/// keeps serving later requests.
fn isolate_panics<T>(kind: &str, write: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(write)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!("Writer panicked during {}: {}", kind, message);
        Err(LedgerError::WriterFailure(format!("{} panicked: {}", kind, message)))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

//! Async handle used by request handlers to reach the writer.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use order_ledger_core::config::LedgerConfig;
use order_ledger_core::error::LedgerError;
use order_ledger_core::{ItemOrder, Order};
use tokio::sync::{mpsc, oneshot};
use tokio::time;

use crate::runtime::{Runtime, WriterStats};
use crate::write_request::WriteRequest;
use crate::Result;

/// Cloneable sender side of the writer channel.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<WriteRequest>,
    response_timeout: Duration,
}

impl WriterHandle {
    pub fn new(tx: mpsc::Sender<WriteRequest>, response_timeout: Duration) -> Self {
        Self {
            tx,
            response_timeout,
        }
    }

    /// Appends an order to the shared ledger.
    pub async fn append_order(&self, order: Order) -> Result<()> {
        let (response, rx) = oneshot::channel();
        self.submit(WriteRequest::AppendOrder { order, response }, rx)
            .await
    }

    /// Writes a single-item order file and returns its name.
    pub async fn write_item_order(&self, order: ItemOrder) -> Result<String> {
        let (response, rx) = oneshot::channel();
        self.submit(WriteRequest::WriteItemOrder { order, response }, rx)
            .await
    }

    async fn submit<T>(&self, request: WriteRequest, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.tx
            .send(request)
            .await
            .map_err(|e| LedgerError::WriterUnavailable(format!("channel closed: {}", e)))?;

        time::timeout(self.response_timeout, rx)
            .await
            .map_err(|_| LedgerError::Timeout)?
            .map_err(|e| LedgerError::WriterUnavailable(format!("reply dropped: {}", e)))?
    }
}

/// Starts the writer on its own thread.
///
/// The thread exits once every [`WriterHandle`] clone has been dropped.
pub fn spawn(config: &LedgerConfig) -> std::io::Result<(WriterHandle, JoinHandle<WriterStats>)> {
    let (tx, rx) = mpsc::channel(config.writer_queue_capacity.max(1));
    let mut runtime = Runtime::new(config, rx);
    let join = thread::Builder::new()
        .name("ledger-writer".to_string())
        .spawn(move || runtime.run())?;
    let handle = WriterHandle::new(tx, Duration::from_millis(config.response_timeout_ms));
    Ok((handle, join))
}

//! Single-writer runtime for ledger and order-file writes.
//!
//! HTTP handlers never touch the files on the write path themselves. They
//! send a [`WriteRequest`] over a bounded channel to one writer thread that
//! owns the stores, so concurrent submissions cannot lose each other's rows.

use order_ledger_core::error::LedgerError;
use tokio::sync::oneshot;

mod handle;
mod runtime;
mod write_request;

pub use handle::{spawn, WriterHandle};
pub use runtime::{Runtime, WriterStats};
pub use write_request::WriteRequest;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Reply channel carried by every write request
pub type ResponseSender<T> = oneshot::Sender<Result<T>>;

//! Requests accepted by the writer.

use order_ledger_core::{ItemOrder, Order};

use crate::ResponseSender;

/// Write request from the HTTP layer
#[derive(Debug)]
pub enum WriteRequest {
    /// Append one order to the shared ledger
    AppendOrder {
        order: Order,
        response: ResponseSender<()>,
    },
    /// Store one single-item order in its own file; replies with the file name
    WriteItemOrder {
        order: ItemOrder,
        response: ResponseSender<String>,
    },
}

impl WriteRequest {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WriteRequest::AppendOrder { .. } => "append_order",
            WriteRequest::WriteItemOrder { .. } => "write_item_order",
        }
    }
}

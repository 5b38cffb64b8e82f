//! Ledger error types.

use thiserror::Error;

/// Ledger and order-file operation errors.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// CSV encoding or decoding failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// Requested order file name is not a plain file name inside the store
    #[error("Invalid order file name '{0}'")]
    InvalidFileName(String),

    /// The single writer has stopped accepting requests
    #[error("Ledger writer unavailable: {0}")]
    WriterUnavailable(String),

    /// A write aborted unexpectedly inside the writer
    #[error("Writer failure: {0}")]
    WriterFailure(String),

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),
}

/// Submission validation errors.
///
/// These never reach the customer as messages; the form handlers turn every
/// variant into a redirect back to the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("customer name is required")]
    MissingCustomerName,

    #[error("unknown colour '{0}'")]
    UnknownVariant(String),

    #[error("size '{0}' is not offered")]
    UnknownSize(String),
}

//! I/O helpers shared by the ledger and order-file stores.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::LedgerError;

/// Classifies I/O errors into specific LedgerError variants.
pub fn classify_io_error(error: std::io::Error, context: &str) -> LedgerError {
    match error.kind() {
        ErrorKind::StorageFull | ErrorKind::OutOfMemory => {
            LedgerError::DiskFull(format!("{}: {}", context, error))
        }
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
            LedgerError::TransientIoError(format!("{}: {}", context, error))
        }
        _ => LedgerError::IoError(format!("{}: {}", context, error)),
    }
}

/// Retry settings for write paths.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Runs `operation`, retrying only transient I/O errors.
pub fn retry_io_operation<F, T>(
    mut operation: F,
    policy: RetryPolicy,
    context: &str,
) -> Result<T, LedgerError>
where
    F: FnMut() -> Result<T, LedgerError>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(LedgerError::TransientIoError(msg)) if attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Transient I/O error in {} (attempt {}/{}): {}",
                    context,
                    attempt,
                    policy.max_retries,
                    msg
                );
                if policy.retry_delay_ms > 0 {
                    std::thread::sleep(std::time::Duration::from_millis(policy.retry_delay_ms));
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// Replaces `target` with `contents` via a synced sibling temp file and a rename.
///
/// Readers see either the previous file or the complete new one.
pub fn write_atomically(target: &Path, contents: &[u8]) -> Result<(), LedgerError> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;
    }

    let file_name = target
        .file_name()
        .ok_or_else(|| LedgerError::IoError(format!("Not a file path: {}", target.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = target.with_file_name(temp_name);

    let mut file =
        File::create(&temp_path).map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
    file.write_all(contents)
        .map_err(|e| classify_io_error(e, "Failed to write temp file"))?;
    file.sync_all()
        .map_err(|e| classify_io_error(e, "Failed to sync temp file"))?;

    fs::rename(&temp_path, target).map_err(|e| classify_io_error(e, "Failed to rename temp file"))
}

/// Reads a whole file, mapping a missing file to `None`.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, LedgerError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(classify_io_error(e, "Failed to read file")),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tempfile::tempdir;

    use super::*;

    const NO_DELAY: RetryPolicy = RetryPolicy {
        max_retries: 2,
        retry_delay_ms: 0,
    };

    #[test]
    fn test_classify_io_error() {
        let err = classify_io_error(std::io::Error::from(ErrorKind::TimedOut), "ctx");
        assert!(matches!(err, LedgerError::TransientIoError(_)));

        let err = classify_io_error(std::io::Error::from(ErrorKind::PermissionDenied), "ctx");
        assert!(matches!(err, LedgerError::IoError(msg) if msg.starts_with("ctx")));
    }

    #[test]
    fn test_retry_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry_io_operation(
            || {
                calls.set(calls.get() + 1);
                Err(LedgerError::TransientIoError("busy".to_string()))
            },
            NO_DELAY,
            "test",
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_does_not_repeat_permanent_errors() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry_io_operation(
            || {
                calls.set(calls.get() + 1);
                Err(LedgerError::IoError("denied".to_string()))
            },
            NO_DELAY,
            "test",
        );
        assert!(matches!(result, Err(LedgerError::IoError(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_retry_recovers_from_transient_error() {
        let calls = Cell::new(0);
        let result = retry_io_operation(
            || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(LedgerError::TransientIoError("busy".to_string()))
                } else {
                    Ok(42)
                }
            },
            NO_DELAY,
            "test",
        );
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_write_atomically_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("ledger.csv");

        write_atomically(&target, b"first").unwrap();
        write_atomically(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!dir.path().join("nested").join("ledger.csv.tmp").exists());
        assert_eq!(read_if_exists(&dir.path().join("missing")).unwrap(), None);
    }
}

//! CSV-backed ledger file.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer};

use crate::catalog::SizeCatalog;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::order::Order;

use super::io_utils::{
    classify_io_error, read_if_exists, retry_io_operation, write_atomically, RetryPolicy,
};
use super::schema::LedgerSchema;

/// Shared order ledger persisted as one CSV file.
///
/// Reads may happen from any thread. Writes are expected to come from a single
/// writer; the store itself does no locking.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    schema: LedgerSchema,
    retry: RetryPolicy,
}

impl LedgerStore {
    /// Creates a store for the ledger file named by `config`.
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_path(config.ledger_path(), SizeCatalog::ledger(), config)
    }

    /// Creates a store at an explicit path with an explicit size catalog.
    pub fn with_path(path: PathBuf, catalog: SizeCatalog, config: &LedgerConfig) -> Self {
        Self {
            path,
            schema: LedgerSchema::new(catalog),
            retry: RetryPolicy {
                max_retries: config.persistence_max_retries,
                retry_delay_ms: config.persistence_retry_delay_ms,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the ledger, treating a missing or unreadable file as empty.
    pub fn load(&self) -> Ledger {
        match self.try_load() {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(
                    "Ledger {} could not be read, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Ledger::new()
            }
        }
    }

    /// Loads the ledger, reporting read and parse failures.
    ///
    /// A missing file is an empty ledger, not an error.
    pub fn try_load(&self) -> Result<Ledger, LedgerError> {
        let Some(bytes) = read_if_exists(&self.path)? else {
            return Ok(Ledger::new());
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| LedgerError::Csv(format!("Failed to read header: {}", e)))?
            .clone();
        let columns = self.schema.resolve(&headers);

        let mut ledger = Ledger::new();
        for record in reader.records() {
            let record = record.map_err(|e| LedgerError::Csv(format!("Failed to read row: {}", e)))?;
            ledger.push(columns.decode_row(&record));
        }
        Ok(ledger)
    }

    /// Appends `order` as the last row and rewrites the file.
    ///
    /// A file that cannot be parsed is moved aside to an unused
    /// `<name>.corrupt[.N]` before the new ledger replaces it. Read failures
    /// are returned untouched.
    pub fn append(&self, order: &Order) -> Result<(), LedgerError> {
        let mut ledger = match self.try_load() {
            Ok(ledger) => ledger,
            Err(e @ LedgerError::Csv(_)) => {
                let moved_to = self.quarantine()?;
                tracing::warn!(
                    "Ledger {} is unreadable ({}), moved to {}; starting a new one",
                    self.path.display(),
                    e,
                    moved_to.display()
                );
                Ledger::new()
            }
            Err(e) => return Err(e),
        };
        ledger.push(order.clone());
        self.save(&ledger)
    }

    /// Rewrites the whole ledger file.
    pub fn save(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        let contents = self.encode(ledger)?;
        retry_io_operation(
            || write_atomically(&self.path, &contents),
            self.retry,
            "save_ledger",
        )
    }

    /// Raw file bytes, `None` when nothing has been written yet.
    pub fn read_bytes(&self) -> Result<Option<Vec<u8>>, LedgerError> {
        read_if_exists(&self.path)
    }

    fn encode(&self, ledger: &Ledger) -> Result<Vec<u8>, LedgerError> {
        let mut writer = Writer::from_writer(Vec::new());
        writer
            .write_record(self.schema.headers())
            .map_err(|e| LedgerError::Csv(format!("Failed to write header: {}", e)))?;
        for order in ledger {
            writer
                .write_record(self.schema.encode_row(order))
                .map_err(|e| LedgerError::Csv(format!("Failed to write row: {}", e)))?;
        }
        writer
            .into_inner()
            .map_err(|e| LedgerError::Csv(format!("Failed to flush ledger: {}", e)))
    }

    fn quarantine(&self) -> Result<PathBuf, LedgerError> {
        let target = self.unused_quarantine_path();
        fs::rename(&self.path, &target)
            .map_err(|e| classify_io_error(e, "Failed to move unreadable ledger aside"))?;
        Ok(target)
    }

    fn unused_quarantine_path(&self) -> PathBuf {
        let mut base = self.path.as_os_str().to_os_string();
        base.push(".corrupt");

        let mut candidate = PathBuf::from(&base);
        let mut n = 2;
        while candidate.exists() {
            let mut numbered = base.clone();
            numbered.push(format!(".{}", n));
            candidate = PathBuf::from(numbered);
            n += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::catalog::Variant;

    fn store_in(dir: &Path) -> LedgerStore {
        LedgerStore::new(&LedgerConfig {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.exists());
        assert!(store.load().is_empty());
        assert_eq!(store.read_bytes().unwrap(), None);
    }

    #[test]
    fn test_append_writes_header_and_row() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let order = Order::new("01/02/2024 08:00:00", "Ana, Filha").with_quantity(Variant::Azul, 36, 3);
        store.append(&order).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Timestamp,Nome do Cliente,Azul_36,Preta_36"));
        assert!(lines.next().unwrap().starts_with("01/02/2024 08:00:00,\"Ana, Filha\",3,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_garbled_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), [0xff, 0xfe, b'\n', 0xff]).unwrap();

        assert!(store.try_load().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_append_moves_unreadable_ledger_aside() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), [0xff, 0xfe, b'\n', 0xff]).unwrap();

        store.append(&Order::new("01/02/2024 08:00:00", "Ana")).unwrap();

        assert_eq!(store.load().len(), 1);
        assert!(dir.path().join("pedidos.csv.corrupt").exists());
    }

    #[test]
    fn test_repeated_corruption_keeps_every_quarantined_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        for i in 0..3 {
            store
                .append(&Order::new("01/02/2024 08:00:00", format!("Cliente {}", i)))
                .unwrap();
        }
        assert_eq!(store.load().len(), 3);

        fs::write(store.path(), [0xff, 0xfe, b'\n', 0xff]).unwrap();
        store.append(&Order::new("02/02/2024 08:00:00", "Bia")).unwrap();
        let first_broken = fs::read(dir.path().join("pedidos.csv.corrupt")).unwrap();
        assert_eq!(first_broken, [0xff, 0xfe, b'\n', 0xff]);

        fs::write(store.path(), [0xfe, 0xff, b'\n', 0xfe]).unwrap();
        store.append(&Order::new("03/02/2024 08:00:00", "Caio")).unwrap();

        assert_eq!(
            fs::read(dir.path().join("pedidos.csv.corrupt")).unwrap(),
            first_broken
        );
        assert_eq!(
            fs::read(dir.path().join("pedidos.csv.corrupt.2")).unwrap(),
            [0xfe, 0xff, b'\n', 0xfe]
        );
        assert_eq!(store.load().len(), 1);
        assert_eq!(store.load().last().unwrap().customer_name, "Caio");
    }

    #[test]
    fn test_read_failure_is_returned_without_quarantine() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        // A directory in place of the file cannot be read as bytes.
        fs::create_dir(store.path()).unwrap();

        let result = store.append(&Order::new("01/02/2024 08:00:00", "Ana"));
        assert!(matches!(result, Err(LedgerError::IoError(_))));
        assert!(store.path().is_dir());
        assert!(!dir.path().join("pedidos.csv.corrupt").exists());
    }
}

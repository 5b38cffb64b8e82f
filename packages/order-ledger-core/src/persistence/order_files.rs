//! One-file-per-order store used by the single-item order flow.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer};

use crate::aggregate::sort_newest_first;
use crate::catalog::Variant;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::order::{normalize_quantity, now_timestamp, parse_timestamp, ItemOrder};

use super::io_utils::{
    classify_io_error, read_if_exists, retry_io_operation, write_atomically, RetryPolicy,
};
use super::schema::{CUSTOMER_COLUMN, TIMESTAMP_COLUMN};

/// Header row of every per-customer order file.
pub const HEADERS: [&str; 5] = [TIMESTAMP_COLUMN, CUSTOMER_COLUMN, "Cor", "Tamanho", "Quantidade"];
const EXTENSION: &str = ".csv";
const MAX_SLUG_LEN: usize = 40;

/// An order file found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFile {
    pub file_name: String,
    /// Decoded contents; `None` when the file could not be parsed.
    pub order: Option<ItemOrder>,
}

impl OrderFile {
    fn timestamp(&self) -> &str {
        self.order.as_ref().map(|o| o.timestamp.as_str()).unwrap_or("")
    }
}

/// Directory holding one CSV file per submitted item order.
#[derive(Debug, Clone)]
pub struct OrderFileStore {
    dir: PathBuf,
    retry: RetryPolicy,
}

impl OrderFileStore {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            dir: config.orders_path(),
            retry: RetryPolicy {
                max_retries: config.persistence_max_retries,
                retry_delay_ms: config.persistence_retry_delay_ms,
            },
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `order` to a fresh file and returns the file name.
    pub fn write(&self, order: &ItemOrder) -> Result<String, LedgerError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| classify_io_error(e, "Failed to create orders directory"))?;

        let contents = encode(order)?;
        let file_name = self.unused_file_name(order);
        let path = self.dir.join(&file_name);
        retry_io_operation(
            || write_atomically(&path, &contents),
            self.retry,
            "write_order_file",
        )?;
        Ok(file_name)
    }

    /// Every order file, newest first. A missing directory lists as empty.
    pub fn list(&self) -> Vec<OrderFile> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Cannot list {}: {}", self.dir.display(), e);
                }
                return Vec::new();
            }
        };

        let mut files: Vec<OrderFile> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_valid_file_name(name))
            .map(|file_name| {
                let order = fs::read(self.dir.join(&file_name))
                    .ok()
                    .and_then(|bytes| decode(&bytes).ok());
                OrderFile { file_name, order }
            })
            .collect();

        // read_dir order is unspecified
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        sort_newest_first(&mut files, OrderFile::timestamp);
        files
    }

    /// Raw bytes of one order file.
    ///
    /// Names that could escape the directory are rejected; unknown names
    /// return `Ok(None)`.
    pub fn read_file(&self, file_name: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if !is_valid_file_name(file_name) {
            return Err(LedgerError::InvalidFileName(file_name.to_string()));
        }
        read_if_exists(&self.dir.join(file_name))
    }

    fn unused_file_name(&self, order: &ItemOrder) -> String {
        let stamp = parse_timestamp(&order.timestamp)
            .or_else(|| parse_timestamp(&now_timestamp()))
            .map(|at| at.format("%Y%m%d_%H%M%S").to_string())
            .unwrap_or_default();
        let base = format!("pedido_{}_{}", stamp, slug(&order.customer_name));

        let mut candidate = format!("{}{}", base, EXTENSION);
        let mut n = 2;
        while self.dir.join(&candidate).exists() {
            candidate = format!("{}_{}{}", base, n, EXTENSION);
            n += 1;
        }
        candidate
    }
}

/// Lowercase ASCII slug of a customer name.
fn slug(name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "cliente".to_string()
    } else {
        slug.to_string()
    }
}

fn is_valid_file_name(name: &str) -> bool {
    name.len() > EXTENSION.len()
        && name.ends_with(EXTENSION)
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn encode(order: &ItemOrder) -> Result<Vec<u8>, LedgerError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .map_err(|e| LedgerError::Csv(format!("Failed to write header: {}", e)))?;
    writer
        .write_record([
            order.timestamp.clone(),
            order.customer_name.clone(),
            order.variant.to_string(),
            order.size.to_string(),
            order.quantity.to_string(),
        ])
        .map_err(|e| LedgerError::Csv(format!("Failed to write row: {}", e)))?;
    writer
        .into_inner()
        .map_err(|e| LedgerError::Csv(format!("Failed to flush order file: {}", e)))
}

fn decode(bytes: &[u8]) -> Result<ItemOrder, LedgerError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let record = reader
        .records()
        .next()
        .ok_or_else(|| LedgerError::Csv("Order file has no rows".to_string()))?
        .map_err(|e| LedgerError::Csv(e.to_string()))?;

    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
    let variant = field(2)
        .parse::<Variant>()
        .map_err(|e| LedgerError::Csv(format!("Bad colour: {}", e)))?;
    let size = field(3)
        .parse::<u16>()
        .map_err(|e| LedgerError::Csv(format!("Bad size: {}", e)))?;

    Ok(ItemOrder {
        timestamp: field(0).to_string(),
        customer_name: field(1).to_string(),
        variant,
        size,
        quantity: field(4).parse().map(normalize_quantity).unwrap_or(0),
    })
}

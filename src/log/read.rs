//! Read-side reconstruction of published transactions.
//!
//! `Transactions::load` and `History::load` return immutable point-in-time
//! snapshots; a writer appending after the load is not observed until the
//! caller loads again. Absent log files yield empty collections, malformed
//! lines fail the whole parse.

use crate::error::StoreError;
use crate::layout::StorePath;
use crate::log::record::TransactionRecord;
use crate::store::Store;
use crate::types::{Fingerprint, TransactionId};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// One reconstructed publish operation.
#[derive(Debug, Clone)]
pub struct Transaction {
    record: TransactionRecord,
    root: PathBuf,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.record.id
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    /// Parse this transaction's side file into its member entries.
    ///
    /// A missing side file is `NotFound`; a line that does not match the
    /// two-quoted-field format fails the whole parse.
    pub fn entries(&self) -> Result<Vec<TransactionEntry>, StoreError> {
        let side_file = self
            .root
            .join(crate::store::ADMIN_DIR)
            .join(self.record.id.to_string());
        let text = fs::read_to_string(&side_file).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(side_file.clone()),
            _ => StoreError::io(&side_file, e),
        })?;

        text.lines()
            .enumerate()
            .map(|(i, line)| {
                parse_entry_line(line, &self.root).ok_or_else(|| StoreError::MalformedLog {
                    line_no: i + 1,
                    line: line.to_string(),
                })
            })
            .collect()
    }
}

/// One published file within a transaction.
#[derive(Debug, Clone)]
pub struct TransactionEntry {
    store_path: StorePath,
    source_path: PathBuf,
    root: PathBuf,
}

impl TransactionEntry {
    /// Destination file name inside the store.
    pub fn file_name(&self) -> &str {
        self.store_path.file_name()
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        self.store_path.fingerprint()
    }

    /// Absolute path the file was published from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Full on-disk path of the stored copy.
    pub fn stored_path(&self) -> PathBuf {
        self.root.join(self.store_path.stored_file())
    }

    /// Open the stored copy for reading.
    pub fn open(&self) -> Result<File, StoreError> {
        let path = self.stored_path();
        File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.clone()),
            _ => StoreError::io(&path, e),
        })
    }
}

fn parse_entry_line(line: &str, root: &Path) -> Option<TransactionEntry> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let body = line.strip_prefix('"')?;
    let (store_part, rest) = body.split_once("\",\"")?;
    let source = rest.strip_suffix('"')?;
    let (file_name, fingerprint) = store_part.split_once('\\')?;
    if file_name.is_empty() || fingerprint.is_empty() {
        return None;
    }
    Some(TransactionEntry {
        store_path: StorePath::from_parts(file_name, Fingerprint::new(fingerprint)),
        source_path: PathBuf::from(source),
        root: root.to_path_buf(),
    })
}

/// Snapshot of the current log (`server.txt`), keyed by transaction id.
///
/// Later lines sharing an id overwrite earlier ones.
#[derive(Debug)]
pub struct Transactions {
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl Transactions {
    /// Parse the store's current log. An absent file yields an empty map.
    pub fn load(store: &Store) -> Result<Transactions, StoreError> {
        let parsed = parse_log_file(&store.server_file(), store.root())?;
        let mut transactions = BTreeMap::new();
        for transaction in parsed {
            transactions.insert(transaction.id(), transaction);
        }
        Ok(Transactions { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransactionId, &Transaction)> {
        self.transactions.iter().map(|(id, t)| (*id, t))
    }
}

/// Snapshot of the history log (`history.txt`) in append order.
///
/// Duplicate ids are preserved as distinct records.
#[derive(Debug)]
pub struct History {
    transactions: Vec<Transaction>,
}

impl History {
    /// Parse the store's history log. An absent file yields an empty history.
    pub fn load(store: &Store) -> Result<History, StoreError> {
        Ok(History {
            transactions: parse_log_file(&store.history_file(), store.root())?,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }
}

impl Index<usize> for History {
    type Output = Transaction;

    fn index(&self, index: usize) -> &Transaction {
        &self.transactions[index]
    }
}

fn parse_log_file(path: &Path, root: &Path) -> Result<Vec<Transaction>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    text.lines()
        .enumerate()
        .map(|(i, line)| {
            TransactionRecord::parse_line(line)
                .map(|record| Transaction {
                    record,
                    root: root.to_path_buf(),
                })
                .map_err(|_| StoreError::MalformedLog {
                    line_no: i + 1,
                    line: line.to_string(),
                })
        })
        .collect()
}

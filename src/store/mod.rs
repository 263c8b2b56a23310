//! Store orchestration: the write side of the repository.
//!
//! A publish (`add`) copies each file into the content layout, writes the
//! per-transaction entry list, appends to both logs, commits the id counter
//! and touches the liveness marker, in that order. The whole call runs under
//! an exclusive advisory lock; nothing is rolled back on failure.

mod lock;

use crate::error::StoreError;
use crate::fingerprint;
use crate::layout::StorePath;
use crate::log::record::{TransactionKind, TransactionRecord, TransactionRef};
use crate::log::{History, Transactions};
use crate::types::TransactionId;
use chrono::{DateTime, Local};
use lock::StoreLock;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

pub const ADMIN_DIR: &str = "000Admin";
pub const LAST_ID_FILE: &str = "lastid.txt";
pub const HISTORY_FILE: &str = "history.txt";
pub const SERVER_FILE: &str = "server.txt";
pub const PINGME_FILE: &str = "pingme.txt";
const LOCK_FILE: &str = "lock";

/// Handle to a store root on disk.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Store {
        Store { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of the current log. Re-load to observe later writes.
    pub fn transactions(&self) -> Result<Transactions, StoreError> {
        Transactions::load(self)
    }

    /// Snapshot of the history log. Re-load to observe later writes.
    pub fn history(&self) -> Result<History, StoreError> {
        History::load(self)
    }

    /// When the store was last successfully written to, per the liveness
    /// marker's modification time.
    pub fn modify_timestamp(&self) -> Result<DateTime<Local>, StoreError> {
        let path = self.pingme_file();
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.clone()),
            _ => StoreError::io(&path, e),
        })?;
        let mtime = metadata.modified().map_err(|e| StoreError::io(&path, e))?;
        Ok(DateTime::<Local>::from(mtime))
    }

    /// Publish a batch of files as one transaction.
    ///
    /// Returns the allocated transaction id. A failure partway through leaves
    /// prior copies and log appends in place; the id counter is only advanced
    /// once every step has succeeded.
    pub fn add(
        &self,
        files: &[PathBuf],
        product: &str,
        version: &str,
    ) -> Result<TransactionId, StoreError> {
        let start_time = Local::now().naive_local();
        self.create_dirs()?;

        let _lock = StoreLock::acquire(&self.admin_dir().join(LOCK_FILE))?;
        let id = self.next_transaction_id()?;
        info!(id = %id, file_count = files.len(), product, version, "publishing transaction");

        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let store_path = self.store_file(file)?;
            let source = fs::canonicalize(file).map_err(|e| StoreError::io(file, e))?;
            entries.push((store_path, source));
        }

        self.write_entry_file(id, &entries)?;
        self.record_transaction(&TransactionRecord {
            id,
            kind: TransactionKind::Add,
            reference: TransactionRef::File,
            timestamp: start_time,
            product: product.to_string(),
            version: version.to_string(),
            comment: String::new(),
        })?;
        self.commit_transaction_id(id)?;
        self.touch_pingme()?;

        info!(id = %id, "transaction committed");
        Ok(id)
    }

    pub(crate) fn admin_dir(&self) -> PathBuf {
        self.root.join(ADMIN_DIR)
    }

    pub(crate) fn last_id_file(&self) -> PathBuf {
        self.admin_dir().join(LAST_ID_FILE)
    }

    pub(crate) fn history_file(&self) -> PathBuf {
        self.admin_dir().join(HISTORY_FILE)
    }

    pub(crate) fn server_file(&self) -> PathBuf {
        self.admin_dir().join(SERVER_FILE)
    }

    pub(crate) fn pingme_file(&self) -> PathBuf {
        self.root.join(PINGME_FILE)
    }

    fn create_dirs(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let admin = self.admin_dir();
        fs::create_dir_all(&admin).map_err(|e| StoreError::io(&admin, e))
    }

    /// Read the id the next transaction will get. The counter file is only
    /// rewritten by [`commit_transaction_id`](Self::commit_transaction_id)
    /// after the transaction fully succeeds.
    fn next_transaction_id(&self) -> Result<TransactionId, StoreError> {
        let path = self.last_id_file();
        let last = match fs::read_to_string(&path) {
            Ok(text) => text
                .trim()
                .parse::<TransactionId>()
                .map_err(|_| StoreError::MalformedLog {
                    line_no: 1,
                    line: text.clone(),
                })?,
            Err(e) if e.kind() == ErrorKind::NotFound => TransactionId::new(0),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        Ok(last.next())
    }

    /// Copy one file into its fingerprint directory.
    ///
    /// The directory create is non-recursive on the final segment so a
    /// fingerprint collision fails loudly instead of silently overwriting.
    /// The copy lands under a temporary name and is renamed into place.
    fn store_file(&self, file: &Path) -> Result<StorePath, StoreError> {
        let print = fingerprint::fingerprint(file)?;
        let store_path = StorePath::new(file, print)?;

        let dest_dir = self.root.join(store_path.relative_dir());
        if let Some(parent) = dest_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        match fs::create_dir(&dest_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::DuplicateEntry(dest_dir));
            }
            Err(e) => return Err(StoreError::io(&dest_dir, e)),
        }

        let dest = dest_dir.join(store_path.file_name());
        let staging = dest_dir.join(format!("{}.partial", store_path.file_name()));
        fs::copy(file, &staging).map_err(|e| StoreError::io(file, e))?;
        fs::rename(&staging, &dest).map_err(|e| StoreError::io(&dest, e))?;

        debug!(source = %file.display(), dest = %dest.display(), "stored file");
        Ok(store_path)
    }

    /// Write the per-transaction entry list, overwriting any existing file
    /// for that id.
    fn write_entry_file(
        &self,
        id: TransactionId,
        entries: &[(StorePath, PathBuf)],
    ) -> Result<(), StoreError> {
        let path = self.admin_dir().join(id.to_string());
        let mut lines = String::new();
        for (store_path, source) in entries {
            lines.push_str(&format!(
                "\"{}\",\"{}\"\n",
                store_path.log_form(),
                source.display()
            ));
        }
        fs::write(&path, lines).map_err(|e| StoreError::io(&path, e))
    }

    /// Append the record to both logs: newline-terminated in the current log,
    /// newline-separated in the history log (no leading blank line when the
    /// history is new or empty).
    fn record_transaction(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        let line = record.to_line();

        let server = self.server_file();
        append(&server, &format!("{line}\n"))?;

        let history = self.history_file();
        let separator = if new_or_empty(&history)? { "" } else { "\n" };
        append(&history, &format!("{separator}{line}"))
    }

    /// Overwrite the counter file with the committed id, no trailing newline.
    fn commit_transaction_id(&self, id: TransactionId) -> Result<(), StoreError> {
        let path = self.last_id_file();
        fs::write(&path, id.to_string()).map_err(|e| StoreError::io(&path, e))
    }

    /// Create the liveness marker if absent, else bump its mtime to now.
    fn touch_pingme(&self) -> Result<(), StoreError> {
        let path = self.pingme_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.set_modified(SystemTime::now())
            .map_err(|e| StoreError::io(&path, e))
    }
}

fn append(path: &Path, text: &str) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| StoreError::io(path, e))
}

fn new_or_empty(path: &Path) -> Result<bool, StoreError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.len() == 0),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

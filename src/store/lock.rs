//! Exclusive advisory lock for the write path.
//!
//! One publish holds the lock from id allocation through the id commit, so
//! concurrent producers from separate processes cannot race on the counter,
//! the fingerprint directories or the log appends. Readers never take it.

use crate::error::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// RAII guard over the store lock file; released on drop on every exit path.
#[derive(Debug)]
pub(crate) struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire the exclusive lock, creating the lock file if needed.
    /// Blocks until the lock is available.
    pub fn acquire(path: &Path) -> Result<StoreLock, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;
        file.lock_exclusive().map_err(|e| StoreError::io(path, e))?;
        Ok(StoreLock { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

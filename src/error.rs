//! Error taxonomy for store operations.
//!
//! Every failure is surfaced synchronously to the immediate caller; there is
//! no retry and no partial-success reporting. A failed `add` leaves prior
//! copies and log appends in place.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file extension does not map to a known artifact class.
    #[error("unsupported file extension {0:?} (expected pdb, pd_, exe, dll, ex_ or dl_)")]
    UnsupportedType(String),

    /// The compression container is malformed, has the wrong member count,
    /// or the external decompression tool is unavailable.
    #[error("archive error: {0}")]
    Archive(String),

    /// A debug-info or executable header failed to parse.
    #[error("malformed image: {0}")]
    Format(String),

    /// The fingerprint directory for a published file already exists.
    #[error("store entry already exists: {0}")]
    DuplicateEntry(PathBuf),

    /// A transaction log line does not match the record grammar.
    #[error("malformed transaction log line {line_no}: {line:?}")]
    MalformedLog { line_no: usize, line: String },

    /// A side file, stored artifact or log file is missing where absence is
    /// not treated as an empty collection.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// An underlying filesystem operation failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Annotate an `io::Error` with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Content-addressed directory layout.
//!
//! A published file lives at `<name>.<ext>/<fingerprint>/<name>.<ext>` under
//! the store root. Compressed-container extensions map back to their
//! canonical form in the destination path; the fingerprint is still computed
//! from the archived content.

use crate::error::StoreError;
use crate::types::Fingerprint;
use std::path::{Path, PathBuf};

/// Store-relative address of one published file.
///
/// Addresses are recorded in transaction entry files with backslash
/// separators regardless of host platform; existing consumers of the log
/// format depend on that spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    file_name: String,
    fingerprint: Fingerprint,
}

impl StorePath {
    /// Derive the store address for a source file and its fingerprint.
    pub fn new(source: &Path, fingerprint: Fingerprint) -> Result<Self, StoreError> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::UnsupportedType(source.display().to_string()))?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| StoreError::UnsupportedType(source.display().to_string()))?
            .to_ascii_lowercase();

        Ok(StorePath {
            file_name: format!("{}.{}", stem, canonical_extension(&ext)),
            fingerprint,
        })
    }

    /// Reassemble an address parsed from an entry file.
    pub fn from_parts(file_name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        StorePath {
            file_name: file_name.into(),
            fingerprint,
        }
    }

    /// The destination file name (canonical extension).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Relative directory the file is copied into: `<name>.<ext>/<fingerprint>`.
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(&self.file_name).join(self.fingerprint.as_str())
    }

    /// Relative path of the stored copy itself.
    pub fn stored_file(&self) -> PathBuf {
        self.relative_dir().join(&self.file_name)
    }

    /// Backslash-separated spelling used in entry files.
    pub fn log_form(&self) -> String {
        format!("{}\\{}", self.file_name, self.fingerprint)
    }
}

/// Map a compressed-container extension to the extension of its member.
fn canonical_extension(ext: &str) -> &str {
    match ext {
        "pd_" => "pdb",
        "ex_" => "exe",
        "dl_" => "dll",
        other => other,
    }
}

//! Core types shared across the store.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stable identifier derived from a binary's embedded build-identity fields.
///
/// Identical build output always yields the same fingerprint; file content
/// bytes and timestamps never contribute to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Fingerprint(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonically increasing transaction identifier.
///
/// Rendered as a zero-padded 10-digit decimal string in log files and in the
/// admin directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new(value: u64) -> Self {
        TransactionId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id issued after this one.
    pub fn next(&self) -> TransactionId {
        TransactionId(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TransactionId(s.parse::<u64>()?))
    }
}

impl Serialize for TransactionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Artifact classes the store recognizes, chosen by file extension.
///
/// The mapping is closed: every supported extension lands on exactly one
/// variant, and fingerprinting matches exhaustively over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Plain debug-info file (`pdb`).
    DebugInfo,
    /// Single-member compressed container wrapping a debug-info file (`pd_`).
    ArchivedDebugInfo,
    /// Plain executable image (`exe`, `dll`).
    Executable,
    /// Single-member compressed container wrapping an executable (`ex_`, `dl_`).
    ArchivedExecutable,
}

impl FileClass {
    /// Map a file extension (case-insensitive) to its class.
    pub fn from_extension(ext: &str) -> Option<FileClass> {
        match ext.to_ascii_lowercase().as_str() {
            "pdb" => Some(FileClass::DebugInfo),
            "pd_" => Some(FileClass::ArchivedDebugInfo),
            "exe" | "dll" => Some(FileClass::Executable),
            "ex_" | "dl_" => Some(FileClass::ArchivedExecutable),
            _ => None,
        }
    }

    /// Whether the artifact is wrapped in a compression container.
    pub fn is_archived(&self) -> bool {
        matches!(
            self,
            FileClass::ArchivedDebugInfo | FileClass::ArchivedExecutable
        )
    }
}

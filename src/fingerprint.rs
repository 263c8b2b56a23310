//! Fingerprinting of debugging artifacts.
//!
//! A fingerprint is derived from a binary's embedded build-identity fields,
//! never from hashing file bytes, so every copy of the same build lands on
//! the same store address:
//!
//! - debug-info: GUID rendered as fixed-width uppercase hex followed by the
//!   decimal age counter, e.g. `A1B2C3D4112233445566778899AABBCC2`
//! - executable: link timestamp and image size as uppercase hex, no padding,
//!   no separator, e.g. `5F1A2B3C45000`

use crate::archive;
use crate::error::StoreError;
use crate::parsers::{pdb, pe};
use crate::types::{FileClass, Fingerprint};
use std::fs;
use std::path::Path;

/// Compute the fingerprint of a file, dispatching on its extension.
pub fn fingerprint(path: &Path) -> Result<Fingerprint, StoreError> {
    let class = classify(path)?;
    let data = if class.is_archived() {
        archive::extract_single(path)?
    } else {
        fs::read(path).map_err(|e| StoreError::io(path, e))?
    };

    match class {
        FileClass::DebugInfo | FileClass::ArchivedDebugInfo => debug_info_fingerprint(&data),
        FileClass::Executable | FileClass::ArchivedExecutable => executable_fingerprint(&data),
    }
}

/// Resolve a path's extension to its artifact class.
pub fn classify(path: &Path) -> Result<FileClass, StoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    FileClass::from_extension(ext).ok_or_else(|| StoreError::UnsupportedType(ext.to_string()))
}

fn debug_info_fingerprint(data: &[u8]) -> Result<Fingerprint, StoreError> {
    let identity = pdb::parse(data)?;
    Ok(Fingerprint::new(format!(
        "{:08X}{:04X}{:04X}{}{}",
        identity.data1,
        identity.data2,
        identity.data3,
        hex::encode_upper(identity.data4),
        identity.age
    )))
}

fn executable_fingerprint(data: &[u8]) -> Result<Fingerprint, StoreError> {
    let header = pe::parse(data)?;
    Ok(Fingerprint::new(format!(
        "{:X}{:X}",
        header.time_date_stamp, header.size_of_image
    )))
}

//! Header parsers for the supported artifact formats.
//!
//! Both parsers operate on an in-memory byte buffer (plain file contents or
//! the decompressed archive member) and expose only the identity fields the
//! fingerprinter needs. Truncated or garbage input yields
//! [`StoreError::Format`](crate::error::StoreError::Format), never a panic.

pub mod pdb;
pub mod pe;

use crate::error::StoreError;

/// Bounds-checked little-endian u16 read.
pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16, StoreError> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| StoreError::Format(format!("truncated at offset {offset}")))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Bounds-checked little-endian u32 read.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, StoreError> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| StoreError::Format(format!("truncated at offset {offset}")))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

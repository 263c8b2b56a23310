//! Minimal PE header scan.
//!
//! Reads just enough of the DOS and COFF headers to recover the two fields
//! that identify a build: the link timestamp and the loaded image size.

use crate::error::StoreError;
use crate::parsers::{read_u16, read_u32};

const DOS_MAGIC: &[u8; 2] = b"MZ";
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
const E_LFANEW_OFFSET: usize = 0x3C;
const COFF_HEADER_SIZE: usize = 20;
/// `SizeOfImage` sits at the same offset in PE32 and PE32+ optional headers.
const SIZE_OF_IMAGE_OFFSET: usize = 56;

/// Build-identity fields of an executable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeHeader {
    pub time_date_stamp: u32,
    pub size_of_image: u32,
}

/// Parse the PE headers of an in-memory image.
pub fn parse(data: &[u8]) -> Result<PeHeader, StoreError> {
    if data.get(..2) != Some(DOS_MAGIC.as_slice()) {
        return Err(StoreError::Format("missing MZ signature".into()));
    }

    let pe_offset = read_u32(data, E_LFANEW_OFFSET)? as usize;
    if data.get(pe_offset..pe_offset + 4) != Some(PE_SIGNATURE.as_slice()) {
        return Err(StoreError::Format(format!(
            "missing PE signature at offset {pe_offset:#X}"
        )));
    }

    let coff_offset = pe_offset + 4;
    let time_date_stamp = read_u32(data, coff_offset + 4)?;

    let optional_header_size = read_u16(data, coff_offset + 16)? as usize;
    if optional_header_size < SIZE_OF_IMAGE_OFFSET + 4 {
        return Err(StoreError::Format(format!(
            "optional header too small ({optional_header_size} bytes)"
        )));
    }

    let optional_offset = coff_offset + COFF_HEADER_SIZE;
    let size_of_image = read_u32(data, optional_offset + SIZE_OF_IMAGE_OFFSET)?;

    Ok(PeHeader {
        time_date_stamp,
        size_of_image,
    })
}

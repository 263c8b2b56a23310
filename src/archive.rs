//! Compression container handling.
//!
//! Archived artifacts (`pd_`, `ex_`, `dl_`) are single-member cabinet
//! containers. The container header is validated locally; decompression is
//! delegated to the external `cabextract` tool, whose stdout is the single
//! member's byte stream.

use crate::error::StoreError;
use crate::parsers::read_u16;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::Command;
use tracing::debug;

const CAB_MAGIC: &[u8; 4] = b"MSCF";
const CAB_HEADER_SIZE: usize = 36;
const CAB_FILE_COUNT_OFFSET: usize = 28;
const DECOMPRESS_TOOL: &str = "cabextract";

/// Read the member count from a cabinet header.
fn member_count(header: &[u8]) -> Result<u16, StoreError> {
    if header.get(..4) != Some(CAB_MAGIC.as_slice()) {
        return Err(StoreError::Archive("missing MSCF signature".into()));
    }
    read_u16(header, CAB_FILE_COUNT_OFFSET)
        .map_err(|_| StoreError::Archive("truncated cabinet header".into()))
}

/// Decompress a single-member archive, yielding the member's bytes.
///
/// Fails if the archive holds anything other than exactly one member, or if
/// the decompression tool is unavailable.
pub fn extract_single(path: &Path) -> Result<Vec<u8>, StoreError> {
    let mut header = [0u8; CAB_HEADER_SIZE];
    let mut file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    file.read_exact(&mut header)
        .map_err(|_| StoreError::Archive(format!("{}: truncated cabinet header", path.display())))?;

    let members = member_count(&header)?;
    if members != 1 {
        return Err(StoreError::Archive(format!(
            "{}: expected exactly one archive member, found {members}",
            path.display()
        )));
    }

    debug!(path = %path.display(), "decompressing archive member");
    let output = Command::new(DECOMPRESS_TOOL)
        .arg("--pipe")
        .arg("--quiet")
        .arg(path)
        .output()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::Archive(format!("{DECOMPRESS_TOOL} tool not available"))
            } else {
                StoreError::Archive(format!("failed to run {DECOMPRESS_TOOL}: {e}"))
            }
        })?;

    if !output.status.success() {
        return Err(StoreError::Archive(format!(
            "{DECOMPRESS_TOOL} failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(output.stdout)
}

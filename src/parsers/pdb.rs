//! Minimal MSF 7.0 reader for debug-info identity.
//!
//! A PDB file is an MSF container: fixed-size blocks, a superblock describing
//! the geometry, and a stream directory reassembled from a block map. Only
//! stream 1 (the PDB info stream) is materialized here; its header carries
//! the GUID and age that identify a build.

use crate::error::StoreError;
use crate::parsers::{read_u16, read_u32};

const MSF_MAGIC: &[u8; 32] = b"Microsoft C/C++ MSF 7.00\r\n\x1aDS\0\0\0";
const SUPERBLOCK_BLOCK_SIZE: usize = 32;
const SUPERBLOCK_DIRECTORY_BYTES: usize = 44;
const SUPERBLOCK_BLOCK_MAP_ADDR: usize = 52;
/// Version + signature + age + 16-byte GUID.
const INFO_HEADER_SIZE: usize = 28;

/// Build-identity fields of a debug-info file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbIdentity {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
    pub age: u32,
}

/// Parse the identity fields of an in-memory debug-info file.
pub fn parse(data: &[u8]) -> Result<PdbIdentity, StoreError> {
    if data.get(..MSF_MAGIC.len()) != Some(MSF_MAGIC.as_slice()) {
        return Err(StoreError::Format("missing MSF 7.0 signature".into()));
    }

    let block_size = read_u32(data, SUPERBLOCK_BLOCK_SIZE)? as usize;
    if block_size == 0 || !block_size.is_power_of_two() || block_size > 0x10000 {
        return Err(StoreError::Format(format!(
            "implausible MSF block size {block_size}"
        )));
    }

    let directory_bytes = read_u32(data, SUPERBLOCK_DIRECTORY_BYTES)? as usize;
    let block_map_addr = read_u32(data, SUPERBLOCK_BLOCK_MAP_ADDR)? as usize;

    let block = |index: usize| -> Result<&[u8], StoreError> {
        let start = index
            .checked_mul(block_size)
            .ok_or_else(|| StoreError::Format(format!("block index {index} overflows")))?;
        data.get(start..start + block_size)
            .ok_or_else(|| StoreError::Format(format!("block {index} out of range")))
    };

    // The block map is a single block of u32 indices naming the blocks that
    // hold the stream directory.
    let directory_block_count = directory_bytes.div_ceil(block_size);
    if directory_block_count > block_size / 4 {
        return Err(StoreError::Format(
            "stream directory spans more blocks than the block map can name".into(),
        ));
    }
    let block_map = block(block_map_addr)?;
    let mut directory = Vec::with_capacity(directory_bytes);
    for i in 0..directory_block_count {
        let index = read_u32(block_map, i * 4)? as usize;
        directory.extend_from_slice(block(index)?);
    }
    directory.truncate(directory_bytes);
    if directory.len() < directory_bytes {
        return Err(StoreError::Format("truncated stream directory".into()));
    }

    // Directory layout: stream count, per-stream sizes, then per-stream
    // block lists in order.
    let num_streams = read_u32(&directory, 0)? as usize;
    if num_streams < 2 {
        return Err(StoreError::Format(format!(
            "no debug-info stream ({num_streams} streams)"
        )));
    }
    let stream_size = |stream: usize| -> Result<usize, StoreError> {
        let raw = read_u32(&directory, 4 + stream * 4)?;
        // A nil stream is recorded as u32::MAX and occupies no blocks.
        Ok(if raw == u32::MAX { 0 } else { raw as usize })
    };

    let info_size = stream_size(1)?;
    if info_size < INFO_HEADER_SIZE {
        return Err(StoreError::Format(format!(
            "debug-info stream too short ({info_size} bytes)"
        )));
    }

    let mut cursor = 4 + num_streams * 4;
    cursor += stream_size(0)?.div_ceil(block_size) * 4;

    let mut info = Vec::with_capacity(info_size);
    for i in 0..info_size.div_ceil(block_size) {
        let index = read_u32(&directory, cursor + i * 4)? as usize;
        info.extend_from_slice(block(index)?);
    }
    info.truncate(info_size);

    Ok(PdbIdentity {
        age: read_u32(&info, 8)?,
        data1: read_u32(&info, 12)?,
        data2: read_u16(&info, 16)?,
        data3: read_u16(&info, 18)?,
        data4: info[20..28]
            .try_into()
            .map_err(|_| StoreError::Format("truncated GUID".into()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_SIZE: usize = 512;

    fn synthetic_pdb(identity: &PdbIdentity) -> Vec<u8> {
        let mut data = vec![0u8; BLOCK_SIZE * 4];

        // Superblock: geometry plus the block map address.
        data[..32].copy_from_slice(MSF_MAGIC);
        data[32..36].copy_from_slice(&(BLOCK_SIZE as u32).to_le_bytes());
        data[36..40].copy_from_slice(&1u32.to_le_bytes()); // free block map
        data[40..44].copy_from_slice(&4u32.to_le_bytes()); // block count
        data[44..48].copy_from_slice(&16u32.to_le_bytes()); // directory bytes
        data[52..56].copy_from_slice(&1u32.to_le_bytes()); // block map addr

        // Block 1: block map naming block 2 as the directory.
        data[BLOCK_SIZE..BLOCK_SIZE + 4].copy_from_slice(&2u32.to_le_bytes());

        // Block 2: directory with two streams; stream 1 lives in block 3.
        let dir = BLOCK_SIZE * 2;
        data[dir..dir + 4].copy_from_slice(&2u32.to_le_bytes());
        data[dir + 4..dir + 8].copy_from_slice(&0u32.to_le_bytes());
        data[dir + 8..dir + 12].copy_from_slice(&28u32.to_le_bytes());
        data[dir + 12..dir + 16].copy_from_slice(&3u32.to_le_bytes());

        // Block 3: PDB info stream header.
        let info = BLOCK_SIZE * 3;
        data[info..info + 4].copy_from_slice(&20000404u32.to_le_bytes());
        data[info + 4..info + 8].copy_from_slice(&0u32.to_le_bytes());
        data[info + 8..info + 12].copy_from_slice(&identity.age.to_le_bytes());
        data[info + 12..info + 16].copy_from_slice(&identity.data1.to_le_bytes());
        data[info + 16..info + 18].copy_from_slice(&identity.data2.to_le_bytes());
        data[info + 18..info + 20].copy_from_slice(&identity.data3.to_le_bytes());
        data[info + 20..info + 28].copy_from_slice(&identity.data4);

        data
    }

    #[test]
    fn parses_identity_fields() {
        let expected = PdbIdentity {
            data1: 0xA1B2_C3D4,
            data2: 0x1122,
            data3: 0x3344,
            data4: [0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC],
            age: 2,
        };
        assert_eq!(parse(&synthetic_pdb(&expected)).unwrap(), expected);
    }

    #[test]
    fn rejects_missing_magic() {
        let err = parse(b"definitely not a debug-info file").unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }

    #[test]
    fn rejects_zero_block_size() {
        let identity = PdbIdentity {
            data1: 0,
            data2: 0,
            data3: 0,
            data4: [0; 8],
            age: 1,
        };
        let mut data = synthetic_pdb(&identity);
        data[32..36].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(parse(&data), Err(StoreError::Format(_))));
    }

    #[test]
    fn rejects_out_of_range_directory_block() {
        let identity = PdbIdentity {
            data1: 0,
            data2: 0,
            data3: 0,
            data4: [0; 8],
            age: 1,
        };
        let mut data = synthetic_pdb(&identity);
        data[BLOCK_SIZE..BLOCK_SIZE + 4].copy_from_slice(&900u32.to_le_bytes());
        assert!(matches!(parse(&data), Err(StoreError::Format(_))));
    }

    #[test]
    fn truncated_input_does_not_panic() {
        let identity = PdbIdentity {
            data1: 1,
            data2: 2,
            data3: 3,
            data4: [4; 8],
            age: 5,
        };
        let data = synthetic_pdb(&identity);
        for len in [0, 16, 32, 56, BLOCK_SIZE, BLOCK_SIZE * 2 + 8] {
            assert!(parse(&data[..len]).is_err());
        }
    }
}

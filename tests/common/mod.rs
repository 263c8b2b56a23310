//! Shared fixtures: synthetic debug-info and executable files small enough
//! to build in-test but real enough for the header parsers.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const MSF_MAGIC: &[u8; 32] = b"Microsoft C/C++ MSF 7.00\r\n\x1aDS\0\0\0";
const BLOCK_SIZE: usize = 512;

/// Fingerprint of `synthetic_pdb(2)`.
pub const PDB_FINGERPRINT: &str = "A1B2C3D4112233445566778899AABBCC2";
/// Fingerprint of `synthetic_pe(0x5F1A2B3C, 0x45000)`.
pub const PE_FINGERPRINT: &str = "5F1A2B3C45000";

/// Fingerprint of `synthetic_pdb(age)` for any age.
pub fn pdb_fingerprint(age: u32) -> String {
    format!("A1B2C3D4112233445566778899AABBCC{age}")
}

/// Minimal MSF 7.0 container holding a PDB info stream with a fixed GUID.
pub fn synthetic_pdb(age: u32) -> Vec<u8> {
    let mut data = vec![0u8; BLOCK_SIZE * 4];

    data[..32].copy_from_slice(MSF_MAGIC);
    data[32..36].copy_from_slice(&(BLOCK_SIZE as u32).to_le_bytes());
    data[36..40].copy_from_slice(&1u32.to_le_bytes());
    data[40..44].copy_from_slice(&4u32.to_le_bytes());
    data[44..48].copy_from_slice(&16u32.to_le_bytes());
    data[52..56].copy_from_slice(&1u32.to_le_bytes());

    // Block 1: block map pointing at the directory in block 2.
    data[BLOCK_SIZE..BLOCK_SIZE + 4].copy_from_slice(&2u32.to_le_bytes());

    // Block 2: directory; stream 1 is 28 bytes in block 3.
    let dir = BLOCK_SIZE * 2;
    data[dir..dir + 4].copy_from_slice(&2u32.to_le_bytes());
    data[dir + 4..dir + 8].copy_from_slice(&0u32.to_le_bytes());
    data[dir + 8..dir + 12].copy_from_slice(&28u32.to_le_bytes());
    data[dir + 12..dir + 16].copy_from_slice(&3u32.to_le_bytes());

    // Block 3: info stream header with the identity fields.
    let info = BLOCK_SIZE * 3;
    data[info..info + 4].copy_from_slice(&20000404u32.to_le_bytes());
    data[info + 8..info + 12].copy_from_slice(&age.to_le_bytes());
    data[info + 12..info + 16].copy_from_slice(&0xA1B2_C3D4u32.to_le_bytes());
    data[info + 16..info + 18].copy_from_slice(&0x1122u16.to_le_bytes());
    data[info + 18..info + 20].copy_from_slice(&0x3344u16.to_le_bytes());
    data[info + 20..info + 28].copy_from_slice(&[0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC]);

    data
}

/// Minimal PE image with the given link timestamp and image size.
pub fn synthetic_pe(time_date_stamp: u32, size_of_image: u32) -> Vec<u8> {
    let mut image = vec![0u8; 0x200];
    image[..2].copy_from_slice(b"MZ");
    image[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());
    image[0x80..0x84].copy_from_slice(b"PE\0\0");
    image[0x84..0x86].copy_from_slice(&0x8664u16.to_le_bytes());
    image[0x88..0x8C].copy_from_slice(&time_date_stamp.to_le_bytes());
    image[0x94..0x96].copy_from_slice(&240u16.to_le_bytes());
    image[0x98..0x9A].copy_from_slice(&0x20Bu16.to_le_bytes());
    image[0xD0..0xD4].copy_from_slice(&size_of_image.to_le_bytes());
    image
}

/// Write fixture bytes under `dir` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

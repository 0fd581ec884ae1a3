//! CRC32 checksums for quarantined payloads
//!
//! Uses CRC32 (IEEE polynomial). Reports carry the checksum so an operator can
//! confirm a quarantine file still holds the bytes that were removed.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}

//! CRC-32 (IEEE) checksums for archive entries.
//!
//! Computed over a full entry body once it has been received, since the
//! stored-entry local header carries the checksum ahead of the payload.

/// CRC-32 of `data`, as stored in ZIP local and central headers.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

//! Fixed-layout ZIP records (APPNOTE 4.3.7, 4.3.12, 4.3.16). All integers little-endian.

use super::dos_time::DosDateTime;

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// 2.0: minimum for stored entries in directories-aware readers.
const VERSION_NEEDED: u16 = 20;
/// Host UNIX (3) in the high byte so external attributes carry mode bits.
const VERSION_MADE_BY: u16 = (3 << 8) | 20;
const METHOD_STORED: u16 = 0;
/// General purpose bit 11: filename is UTF-8.
const FLAG_UTF8_NAME: u16 = 1 << 11;
/// Regular file, rw-r--r--.
const EXTERNAL_ATTRS_REGULAR_0644: u32 = 0o100644 << 16;

pub const LOCAL_HEADER_LEN: usize = 30;
pub const CENTRAL_HEADER_LEN: usize = 46;
pub const EOCD_LEN: usize = 22;

/// Metadata of one emitted entry, kept until the central directory is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub filename: String,
    pub size: u32,
    pub crc32: u32,
    /// Byte offset of this entry's local header in the stream.
    pub offset: u32,
    pub modified: DosDateTime,
}

impl ArchiveRecord {
    fn flags(&self) -> u16 {
        if self.filename.is_ascii() {
            0
        } else {
            FLAG_UTF8_NAME
        }
    }

    /// Local header plus payload length.
    pub fn stored_len(&self) -> u64 {
        (LOCAL_HEADER_LEN + self.filename.len()) as u64 + u64::from(self.size)
    }
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Local file header followed by the filename. The caller checked that the
/// name length fits in 16 bits.
pub(super) fn local_header(rec: &ArchiveRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LOCAL_HEADER_LEN + rec.filename.len());
    put_u32(&mut buf, LOCAL_FILE_HEADER_SIGNATURE);
    put_u16(&mut buf, VERSION_NEEDED);
    put_u16(&mut buf, rec.flags());
    put_u16(&mut buf, METHOD_STORED);
    put_u16(&mut buf, rec.modified.time);
    put_u16(&mut buf, rec.modified.date);
    put_u32(&mut buf, rec.crc32);
    put_u32(&mut buf, rec.size); // compressed
    put_u32(&mut buf, rec.size); // uncompressed
    put_u16(&mut buf, rec.filename.len() as u16);
    put_u16(&mut buf, 0); // extra field length
    buf.extend_from_slice(rec.filename.as_bytes());
    buf
}

/// Central directory file header followed by the filename.
pub(super) fn central_header(rec: &ArchiveRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(CENTRAL_HEADER_LEN + rec.filename.len());
    put_u32(&mut buf, CENTRAL_DIRECTORY_SIGNATURE);
    put_u16(&mut buf, VERSION_MADE_BY);
    put_u16(&mut buf, VERSION_NEEDED);
    put_u16(&mut buf, rec.flags());
    put_u16(&mut buf, METHOD_STORED);
    put_u16(&mut buf, rec.modified.time);
    put_u16(&mut buf, rec.modified.date);
    put_u32(&mut buf, rec.crc32);
    put_u32(&mut buf, rec.size);
    put_u32(&mut buf, rec.size);
    put_u16(&mut buf, rec.filename.len() as u16);
    put_u16(&mut buf, 0); // extra field length
    put_u16(&mut buf, 0); // comment length
    put_u16(&mut buf, 0); // disk number start
    put_u16(&mut buf, 0); // internal attributes
    put_u32(&mut buf, EXTERNAL_ATTRS_REGULAR_0644);
    put_u32(&mut buf, rec.offset);
    buf.extend_from_slice(rec.filename.as_bytes());
    buf
}

/// End of central directory record (single disk, no comment).
pub(super) fn end_of_central_directory(entries: u16, cd_size: u32, cd_offset: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(EOCD_LEN);
    put_u32(&mut buf, END_OF_CENTRAL_DIRECTORY_SIGNATURE);
    put_u16(&mut buf, 0); // this disk
    put_u16(&mut buf, 0); // disk with central directory
    put_u16(&mut buf, entries); // entries on this disk
    put_u16(&mut buf, entries); // total entries
    put_u32(&mut buf, cd_size);
    put_u32(&mut buf, cd_offset);
    put_u16(&mut buf, 0); // comment length
    buf
}

//! Streaming ZIP encoder (stored entries only, no zip64).
//!
//! Entries are appended as soon as their bytes are complete: local header,
//! payload, flush. The central directory and end record are written by
//! `finish`. Only the record metadata is kept between entries; payloads are
//! never retained.
//!
//! A stored entry's local header carries size and CRC-32 up front, so each
//! payload must be fully in hand before it can be emitted. Streaming happens
//! at entry granularity.

mod dos_time;
mod error;
mod layout;
mod writer;

pub use dos_time::DosDateTime;
pub use error::ArchiveError;
pub use layout::{ArchiveRecord, CENTRAL_HEADER_LEN, EOCD_LEN, LOCAL_HEADER_LEN};
pub use writer::{ArchiveSummary, ZipStreamWriter};

/// MIME type of the produced stream.
pub const ZIP_MIME: &str = "application/zip";

#[cfg(test)]
mod tests;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::dos_time::DosDateTime;
use super::error::ArchiveError;
use super::layout::{self, ArchiveRecord};
use crate::checksum::crc32;

/// Totals reported once the end record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub bytes: u64,
}

/// Writes a stored-only ZIP archive to `out` one entry at a time.
///
/// Each `add_entry` emits the local header and payload and flushes, so a
/// reader on the other end of a pipe sees the entry before the next one
/// starts. Nothing is written past `finish`.
pub struct ZipStreamWriter<W> {
    out: W,
    offset: u64,
    records: Vec<ArchiveRecord>,
}

impl<W: AsyncWrite + Unpin> ZipStreamWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            offset: 0,
            records: Vec::new(),
        }
    }

    /// Bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    /// Entries emitted so far, in stream order.
    pub fn records(&self) -> &[ArchiveRecord] {
        &self.records
    }

    /// Appends one stored entry. Limits are checked before any byte is
    /// written, so a `TooLarge` leaves the stream untouched.
    pub async fn add_entry(
        &mut self,
        filename: &str,
        data: &[u8],
        modified: DosDateTime,
    ) -> Result<&ArchiveRecord, ArchiveError> {
        if self.records.len() >= usize::from(u16::MAX) {
            return Err(ArchiveError::TooLarge { what: "entry count" });
        }
        if filename.len() > usize::from(u16::MAX) {
            return Err(ArchiveError::TooLarge { what: "entry name" });
        }
        let size = fit_u32(data.len(), "entry size")?;
        let offset = fit_u32(self.offset, "archive offset")?;

        let record = ArchiveRecord {
            filename: filename.to_string(),
            size,
            crc32: crc32(data),
            offset,
            modified,
        };
        let end = self.offset + record.stored_len();
        if end > u64::from(u32::MAX) {
            return Err(ArchiveError::TooLarge { what: "archive size" });
        }

        let header = layout::local_header(&record);
        self.out.write_all(&header).await?;
        self.out.write_all(data).await?;
        self.out.flush().await?;
        self.offset = end;

        tracing::debug!(entry = %record.filename, size, offset, "archive entry written");
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Writes the central directory and end record, then shuts the writer down.
    pub async fn finish(mut self) -> Result<ArchiveSummary, ArchiveError> {
        let cd_offset = fit_u32(self.offset, "central directory offset")?;

        let mut directory = Vec::new();
        for record in &self.records {
            directory.extend_from_slice(&layout::central_header(record));
        }
        let cd_size = fit_u32(directory.len(), "central directory")?;
        if u64::from(cd_offset) + u64::from(cd_size) > u64::from(u32::MAX) {
            return Err(ArchiveError::TooLarge { what: "archive size" });
        }
        // Checked in add_entry.
        let entries = self.records.len() as u16;
        let end = layout::end_of_central_directory(entries, cd_size, cd_offset);

        self.out.write_all(&directory).await?;
        self.out.write_all(&end).await?;
        self.out.flush().await?;
        self.out.shutdown().await?;

        self.offset += (directory.len() + end.len()) as u64;
        Ok(ArchiveSummary {
            entries: self.records.len(),
            bytes: self.offset,
        })
    }
}

fn fit_u32<T: TryInto<u32>>(value: T, what: &'static str) -> Result<u32, ArchiveError> {
    value.try_into().map_err(|_| ArchiveError::TooLarge { what })
}

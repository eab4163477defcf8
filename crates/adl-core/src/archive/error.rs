use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Downstream write failed (peer gone, disk full). Bytes already written stay written.
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),
    /// The entry or archive would need zip64.
    #[error("{what} exceeds the zip format limit")]
    TooLarge { what: &'static str },
}

//! Disk I/O and file lifecycle for server-mode downloads.
//!
//! Each track is written to `<name>.part` and atomically renamed to its
//! final name once the transfer succeeded; failed transfers leave nothing
//! behind.

mod writer;

pub use writer::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.mp3` → `a.mp3.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

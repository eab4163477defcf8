//! Sequential writer for `.part` files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::temp_path;

/// A track body being written next to its final path. Nothing exists at the
/// final path until [`PartFile::commit`] succeeds.
pub struct PartFile {
    out: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) `<final_path>.part`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            out: BufWriter::new(file),
            temp_path,
            written: 0,
        })
    }

    pub fn append(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.out.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and rename onto `final_path`. Returns the byte count.
    /// On failure the temp file is removed.
    pub fn commit(self, final_path: &Path) -> io::Result<u64> {
        let Self {
            out,
            temp_path,
            written,
        } = self;
        let result = out
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .and_then(|file| file.sync_data())
            .and_then(|()| std::fs::rename(&temp_path, final_path));
        match result {
            Ok(()) => Ok(written),
            Err(e) => {
                remove_quietly(&temp_path);
                Err(e)
            }
        }
    }

    /// Drop the temp file after a failed transfer.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.out);
        remove_quietly(&temp_path);
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "could not remove temp file: {}", e);
        }
    }
}

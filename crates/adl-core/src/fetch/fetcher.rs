//! Per-track fetch strategies used by the downloader.

use std::path::PathBuf;

use super::{fetch_bytes, get_with, FetchError};
use crate::config::FetchConfig;
use crate::storage::PartFile;
use crate::track::Track;

/// Fetches one track. Implementations block; the downloader runs them on
/// the blocking pool, at most `workers` at a time.
pub trait TrackFetcher: Send + Sync + 'static {
    type Output: Send + 'static;

    fn fetch(&self, track: &Track) -> Result<Self::Output, FetchError>;
}

/// Buffers the whole body in memory (archive mode: the entry header needs
/// the size and CRC before the payload).
pub struct MemoryFetcher {
    opts: FetchConfig,
    limit: u64,
}

impl MemoryFetcher {
    /// Entries larger than `u32::MAX` cannot be stored without zip64.
    pub fn new(opts: FetchConfig) -> Self {
        Self {
            opts,
            limit: u64::from(u32::MAX),
        }
    }
}

impl TrackFetcher for MemoryFetcher {
    type Output = Vec<u8>;

    fn fetch(&self, track: &Track) -> Result<Vec<u8>, FetchError> {
        fetch_bytes(&track.url, &self.opts, self.limit)
    }
}

/// A track written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTrack {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Streams the body to `<dir>/<filename>.part`, renamed to `<dir>/<filename>` on success.
pub struct DiskFetcher {
    dir: PathBuf,
    opts: FetchConfig,
}

impl DiskFetcher {
    pub fn new(dir: impl Into<PathBuf>, opts: FetchConfig) -> Self {
        Self {
            dir: dir.into(),
            opts,
        }
    }
}

impl TrackFetcher for DiskFetcher {
    type Output = PersistedTrack;

    fn fetch(&self, track: &Track) -> Result<PersistedTrack, FetchError> {
        let final_path = self.dir.join(&track.filename);
        let mut part = PartFile::create(&final_path).map_err(FetchError::Storage)?;

        if let Err(e) = get_with(&track.url, &self.opts, |chunk| part.append(chunk)) {
            part.discard();
            return Err(e);
        }
        let bytes = part.commit(&final_path).map_err(FetchError::Storage)?;
        Ok(PersistedTrack {
            path: final_path,
            bytes,
        })
    }
}

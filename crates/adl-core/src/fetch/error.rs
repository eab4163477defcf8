//! Fetch error type: one failed track, never a failed job.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx final status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body exceeded what the consumer can hold.
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    /// Disk write failed (disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// The blocking worker running the transfer died.
    #[error("worker: {0}")]
    Worker(String),
}

impl FetchError {
    /// True for transfer-level problems the remote side or network caused.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Curl(_) | FetchError::Http(_))
    }
}

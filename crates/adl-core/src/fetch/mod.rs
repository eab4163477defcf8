//! Blocking HTTP GET via libcurl (curl crate).
//!
//! One attempt per resource: bounded connect time, a low-speed abort for
//! stalled transfers, an optional overall cap, redirects followed, non-2xx
//! is an error. Every function here blocks the calling thread; async callers
//! go through `spawn_blocking`.

mod error;
mod fetcher;

pub use error::FetchError;
pub use fetcher::{DiskFetcher, MemoryFetcher, PersistedTrack, TrackFetcher};

use crate::config::FetchConfig;
use std::io;

/// Upper bound for a scraped HTML page.
pub const MAX_PAGE_BYTES: u64 = 16 * 1024 * 1024;

fn configure(easy: &mut curl::easy::Easy, url: &str, opts: &FetchConfig) -> Result<(), FetchError> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(opts.connect_timeout())?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time())?;
    if let Some(cap) = opts.timeout() {
        easy.timeout(cap)?;
    }
    Ok(())
}

/// GET `url`, handing each body chunk to `sink`. A sink error aborts the
/// transfer and is reported as `FetchError::Storage`.
pub fn get_with<F>(url: &str, opts: &FetchConfig, mut sink: F) -> Result<(), FetchError>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, url, opts)?;

    let mut sink_error: Option<io::Error> = None;
    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                sink_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = sink_error.take() {
                return Err(FetchError::Storage(io_err));
            }
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(())
}

/// GET `url` into memory, refusing bodies larger than `limit` bytes.
pub fn fetch_bytes(url: &str, opts: &FetchConfig, limit: u64) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    let mut exceeded = false;
    let result = get_with(url, opts, |chunk| {
        if body.len() as u64 + chunk.len() as u64 > limit {
            exceeded = true;
            return Err(io::Error::new(io::ErrorKind::Other, "body too large"));
        }
        body.extend_from_slice(chunk);
        Ok(())
    });
    match result {
        Ok(()) => Ok(body),
        Err(FetchError::Storage(_)) if exceeded => Err(FetchError::TooLarge { limit }),
        Err(e) => Err(e),
    }
}

/// GET a page and decode it as (lossy) UTF-8 for adapters.
pub fn fetch_page(url: &str, opts: &FetchConfig) -> Result<String, FetchError> {
    let body = fetch_bytes(url, opts, MAX_PAGE_BYTES)?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(test)]
pub(crate) mod testing;

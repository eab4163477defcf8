//! Bounded-concurrency track downloader.
//!
//! Consumes a resolved track list and runs at most `workers` fetches at a
//! time, each on the blocking pool. Outcomes are handed back in completion
//! order; a failed track is counted, never fatal. Cancellation is checked
//! whenever a new fetch would be admitted: queued tracks are dropped,
//! in-flight fetches finish and are still reported.

mod run;
mod summary;

pub use run::{DownloadRun, TrackOutcome};
pub use summary::DownloadSummary;

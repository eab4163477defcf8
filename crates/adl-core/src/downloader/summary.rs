//! Aggregate tally of a download run.

use serde::Serialize;

/// Running totals. `completed + failed <= total` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// True once the run observed the cancel flag; queued tracks were skipped.
    pub cancelled: bool,
}

impl DownloadSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Job lifecycle state.
///
/// `pending -> detecting -> downloading -> streaming`, then one of the
/// terminal states. `detecting` and `streaming` may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Detecting,
    Downloading,
    Streaming,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Detecting => "detecting",
            JobStatus::Downloading => "downloading",
            JobStatus::Streaming => "streaming",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Detecting => 1,
            JobStatus::Downloading => 2,
            JobStatus::Streaming => 3,
            JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled => 4,
        }
    }

    /// Forward by rank among non-terminal states, or from any non-terminal
    /// state into a terminal one. Terminal states are final.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.is_terminal() || next.rank() > self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a job's results go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Files are written under the download directory.
    #[default]
    Server,
    /// Files are streamed to the client as a ZIP archive.
    Browser,
}

impl DownloadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadMode::Server => "server",
            DownloadMode::Browser => "browser",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

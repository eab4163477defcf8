//! In-memory job registry: lifecycle state, progress and results for every job.
//!
//! The pipeline is the single writer of a job's fields after it claims the
//! job; API handlers read snapshots and may only request cancellation or
//! remove finished jobs.

mod error;
mod id;
mod registry;
mod status;
mod types;

pub use error::RegistryError;
pub use id::{parse_canonical_uuid, InvalidId, JobId};
pub use registry::JobRegistry;
pub use status::{DownloadMode, JobStatus};
pub use types::{JobResult, JobSnapshot, Progress};

/// Message of a freshly created job.
pub const MSG_CREATED: &str = "Job created";
/// Message of a job cancelled before any pipeline attached to it.
pub const MSG_CANCELLED: &str = "Download cancelled by user";

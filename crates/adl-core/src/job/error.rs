use thiserror::Error;

use super::id::JobId;
use super::status::JobStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} is not active")]
    NotActive(JobId),
    /// The job is still running and cannot be removed.
    #[error("job {0} is still active")]
    Conflict(JobId),
    #[error("job {0} is already claimed")]
    AlreadyClaimed(JobId),
    #[error("job {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

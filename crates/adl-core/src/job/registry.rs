use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use super::error::RegistryError;
use super::id::JobId;
use super::status::{DownloadMode, JobStatus};
use super::types::{JobResult, JobSnapshot, Progress};
use super::{MSG_CANCELLED, MSG_CREATED};
use crate::control::CancelFlag;
use crate::track::Track;

struct JobEntry {
    view: JobSnapshot,
    cancel: CancelFlag,
    claimed: bool,
    tracks: Vec<Track>,
}

/// All jobs of this process. Every mutation happens under one write lock and
/// returns the updated snapshot for publication.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new `pending` job.
    pub fn create(&self, mode: DownloadMode, download_name: Option<String>) -> JobSnapshot {
        let id = JobId::new();
        let view = JobSnapshot {
            job_id: id,
            status: JobStatus::Pending,
            message: MSG_CREATED.to_string(),
            progress: None,
            download_name,
            download_mode: mode,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
        };
        self.jobs.write().insert(
            id,
            JobEntry {
                view: view.clone(),
                cancel: CancelFlag::new(),
                claimed: false,
                tracks: Vec::new(),
            },
        );
        tracing::debug!(job_id = %id, mode = %mode, "job created");
        view
    }

    pub fn get(&self, id: JobId) -> Result<JobSnapshot, RegistryError> {
        self.jobs
            .read()
            .get(&id)
            .map(|e| e.view.clone())
            .ok_or(RegistryError::NotFound(id))
    }

    /// All jobs, oldest first.
    pub fn list(&self) -> Vec<JobSnapshot> {
        let mut all: Vec<JobSnapshot> = self.jobs.read().values().map(|e| e.view.clone()).collect();
        all.sort_by_key(|j| j.created_at);
        all
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.jobs.read().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raises the job's cancel flag; the owning pipeline observes it and
    /// finalizes the job. A job nobody has claimed is finalized here.
    pub fn request_cancel(&self, id: JobId) -> Result<JobSnapshot, RegistryError> {
        let mut jobs = self.jobs.write();
        let entry = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        if entry.view.status.is_terminal() {
            return Err(RegistryError::NotActive(id));
        }
        entry.cancel.cancel();
        if !entry.claimed {
            entry.view.status = JobStatus::Cancelled;
            entry.view.message = MSG_CANCELLED.to_string();
            entry.view.completed_at = Some(Utc::now());
        }
        tracing::info!(job_id = %id, claimed = entry.claimed, "cancellation requested");
        Ok(entry.view.clone())
    }

    /// Drops a finished job.
    pub fn remove(&self, id: JobId) -> Result<JobSnapshot, RegistryError> {
        let mut jobs = self.jobs.write();
        let entry = jobs.get(&id).ok_or(RegistryError::NotFound(id))?;
        if !entry.view.status.is_terminal() {
            return Err(RegistryError::Conflict(id));
        }
        let view = entry.view.clone();
        jobs.remove(&id);
        Ok(view)
    }

    /// Attaches a pipeline to the job. Only one claim ever succeeds.
    pub fn claim(&self, id: JobId) -> Result<CancelFlag, RegistryError> {
        let mut jobs = self.jobs.write();
        let entry = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        if entry.claimed {
            return Err(RegistryError::AlreadyClaimed(id));
        }
        if entry.view.status.is_terminal() {
            return Err(RegistryError::NotActive(id));
        }
        entry.claimed = true;
        Ok(entry.cancel.clone())
    }

    fn update<F>(&self, id: JobId, f: F) -> Result<JobSnapshot, RegistryError>
    where
        F: FnOnce(&mut JobEntry) -> Result<(), RegistryError>,
    {
        let mut jobs = self.jobs.write();
        let entry = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        f(entry)?;
        Ok(entry.view.clone())
    }

    /// Moves a running job to a non-terminal state. Use `finish` for terminal ones.
    pub fn transition(
        &self,
        id: JobId,
        status: JobStatus,
        message: impl Into<String>,
    ) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            let from = entry.view.status;
            if status.is_terminal() || !from.can_transition_to(status) {
                return Err(RegistryError::InvalidTransition { id, from, to: status });
            }
            entry.view.status = status;
            entry.view.message = message.into();
            Ok(())
        })
    }

    /// Replaces the message without changing state. Ignored for finished jobs.
    pub fn set_message(
        &self,
        id: JobId,
        message: impl Into<String>,
    ) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            if entry.view.status.is_terminal() {
                return Err(RegistryError::NotActive(id));
            }
            entry.view.message = message.into();
            Ok(())
        })
    }

    pub fn set_download_name(
        &self,
        id: JobId,
        name: impl Into<String>,
    ) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            entry.view.download_name = Some(name.into());
            Ok(())
        })
    }

    /// Stores the resolved track list and fixes `progress.total`.
    pub fn resolve_tracks(
        &self,
        id: JobId,
        tracks: Vec<Track>,
    ) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            if entry.view.status.is_terminal() {
                return Err(RegistryError::NotActive(id));
            }
            if entry.view.progress.is_some() {
                return Err(RegistryError::Conflict(id));
            }
            entry.view.progress = Some(Progress {
                total: tracks.len(),
                completed: 0,
                failed: 0,
            });
            entry.tracks = tracks;
            Ok(())
        })
    }

    #[cfg(test)]
    pub(crate) fn tracks(&self, id: JobId) -> Result<Vec<Track>, RegistryError> {
        self.jobs
            .read()
            .get(&id)
            .map(|e| e.tracks.clone())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Tallies one finished fetch. The tally never exceeds `total`.
    pub fn record_outcome(&self, id: JobId, succeeded: bool) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            let status = entry.view.status;
            if status.is_terminal() {
                return Err(RegistryError::NotActive(id));
            }
            let progress = entry.view.progress.as_mut().ok_or(RegistryError::InvalidTransition {
                id,
                from: status,
                to: JobStatus::Downloading,
            })?;
            if progress.done() >= progress.total {
                tracing::warn!(job_id = %id, "outcome past total ignored");
                return Ok(());
            }
            if succeeded {
                progress.completed += 1;
            } else {
                progress.failed += 1;
            }
            Ok(())
        })
    }

    /// Moves the job into a terminal state and stamps `completed_at`.
    pub fn finish(
        &self,
        id: JobId,
        status: JobStatus,
        message: impl Into<String>,
        result: Option<JobResult>,
    ) -> Result<JobSnapshot, RegistryError> {
        self.update(id, |entry| {
            let from = entry.view.status;
            if !status.is_terminal() || !from.can_transition_to(status) {
                return Err(RegistryError::InvalidTransition { id, from, to: status });
            }
            entry.view.status = status;
            entry.view.message = message.into();
            entry.view.result = result;
            entry.view.completed_at = Some(Utc::now());
            Ok(())
        })
    }
}

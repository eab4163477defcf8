//! Job pipeline: name -> detect -> scrape -> download -> persist or stream.
//!
//! Every stage publishes the updated snapshot to the job's owner. Server-mode
//! jobs run the whole pipeline in a background task. Browser-mode jobs are
//! split: `prepare` runs inside the archive request (so adapter failures
//! become an HTTP error before any archive byte is sent) and `stream` runs
//! in a task writing into the response pipe.

mod persist;
mod prepare;
mod stream;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use url::Url;

use crate::adapter::AdapterRegistry;
use crate::broadcast::UpdateBroadcaster;
use crate::config::AdlConfig;
use crate::control::CancelFlag;
use crate::job::{
    JobId, JobRegistry, JobResult, JobSnapshot, JobStatus, RegistryError, MSG_CANCELLED,
};
use crate::track::Track;

pub use stream::ARCHIVE_PIPE_CAPACITY;

pub const MSG_UNDETECTED: &str = "Could not detect any supported audio player on this page";
pub const MSG_NO_TRACKS: &str = "No tracks found to download";

/// What a client asked for when creating a job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub url: Url,
    pub name: Option<String>,
    /// Adapter tag; detected from the page when absent.
    pub plugin: Option<String>,
    /// Already clamped to the configured bounds.
    pub workers: usize,
}

impl JobRequest {
    pub fn new(url: Url, workers: usize) -> Self {
        Self {
            url,
            name: None,
            plugin: None,
            workers,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The job was finalized as `error` with this message.
    #[error("{0}")]
    Failed(String),
    /// The job was finalized as `cancelled` before downloading.
    #[error("job {0} was cancelled")]
    Cancelled(JobId),
}

/// A claimed job with its track list resolved, ready to download.
#[derive(Debug)]
pub struct PreparedJob {
    pub id: JobId,
    pub name: String,
    pub tracks: Vec<Track>,
    pub workers: usize,
    cancel: CancelFlag,
}

#[derive(Clone)]
pub struct JobPipeline {
    registry: Arc<JobRegistry>,
    broadcaster: Arc<UpdateBroadcaster>,
    adapters: Arc<AdapterRegistry>,
    config: Arc<AdlConfig>,
}

impl JobPipeline {
    pub fn new(
        registry: Arc<JobRegistry>,
        broadcaster: Arc<UpdateBroadcaster>,
        adapters: Arc<AdapterRegistry>,
        config: Arc<AdlConfig>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            adapters,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Arc<UpdateBroadcaster> {
        &self.broadcaster
    }

    pub fn adapters(&self) -> &Arc<AdapterRegistry> {
        &self.adapters
    }

    pub fn config(&self) -> &Arc<AdlConfig> {
        &self.config
    }

    /// `<download_dir>/<name>`.
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.config.download_dir.join(name)
    }

    /// Runs a server-mode job to completion in the background.
    pub fn spawn_server(&self, id: JobId, request: JobRequest) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pipeline.run_server(id, request).await {
                tracing::debug!(job_id = %id, "server job ended early: {}", e);
            }
        })
    }

    /// Publishes a mutation's snapshot and hands it back.
    fn publish(
        &self,
        update: Result<JobSnapshot, RegistryError>,
    ) -> Result<JobSnapshot, PipelineError> {
        let snapshot = update?;
        self.broadcaster.publish(&snapshot);
        Ok(snapshot)
    }

    /// Finalizes the job as `error` with `message`.
    fn fail<T>(&self, id: JobId, message: impl Into<String>) -> Result<T, PipelineError> {
        let message = message.into();
        tracing::error!(job_id = %id, "job failed: {}", message);
        self.publish(self.registry.finish(id, JobStatus::Error, message.clone(), None))?;
        Err(PipelineError::Failed(message))
    }

    fn record(&self, id: JobId, succeeded: bool) -> Result<(), PipelineError> {
        let snapshot = self.publish(self.registry.record_outcome(id, succeeded))?;
        if let Some(p) = snapshot.progress {
            tracing::info!(
                job_id = %id,
                "progress: {}/{} completed, {} failed",
                p.completed,
                p.total,
                p.failed
            );
        }
        Ok(())
    }

    /// Fixes the total and enters `downloading`.
    fn begin_download(&self, job: &PreparedJob) -> Result<(), PipelineError> {
        self.publish(self.registry.resolve_tracks(job.id, job.tracks.clone()))?;
        self.publish(self.registry.transition(
            job.id,
            JobStatus::Downloading,
            format!("Found {} tracks. Downloading...", job.tracks.len()),
        ))?;
        Ok(())
    }

    /// Terminal step after the download run ends.
    fn conclude(
        &self,
        id: JobId,
        cancelled: bool,
        location: Option<String>,
        archive_bytes: Option<u64>,
    ) -> Result<JobSnapshot, PipelineError> {
        let progress = self.registry.get(id)?.progress.unwrap_or_default();
        let result = JobResult {
            successful: progress.completed,
            failed: progress.failed,
            total: progress.total,
            location,
            archive_bytes,
        };
        let (status, message) = if cancelled {
            (JobStatus::Cancelled, MSG_CANCELLED.to_string())
        } else {
            (
                JobStatus::Completed,
                format!("Downloaded {} tracks successfully", result.successful),
            )
        };
        tracing::info!(
            job_id = %id,
            status = %status,
            "finished: {} successful, {} failed of {}",
            result.successful,
            result.failed,
            result.total
        );
        self.publish(self.registry.finish(id, status, message, Some(result)))
    }
}

//! Server mode: tracks are written under `<download_dir>/<name>/`.

use std::sync::Arc;

use super::{JobPipeline, JobRequest, PipelineError, PreparedJob};
use crate::downloader::DownloadRun;
use crate::fetch::{DiskFetcher, TrackFetcher};
use crate::job::{JobId, JobSnapshot};

impl JobPipeline {
    /// Full server-mode job: prepare, then fetch every track to disk.
    pub async fn run_server(
        &self,
        id: JobId,
        request: JobRequest,
    ) -> Result<JobSnapshot, PipelineError> {
        let job = self.prepare(id, &request).await?;
        let dir = self.output_dir(&job.name);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            return self.fail(id, format!("Failed to create {}: {}", dir.display(), e));
        }
        let fetcher = DiskFetcher::new(&dir, self.config.fetch.clone());
        self.persist(job, fetcher).await
    }

    /// Runs the download with `fetcher`, tallying each outcome.
    pub async fn persist<F: TrackFetcher>(
        &self,
        job: PreparedJob,
        fetcher: F,
    ) -> Result<JobSnapshot, PipelineError> {
        self.begin_download(&job)?;
        let id = job.id;
        let location = self.output_dir(&job.name).display().to_string();

        let mut run = DownloadRun::new(job.tracks, job.workers, Arc::new(fetcher), job.cancel);
        while let Some(outcome) = run.next().await {
            self.record(id, outcome.succeeded())?;
        }
        self.conclude(id, run.summary().cancelled, Some(location), None)
    }
}

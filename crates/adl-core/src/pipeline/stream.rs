//! Browser mode: successful tracks are appended to a ZIP stream as they arrive.

use std::sync::Arc;

use tokio::io::{AsyncWrite, DuplexStream};

use super::{JobPipeline, PipelineError, PreparedJob};
use crate::archive::{ArchiveError, DosDateTime, ZipStreamWriter};
use crate::downloader::DownloadRun;
use crate::fetch::{MemoryFetcher, TrackFetcher};
use crate::job::{JobSnapshot, JobStatus};

/// Buffer between the encoder task and the HTTP response body.
pub const ARCHIVE_PIPE_CAPACITY: usize = 256 * 1024;

impl JobPipeline {
    /// Starts streaming `job` in the background and returns the read end of
    /// the archive pipe. Dropping the reader fails the job.
    pub fn spawn_stream(&self, job: PreparedJob) -> DuplexStream {
        let (tx, rx) = tokio::io::duplex(ARCHIVE_PIPE_CAPACITY);
        let fetcher = MemoryFetcher::new(self.config.fetch.clone());
        let pipeline = self.clone();
        let id = job.id;
        tokio::spawn(async move {
            if let Err(e) = pipeline.stream(job, fetcher, tx).await {
                tracing::debug!(job_id = %id, "archive stream ended early: {}", e);
            }
        });
        rx
    }

    /// Downloads `job` into memory one track at a time and writes each
    /// success as a stored entry to `out`. Failed tracks are left out.
    pub async fn stream<F, W>(
        &self,
        job: PreparedJob,
        fetcher: F,
        out: W,
    ) -> Result<JobSnapshot, PipelineError>
    where
        F: TrackFetcher<Output = Vec<u8>>,
        W: AsyncWrite + Unpin,
    {
        self.begin_download(&job)?;
        let id = job.id;

        let mut archive = ZipStreamWriter::new(out);
        let fetcher = Arc::new(fetcher);
        let mut run = DownloadRun::new(job.tracks, job.workers, fetcher, job.cancel);
        let mut streaming = false;

        while let Some(outcome) = run.next().await {
            let stored = match outcome.result {
                Ok(bytes) => {
                    let added = archive
                        .add_entry(&outcome.track.filename, &bytes, DosDateTime::now())
                        .await;
                    match added {
                        Ok(_) => true,
                        Err(ArchiveError::TooLarge { what }) => {
                            tracing::warn!(
                                job_id = %id,
                                track = outcome.track.ordinal,
                                "left out of archive: {} too large",
                                what
                            );
                            false
                        }
                        Err(ArchiveError::Io(e)) => {
                            return self.fail(id, format!("Archive stream failed: {}", e));
                        }
                    }
                }
                Err(_) => false,
            };
            if stored && !streaming {
                streaming = true;
                let update =
                    self.registry.transition(id, JobStatus::Streaming, "Streaming archive...");
                self.publish(update)?;
            }
            self.record(id, stored)?;
        }

        let cancelled = run.summary().cancelled;
        let summary = match archive.finish().await {
            Ok(summary) => summary,
            Err(e) => return self.fail(id, format!("Archive stream failed: {}", e)),
        };
        tracing::info!(
            job_id = %id,
            entries = summary.entries,
            bytes = summary.bytes,
            "archive finished"
        );
        self.conclude(id, cancelled, None, Some(summary.bytes))
    }
}

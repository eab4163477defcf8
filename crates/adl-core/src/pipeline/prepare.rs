//! Claim, name, detect and scrape.

use std::sync::Arc;

use chrono::Utc;
use tokio::task;

use super::{JobPipeline, JobRequest, PipelineError, PreparedJob, MSG_NO_TRACKS, MSG_UNDETECTED};
use crate::adapter::ScrapeAdapter;
use crate::fetch::fetch_page;
use crate::job::{JobId, JobStatus, MSG_CANCELLED};
use crate::track::resolve_tracks;
use crate::url_model::derive_download_name;

impl JobPipeline {
    /// Claims the job and runs it up to a resolved track list.
    ///
    /// Adapter failures and empty results finalize the job as `error`; a
    /// cancellation seen before downloading finalizes it as `cancelled`.
    pub async fn prepare(
        &self,
        id: JobId,
        request: &JobRequest,
    ) -> Result<PreparedJob, PipelineError> {
        let cancel = self.registry.claim(id)?;

        let given = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let (name, first_message) = match given {
            Some(name) => (name.to_string(), "Detecting audio player...".to_string()),
            None => {
                let name = derive_download_name(request.url.as_str(), Utc::now());
                tracing::info!(job_id = %id, "generated name: {}", name);
                let message = format!("Generated name: {}", name);
                (name, message)
            }
        };
        self.publish(self.registry.set_download_name(id, name.clone()))?;
        self.publish(self.registry.transition(id, JobStatus::Detecting, first_message))?;

        let adapter = match self.select_adapter(id, request).await {
            Ok(adapter) => adapter,
            Err(message) => return self.fail(id, message),
        };

        let tag = adapter.tag();
        self.publish(self.registry.set_message(id, format!("Scraping with {} plugin...", tag)))?;
        tracing::info!(job_id = %id, adapter = tag, url = %request.url, "scraping");

        let page_url = request.url.clone();
        let scrape_name = name.clone();
        let scraped = task::spawn_blocking(move || adapter.scrape(&page_url, &scrape_name)).await;
        let specs = match scraped {
            Ok(Ok(specs)) => specs,
            Ok(Err(e)) => return self.fail(id, format!("Scraper error: {}", e)),
            Err(e) => return self.fail(id, format!("Scraper error: {}", e)),
        };
        if specs.is_empty() {
            return self.fail(id, MSG_NO_TRACKS);
        }

        if cancel.is_cancelled() {
            tracing::info!(job_id = %id, "cancelled before download");
            self.publish(self.registry.finish(id, JobStatus::Cancelled, MSG_CANCELLED, None))?;
            return Err(PipelineError::Cancelled(id));
        }

        let tracks = resolve_tracks(specs, &name, self.config.max_filename_bytes);
        tracing::info!(
            job_id = %id,
            tracks = tracks.len(),
            workers = request.workers,
            "track list resolved"
        );
        Ok(PreparedJob {
            id,
            name,
            tracks,
            workers: request.workers,
            cancel,
        })
    }

    /// Requested adapter, or the first one recognizing the page. The error
    /// is the job's failure message.
    async fn select_adapter(
        &self,
        id: JobId,
        request: &JobRequest,
    ) -> Result<Arc<dyn ScrapeAdapter>, String> {
        if let Some(tag) = request.plugin.as_deref().filter(|t| !t.is_empty()) {
            return self.adapters.get(tag).ok_or_else(|| format!("Unknown plugin: {}", tag));
        }

        let url = request.url.to_string();
        let opts = self.config.fetch.clone();
        let html = match task::spawn_blocking(move || fetch_page(&url, &opts)).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => return Err(format!("Error detecting player: {}", e)),
            Err(e) => return Err(format!("Error detecting player: {}", e)),
        };
        let adapter = self.adapters.detect(&html).ok_or_else(|| MSG_UNDETECTED.to_string())?;
        let _ = self.publish(
            self.registry
                .set_message(id, format!("Detected player: {}", adapter.info().name)),
        );
        tracing::info!(job_id = %id, adapter = adapter.tag(), "detected player");
        Ok(adapter)
    }
}

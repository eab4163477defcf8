//! `adl pack <url>` – run one browser-mode job, writing the archive to a file.

use adl_core::config::AdlConfig;
use adl_core::fetch::MemoryFetcher;
use adl_core::job::DownloadMode;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::progress::ProgressPrinter;
use super::{build_pipeline, job_request, report};
use crate::cli::JobArgs;

pub async fn run_pack(cfg: AdlConfig, args: JobArgs, output: Option<PathBuf>) -> Result<()> {
    let request = job_request(&cfg, &args)?;
    let pipeline = build_pipeline(cfg);
    let id = pipeline
        .registry()
        .create(DownloadMode::Browser, request.name.clone())
        .job_id;
    println!("Job {} ({} workers): {}", id.short(), request.workers, request.url);

    let progress = ProgressPrinter::attach(&pipeline, id);
    let outcome = async {
        let job = pipeline.prepare(id, &request).await?;
        let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.zip", job.name)));
        let file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("create {}", path.display()))?;
        let fetcher = MemoryFetcher::new(pipeline.config().fetch.clone());
        let snapshot = pipeline.stream(job, fetcher, file).await?;
        anyhow::Ok((snapshot, path))
    }
    .await;
    progress.finish().await;

    let (snapshot, path) = outcome?;
    report(&snapshot)?;
    let bytes = snapshot.result.and_then(|r| r.archive_bytes).unwrap_or(0);
    println!("Wrote {} ({} bytes)", path.display(), bytes);
    Ok(())
}

//! `adl fetch <url>` – run one server-mode job in the foreground.

use adl_core::config::AdlConfig;
use adl_core::job::DownloadMode;
use anyhow::{bail, Result};

use super::progress::ProgressPrinter;
use super::{build_pipeline, job_request, report};
use crate::cli::JobArgs;

pub async fn run_fetch(cfg: AdlConfig, args: JobArgs) -> Result<()> {
    let request = job_request(&cfg, &args)?;
    let pipeline = build_pipeline(cfg);
    if let Some(name) = &request.name {
        let dir = pipeline.output_dir(name);
        if dir.exists() {
            bail!("directory '{}' already exists, choose a different --name", dir.display());
        }
    }

    let id = pipeline
        .registry()
        .create(DownloadMode::Server, request.name.clone())
        .job_id;
    println!("Job {} ({} workers): {}", id.short(), request.workers, request.url);

    let progress = ProgressPrinter::attach(&pipeline, id);
    let outcome = pipeline.run_server(id, request).await;
    progress.finish().await;

    let snapshot = outcome?;
    report(&snapshot)?;
    if let Some(location) = snapshot.result.and_then(|r| r.location) {
        println!("Saved to {}", location);
    }
    Ok(())
}

//! CLI command handlers, one file per command.

mod adapters;
mod completions;
mod fetch;
mod pack;
mod progress;
mod saved;
mod serve;

use std::sync::Arc;

use adl_core::adapter::AdapterRegistry;
use adl_core::broadcast::UpdateBroadcaster;
use adl_core::config::AdlConfig;
use adl_core::job::{JobRegistry, JobSnapshot, JobStatus};
use adl_core::pipeline::{JobPipeline, JobRequest};
use adl_core::url_model::{sanitize_filename, validate_page_url};
use anyhow::{bail, Result};

use crate::cli::JobArgs;

pub use adapters::run_adapters;
pub use completions::{run_completions, run_man};
pub use fetch::run_fetch;
pub use pack::run_pack;
pub use saved::run_saved;
pub use serve::run_serve;

fn build_pipeline(cfg: AdlConfig) -> JobPipeline {
    let adapters = AdapterRegistry::with_builtin(&cfg.fetch);
    JobPipeline::new(
        Arc::new(JobRegistry::new()),
        Arc::new(UpdateBroadcaster::new()),
        Arc::new(adapters),
        Arc::new(cfg),
    )
}

/// Validates the page URL and name the way `POST /api/download` does.
fn job_request(cfg: &AdlConfig, args: &JobArgs) -> Result<JobRequest> {
    let url = validate_page_url(&args.url, cfg.allow_private_hosts)?;
    let name = match args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(raw) => {
            let name = sanitize_filename(raw, cfg.max_filename_bytes);
            if name.is_empty() {
                bail!("invalid download name: {:?}", raw);
            }
            Some(name)
        }
        None => None,
    };
    Ok(JobRequest {
        url,
        name,
        plugin: args.plugin.clone(),
        workers: cfg.effective_workers(args.workers),
    })
}

/// Ok for a completed job, Err with the final message otherwise.
fn report(snapshot: &JobSnapshot) -> Result<()> {
    match snapshot.status {
        JobStatus::Completed => {
            println!("{}", snapshot.message);
            Ok(())
        }
        _ => bail!("{}", snapshot.message),
    }
}

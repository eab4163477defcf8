//! `adl serve` – run the HTTP API until Ctrl-C.

use adl_core::api::{self, AppState};
use adl_core::config::AdlConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::build_pipeline;

pub async fn run_serve(cfg: AdlConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| cfg.bind.clone());
    tokio::fs::create_dir_all(&cfg.download_dir)
        .await
        .with_context(|| format!("create download dir {}", cfg.download_dir.display()))?;

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {}", bind))?;
    println!("Listening on http://{}", listener.local_addr()?);
    println!("Saving server-mode downloads under {}", cfg.download_dir.display());

    let state = Arc::new(AppState::new(build_pipeline(cfg)));
    api::serve(listener, state, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
        }
    })
    .await
}

//! HTTP API and WebSocket endpoint (axum).

mod error;
mod jobs;
mod library;
mod ws;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::job::JobId;
use crate::pipeline::{JobPipeline, JobRequest};

pub use error::ApiError;

/// Shared handler state.
pub struct AppState {
    pub pipeline: JobPipeline,
    /// Browser-mode requests waiting for their archive to be fetched.
    pending: Mutex<HashMap<JobId, JobRequest>>,
}

impl AppState {
    pub fn new(pipeline: JobPipeline) -> Self {
        Self {
            pipeline,
            pending: Mutex::new(HashMap::new()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/download", post(jobs::start_download))
        .route("/api/status/{job_id}", get(jobs::status))
        .route("/api/jobs", get(jobs::list))
        .route("/api/jobs/{job_id}", delete(jobs::delete))
        .route("/api/jobs/{job_id}/cancel", post(jobs::cancel))
        .route("/api/jobs/{job_id}/archive", get(jobs::archive))
        .route("/api/players", get(jobs::players))
        .route("/api/downloads", get(library::list))
        .route("/api/downloads/{name}", delete(library::delete))
        .route("/api/downloads/{name}/zip", get(library::zip))
        .route("/ws", get(ws::handler))
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("API listening on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// `attachment; filename="<name>.zip"` with quotes, control and non-ASCII
/// characters replaced.
fn attachment_header(name: &str) -> HeaderValue {
    let safe: String = name
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || !c.is_ascii() || c.is_ascii_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let value = format!("attachment; filename=\"{}.zip\"", safe);
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download.zip\""))
}

fn zip_headers(name: &str) -> [(header::HeaderName, HeaderValue); 2] {
    [
        (header::CONTENT_TYPE, HeaderValue::from_static(crate::archive::ZIP_MIME)),
        (header::CONTENT_DISPOSITION, attachment_header(name)),
    ]
}

//! Job endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;

use super::{zip_headers, ApiError, AppState};
use crate::adapter::AdapterInfo;
use crate::broadcast::ConnectionId;
use crate::job::{DownloadMode, JobId, JobSnapshot};
use crate::pipeline::JobRequest;
use crate::url_model::{sanitize_filename, validate_page_url};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub download_mode: DownloadMode,
    #[serde(default)]
    pub connection_id: Option<String>,
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse().map_err(|_| ApiError::job_not_found())
}

/// `POST /api/download`
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let pipeline = &state.pipeline;
    let config = pipeline.config();
    let url = validate_page_url(&body.url, config.allow_private_hosts)?;

    let name = match body.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(raw) => {
            let name = sanitize_filename(raw, config.max_filename_bytes);
            if name.is_empty() {
                return Err(ApiError::BadRequest(format!("Invalid download name: {:?}", raw)));
            }
            Some(name)
        }
        None => None,
    };
    if body.download_mode == DownloadMode::Server {
        if let Some(name) = &name {
            if pipeline.output_dir(name).exists() {
                return Err(ApiError::BadRequest(format!(
                    "Directory '{}' already exists. Please choose a different name.",
                    pipeline.output_dir(name).display()
                )));
            }
        }
    }

    let request = JobRequest {
        url,
        name: name.clone(),
        plugin: body.plugin.clone(),
        workers: config.effective_workers(body.workers),
    };
    let snapshot = pipeline.registry().create(body.download_mode, name);
    let id = snapshot.job_id;

    if let Some(raw) = body.connection_id.as_deref() {
        match raw.parse::<ConnectionId>() {
            Ok(conn) if pipeline.broadcaster().bind_owner(id, conn) => {}
            _ => tracing::debug!(
                job_id = %id,
                connection_id = raw,
                "unknown connection, updates not pushed"
            ),
        }
    }

    tracing::info!(
        job_id = %id,
        mode = %body.download_mode,
        url = %request.url,
        workers = request.workers,
        "job accepted"
    );
    match body.download_mode {
        DownloadMode::Server => {
            pipeline.spawn_server(id, request);
        }
        DownloadMode::Browser => {
            state.pending.lock().insert(id, request);
        }
    }
    Ok(Json(snapshot))
}

/// `GET /api/status/{job_id}`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let id = parse_job_id(&job_id)?;
    Ok(Json(state.pipeline.registry().get(id)?))
}

/// `GET /api/jobs`
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<JobSnapshot>> {
    Json(state.pipeline.registry().list())
}

/// `DELETE /api/jobs/{job_id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_job_id(&job_id)?;
    state.pipeline.registry().remove(id)?;
    state.pending.lock().remove(&id);
    state.pipeline.broadcaster().release_job(id);
    Ok(Json(json!({ "message": "Job cleared" })))
}

/// `POST /api/jobs/{job_id}/cancel`
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_job_id(&job_id)?;
    let snapshot = state.pipeline.registry().request_cancel(id)?;
    if snapshot.status.is_terminal() {
        // Never claimed: no pipeline will publish the final state.
        state.pending.lock().remove(&id);
        state.pipeline.broadcaster().publish(&snapshot);
    }
    Ok(Json(json!({ "message": "Job cancellation requested" })))
}

/// `GET /api/jobs/{job_id}/archive`: runs a browser-mode job and streams its ZIP.
pub async fn archive(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_job_id(&job_id)?;
    let snapshot = state.pipeline.registry().get(id)?;
    if snapshot.download_mode != DownloadMode::Browser {
        return Err(ApiError::Conflict("Job is not a browser-mode download".to_string()));
    }
    let request = state
        .pending
        .lock()
        .remove(&id)
        .ok_or_else(|| ApiError::Conflict("Archive already requested for this job".to_string()))?;

    let prepared = state.pipeline.prepare(id, &request).await?;
    let headers = zip_headers(&prepared.name);
    let reader = state.pipeline.spawn_stream(prepared);
    Ok((headers, Body::from_stream(ReaderStream::new(reader))).into_response())
}

/// `GET /api/players`
pub async fn players(State(state): State<Arc<AppState>>) -> Json<Vec<AdapterInfo>> {
    Json(state.pipeline.adapters().infos())
}

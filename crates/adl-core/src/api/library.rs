//! Saved-download endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio::task;
use tokio_util::io::ReaderStream;

use super::{zip_headers, ApiError, AppState};
use crate::library::{self as saved, SavedDownload};
use crate::pipeline::ARCHIVE_PIPE_CAPACITY;

/// `GET /api/downloads`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SavedDownload>>, ApiError> {
    let root = state.pipeline.config().download_dir.clone();
    let listing = task::spawn_blocking(move || saved::list_saved(&root)).await?;
    Ok(Json(listing.map_err(|e| ApiError::Internal(e.to_string()))?))
}

/// `DELETE /api/downloads/{name}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let root = state.pipeline.config().download_dir.clone();
    task::spawn_blocking(move || saved::delete_saved(&root, &name)).await??;
    Ok(Json(json!({ "message": "Download deleted" })))
}

/// `GET /api/downloads/{name}/zip`
pub async fn zip(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let root = state.pipeline.config().download_dir.clone();
    let lookup = name.clone();
    let files = task::spawn_blocking(move || {
        let dir = saved::saved_dir(&root, &lookup)?;
        Ok::<_, saved::LibraryError>(saved::audio_files(&dir)?)
    })
    .await??;

    let (tx, rx) = tokio::io::duplex(ARCHIVE_PIPE_CAPACITY);
    let archive_name = name.clone();
    tokio::spawn(async move {
        match saved::write_archive(&files, tx).await {
            Ok(summary) => tracing::info!(
                name = %archive_name,
                entries = summary.entries,
                "saved download archived"
            ),
            Err(e) => tracing::warn!(name = %archive_name, "saved download archive aborted: {}", e),
        }
    });
    Ok((zip_headers(&name), Body::from_stream(ReaderStream::new(rx))).into_response())
}

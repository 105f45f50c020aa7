// Endpoint handlers

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::downloader::format_selector::build_quality_options;
use crate::downloader::{retention, utils};
use crate::server::AppState;

use super::error::ApiError;
use super::models::{DownloadRequest, VideoInfoResponse, VideoUrlRequest};

const UNKNOWN_FIELD: &str = "Unknown";

/// GET / — service banner, doubles as a liveness check.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "YouTube Video Downloader API" }))
}

/// POST /api/video-info — probe a URL and return its quality options.
pub async fn video_info(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoUrlRequest>,
) -> Result<Json<VideoInfoResponse>, ApiError> {
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let metadata = state.orchestrator.probe(url).await?;
    let formats = build_quality_options(&metadata.formats);

    info!(url, options = formats.len(), "video info served");

    Ok(Json(VideoInfoResponse {
        title: metadata.title.unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        thumbnail: metadata.thumbnail,
        duration: metadata.duration,
        uploader: metadata
            .uploader
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        formats,
    }))
}

/// POST /api/download — fetch the chosen format server-side and stream
/// the finished file back.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    let format_id = body.format_id.trim();
    if format_id.is_empty() {
        return Err(ApiError::bad_request("format_id is required"));
    }

    // Bound on concurrent yt-dlp processes; requests queue here.
    let _permit = state
        .download_semaphore
        .acquire()
        .await
        .map_err(|_| ApiError::internal("service is shutting down"))?;

    let artifact = state.orchestrator.download(url, format_id).await?;

    let file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|e| ApiError::internal(format!("could not open downloaded file: {}", e)))?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(utils::content_type_for(&artifact.file_name)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.len));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&utils::content_disposition(&artifact.file_name))
            .map_err(|e| ApiError::internal(format!("bad disposition header: {}", e)))?,
    );

    // The body streams from disk, so the job directory outlives the
    // response by a grace period instead of being removed inline.
    if let Some(job_dir) = artifact.path.parent() {
        retention::remove_job_dir_later(job_dir.to_path_buf(), retention::SERVE_GRACE);
    }

    Ok((StatusCode::OK, headers, body).into_response())
}

//! Video handlers: upload, processing lifecycle, status, download, list.

use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use cutcraft_models::{VideoId, VideoRecord, VideoStatus};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::security::{is_valid_video_id, sanitize_file_name};
use crate::services::{entitlement, processing};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Serialize)]
pub struct UploadResponse {
    pub video_id: VideoId,
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Serialize)]
pub struct VideoResponse {
    pub video: VideoRecord,
}

#[derive(Serialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct VideosResponse {
    pub videos: Vec<VideoRecord>,
}

// ============================================================================
// Constants
// ============================================================================

/// Multipart field carrying the video file.
const UPLOAD_FIELD: &str = "video";

/// Lifetime of signed download URLs.
const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// Handlers
// ============================================================================

/// Accept a video upload: gate, store the object, create the record and its
/// owner index entry.
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let profile = state
        .user_service
        .get_or_create(&user.uid, user.email.as_deref())
        .await?;

    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| ApiError::validation("No video file provided"))?;
    let file_size = data.len() as u64;

    entitlement::can_accept_upload(&profile, file_size)?;

    let file_name = sanitize_file_name(&file_name);
    let key = object_key(&user.uid, Utc::now(), &file_name);
    state.storage.upload_bytes(&key, data, &content_type).await?;

    let video = VideoRecord::new(VideoId::new(), &user.uid, &file_name, &key, file_size);
    state.videos.create(&video).await?;

    metrics::record_upload(profile.plan.as_str());
    info!(video_id = %video.id, user_id = %user.uid, size = file_size, "video uploaded");

    Ok(Json(UploadResponse {
        video_id: video.id.clone(),
        message: "Video uploaded successfully".to_string(),
        video,
    }))
}

/// Move an uploaded video into processing.
pub async fn start_processing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<Json<ProcessResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let video = processing::start_processing(&state, &user, &video_id).await?;

    Ok(Json(ProcessResponse {
        message: "Processing started".to_string(),
        video,
    }))
}

/// Current status of one video, with progress recomputed from elapsed time.
pub async fn video_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let mut video = load_owned(&state, &user, &video_id).await?;

    // Lazy advancement: only persist when the record actually moved.
    if video.refresh(Utc::now()) {
        state.videos.put(&video).await?;
        if video.status == VideoStatus::Completed {
            metrics::record_processing_completed();
        }
    }

    Ok(Json(VideoResponse { video }))
}

/// Signed download URL for a completed video.
pub async fn download_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<Json<DownloadResponse>> {
    let video_id = parse_video_id(&video_id)?;
    let mut video = load_owned(&state, &user, &video_id).await?;

    // The read path is authoritative for completion, so a download request
    // arriving after the window also observes the terminal record.
    if video.refresh(Utc::now()) {
        state.videos.put(&video).await?;
    }

    if video.status != VideoStatus::Completed {
        return Err(ApiError::invalid_state("Video processing not completed"));
    }

    let path = video
        .processed_file_path
        .as_deref()
        .unwrap_or(&video.file_path);
    let download_url = state.storage.presign_get(path, DOWNLOAD_URL_TTL).await?;
    let expires_at = Utc::now() + chrono::Duration::seconds(DOWNLOAD_URL_TTL.as_secs() as i64);

    Ok(Json(DownloadResponse {
        download_url,
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// All of the caller's videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<VideosResponse>> {
    let mut videos = state.videos.list_for_user(&user.uid).await?;
    videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(VideosResponse { videos }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Object key for an upload: `{userId}/{millis}_{fileName}`.
fn object_key(user_id: &str, now: DateTime<Utc>, file_name: &str) -> String {
    format!("{}/{}_{}", user_id, now.timestamp_millis(), file_name)
}

/// A malformed id can never name a stored video; report it as absent rather
/// than leaking the distinction.
fn parse_video_id(raw: &str) -> ApiResult<VideoId> {
    if !is_valid_video_id(raw) {
        return Err(ApiError::not_found("Video not found"));
    }
    Ok(VideoId::from_string(raw))
}

/// Load a video owned by the caller; ownership mismatch reads as absence.
async fn load_owned(
    state: &AppState,
    user: &AuthUser,
    video_id: &VideoId,
) -> ApiResult<VideoRecord> {
    state
        .videos
        .get(video_id)
        .await?
        .filter(|v| v.user_id == user.uid)
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

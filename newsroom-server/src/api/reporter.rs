//! Reporter routes: submissions and media uploads
//!
//! Handlers sit behind [`require_reporter`](super::auth::require_reporter),
//! which supplies the caller's [`Session`].

use axum::{
    extract::{multipart::Field, Multipart, State},
    response::Redirect,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db::{news, AssociatedMedia, Location, NewsDocument, Session};
use crate::enrich::Submission;
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::media::{self, MediaKind, StoredUpload, MAX_FILES_PER_REQUEST};
use crate::validation::{
    filter_media_paths, sanitize_text, validate_full_text, validate_location, validate_source,
};
use crate::AppState;

/// Submissions listed on the dashboard
pub const DASHBOARD_RECENT: i64 = 5;

/// Submissions listed on the submissions page
pub const SUBMISSIONS_LIMIT: i64 = 50;

/// Multipart field carrying uploaded files
const FILES_FIELD: &str = "files";

/// GET /reporter
pub async fn index_redirect() -> Redirect {
    Redirect::to("/reporter/dashboard")
}

/// GET /reporter/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Value>> {
    let recent =
        news::reporter_submissions(&state.db, &session.user_id, DASHBOARD_RECENT).await?;
    Ok(Json(json!({
        "success": true,
        "reporter_name": session.user_name,
        "recent_submissions": recent,
    })))
}

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub success: bool,
    pub submissions: Vec<NewsDocument>,
    pub count: usize,
}

/// GET /reporter/submissions, /reporter/submissions/api
pub async fn submissions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<SubmissionsResponse>> {
    let submissions =
        news::reporter_submissions(&state.db, &session.user_id, SUBMISSIONS_LIMIT).await?;
    Ok(Json(SubmissionsResponse {
        success: true,
        count: submissions.len(),
        submissions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub source: String,
    pub location: Option<Location>,
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(default)]
    pub video_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub document_id: String,
    pub title: String,
    pub status: String,
    pub category: String,
    pub credibility: f64,
    pub fake_prob: f64,
    pub doc: NewsDocument,
}

/// POST /reporter/submit
///
/// Validate, sanitize, enrich and store one news report.
pub async fn submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    JsonBody(request): JsonBody<SubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    validate_full_text(&request.full_text).map_err(ApiError::BadRequest)?;
    validate_source(&request.source).map_err(ApiError::BadRequest)?;
    validate_location(request.location.as_ref()).map_err(|details| ApiError::Validation {
        message: "Location validation failed".to_string(),
        details,
    })?;

    let location = request.location.unwrap_or_default();
    let submission = Submission {
        full_text: sanitize_text(&request.full_text),
        source: sanitize_text(&request.source),
        location: Location {
            district: location.district.trim().to_string(),
            state: location.state.trim().to_string(),
            country: location.country.trim().to_string(),
        },
        media: AssociatedMedia {
            images: filter_media_paths(&request.image_paths, MediaKind::Image.folder()),
            videos: filter_media_paths(&request.video_paths, MediaKind::Video.folder()),
        },
        reporter_id: Some(session.user_id.clone()),
        reporter_name: Some(session.user_name.clone()),
    };

    let doc = state.enricher.ingest(submission).await;
    news::insert_news(&state.db, &doc).await?;

    info!(
        news_id = %doc.id,
        reporter_id = %session.user_id,
        status = %doc.status,
        category = %doc.category,
        "News submitted"
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: "News submitted successfully",
        document_id: doc.id.clone(),
        title: doc.title.clone(),
        status: doc.status.to_string(),
        category: doc.category.clone(),
        credibility: doc.credibility,
        fake_prob: doc.fake_prob,
        doc,
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub uploaded: Vec<StoredUpload>,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Read a field chunk by chunk, giving up once it exceeds `max_bytes`
///
/// Returns `None` for an oversized field; the unread remainder is skipped
/// by the next `next_field` call.
async fn read_capped(
    field: &mut Field<'_>,
    filename: &str,
    max_bytes: usize,
) -> ApiResult<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", filename, e)))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Ok(None);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Some(bytes))
}

async fn handle_upload(
    state: &AppState,
    kind: MediaKind,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let upload_root = state.config.upload_root();
    let mut uploaded = Vec::new();
    let mut errors = Vec::new();
    let mut seen = 0usize;
    let mut saw_files_field = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        saw_files_field = true;

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            continue;
        }

        seen += 1;
        if seen > MAX_FILES_PER_REQUEST {
            errors.push(format!(
                "{}: Too many files, at most {} per upload",
                filename, MAX_FILES_PER_REQUEST
            ));
            continue;
        }

        if let Err(reason) = media::check_extension(kind, &filename) {
            errors.push(format!("{}: {}", filename, reason));
            continue;
        }

        let Some(bytes) = read_capped(&mut field, &filename, kind.max_bytes()).await? else {
            errors.push(format!("{}: {}", filename, media::too_large_message(kind)));
            continue;
        };

        match media::save_upload(&upload_root, kind, &filename, &bytes).await {
            Ok(stored) => uploaded.push(stored),
            Err(reason) => errors.push(format!("{}: {}", filename, reason)),
        }
    }

    if !saw_files_field {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }
    if uploaded.is_empty() && errors.is_empty() {
        return Err(ApiError::BadRequest("No files selected".to_string()));
    }
    if uploaded.is_empty() {
        return Err(ApiError::Validation {
            message: "All uploads failed".to_string(),
            details: errors,
        });
    }
    if !errors.is_empty() {
        warn!(failed = errors.len(), "Some {} uploads were rejected", kind.label());
    }

    Ok(Json(UploadResponse {
        success: true,
        count: uploaded.len(),
        uploaded,
        warnings: errors,
    }))
}

/// POST /reporter/upload/images
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    handle_upload(&state, MediaKind::Image, multipart).await
}

/// POST /reporter/upload/videos
pub async fn upload_videos(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    handle_upload(&state, MediaKind::Video, multipart).await
}

/// GET /reporter/upload/status
pub async fn upload_status() -> Json<Value> {
    Json(json!({
        "max_files": MAX_FILES_PER_REQUEST,
        "max_image_size": format!("{}MB", media::MAX_IMAGE_BYTES / (1024 * 1024)),
        "max_video_size": format!("{}MB", media::MAX_VIDEO_BYTES / (1024 * 1024)),
        "allowed_image_types": media::IMAGE_EXTENSIONS,
        "allowed_video_types": media::VIDEO_EXTENSIONS,
    }))
}

//! Handlers for the `/uploads` endpoints.
//!
//! Two very different upload paths share this module because they share
//! a failure-surfacing contract, not a mechanism:
//!
//! - `POST /uploads/videos/sign` presigns a resumable video upload. The
//!   bytes never touch this server; the studio uploads straight to the
//!   CDN with the returned slot.
//! - `POST /uploads/pdfs` accepts sheet music as a single multipart
//!   request and stores it in the local file store.

use axum::extract::{Multipart, State};
use axum::Json;
use etude_bunny::upload::SignedSlot;
use etude_core::error::CoreError;
use etude_core::signing::{upload_signature, PRESIGN_TTL_SECS};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Response for POST /uploads/pdfs.
#[derive(Debug, Serialize)]
pub struct PdfUploadResponse {
    /// Public URL the stored file is served at.
    pub url: String,
    /// Original client-supplied filename.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
}

// ---------------------------------------------------------------------------
// Video upload signing
// ---------------------------------------------------------------------------

/// POST /api/v1/uploads/videos/sign
///
/// Creates an empty video slot at the CDN and returns everything an
/// uploader needs to drive a resumable transfer into it: the video id,
/// the library id, a signature over `{library_id, api_key, expire,
/// video_id}` valid for one hour, and the upload endpoint.
///
/// The body is read as a raw JSON value so a missing or non-string
/// `title` produces our 400 validation contract rather than a
/// deserialization rejection.
pub async fn sign_video(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<SignedSlot>> {
    let title = body
        .get("title")
        .and_then(|value| value.as_str())
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Title is required and must be a string".to_string(),
            ))
        })?;

    let bunny = state.bunny.as_ref().ok_or_else(|| {
        AppError::Core(CoreError::Configuration(
            "Video host credentials not configured".to_string(),
        ))
    })?;

    let created = bunny.create_video(title).await?;
    tracing::info!(video_id = %created.guid, "created video slot");

    let authorization_expire = chrono::Utc::now().timestamp() + PRESIGN_TTL_SECS;
    let authorization_signature = upload_signature(
        bunny.library_id(),
        bunny.api_key(),
        authorization_expire,
        &created.guid,
    );

    Ok(Json(SignedSlot {
        video_id: created.guid,
        library_id: bunny.library_id().to_string(),
        authorization_signature,
        authorization_expire,
        upload_url: state.config.bunny.upload_endpoint.clone(),
    }))
}

// ---------------------------------------------------------------------------
// PDF upload
// ---------------------------------------------------------------------------

/// POST /api/v1/uploads/pdfs
///
/// Accepts a multipart form with a single `file` field, validates the
/// declared MIME type is exactly `application/pdf`, and stores the bytes
/// under a timestamped key. Nothing is written on a validation failure.
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PdfUploadResponse>> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue; // ignore unknown fields
        }
        let filename = field.file_name().unwrap_or("sheet.pdf").to_string();
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    if content_type.as_deref() != Some("application/pdf") {
        return Err(AppError::BadRequest(
            "Only PDF files are allowed".to_string(),
        ));
    }

    let stored = state
        .files
        .put("pdfs", &filename, &data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, filename = %filename, "PDF storage write failed");
            AppError::InternalError(e.to_string())
        })?;
    tracing::info!(key = %stored.key, size = stored.size, "stored PDF upload");

    Ok(Json(PdfUploadResponse {
        url: stored.url,
        filename,
        size: stored.size,
    }))
}

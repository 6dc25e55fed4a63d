//! Image upload handler.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use reel_media::validate_batch;
use reel_models::{SessionId, UploadWarning, UploadedImage};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    /// Filenames that decoded successfully, in upload order.
    pub accepted: Vec<String>,
    /// One warning per rejected file.
    pub warnings: Vec<UploadWarning>,
    /// Current playback order after this upload.
    pub order: Vec<String>,
}

/// Accept a multipart batch of images.
///
/// Every file part gets a full decode; files that fail are dropped with a
/// per-file warning and never reach the session. A batch where nothing
/// survives is not an error here: the fatal "no valid images" check happens
/// when an export is triggered.
pub async fn upload_images(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let id = SessionId::from_string(session_id);

    // Reject unknown sessions before draining the body.
    if state.sessions.summary(&id).await.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            // Non-file fields are ignored
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read {}: {}", filename, e)))?;

        files.push((filename, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files in upload"));
    }

    let (accepted, warnings) = validate_batch(&files);
    crate::metrics::record_uploads(accepted.len(), warnings.len());

    let mut images = Vec::with_capacity(accepted.len());
    let mut file_map: std::collections::HashMap<String, Vec<u8>> = files.into_iter().collect();
    for filename in &accepted {
        if let Some(bytes) = file_map.remove(filename) {
            images.push(UploadedImage::new(filename.clone(), bytes));
        }
    }

    let summary = state
        .sessions
        .insert_images(&id, images)
        .await
        .map_err(|_| ApiError::not_found("Session not found"))?;

    info!(
        session_id = %id,
        accepted = accepted.len(),
        rejected = warnings.len(),
        "Upload processed"
    );

    Ok(Json(UploadResponse {
        accepted,
        warnings,
        order: summary.order,
    }))
}

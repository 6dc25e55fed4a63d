//! Synchronous slideshow export.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use tracing::{info, warn};

use reel_media::{
    apply_watermark, assemble_slideshow, decode_frame, sequence_items, WatermarkAsset,
    WatermarkConfig,
};
use reel_models::{
    artifact_filename, ArtifactId, EncodingConfig, ExportArtifact, ExportRequest, ExportSettings,
    SessionId,
};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, StoredArtifact};

/// Run the full export pipeline and block until the MP4 exists.
///
/// Settings are resolved into an immutable record up front; the pipeline
/// never reads mutable session state after the snapshot. One re-decode
/// failure skips that file and continues; only "nothing left to encode" and
/// encoder failures abort.
pub async fn create_export(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<Json<ExportArtifact>> {
    let id = SessionId::from_string(session_id);
    let preset = request.preset;

    let settings =
        ExportSettings::resolve(&request).map_err(|e| ApiError::Validation(e.to_string()))?;

    let (items, order) = state
        .sessions
        .export_snapshot(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    if items.is_empty() {
        return Err(ApiError::Media(reel_media::MediaError::NoValidInput));
    }

    info!(
        session_id = %id,
        preset = %preset,
        duration_secs = settings.duration_secs,
        watermark = settings.watermark,
        repeat = settings.repeat,
        fade = ?settings.fade_duration_secs,
        images = items.len(),
        "Export started"
    );

    // The logo is loaded once and shared read-only across every frame of
    // this export.
    let asset = if settings.watermark {
        WatermarkAsset::load(&WatermarkConfig::default())
    } else {
        None
    };

    let (frames, skipped) = tokio::task::spawn_blocking(move || {
        let ordered = sequence_items(&items, &order);
        let mut frames = Vec::with_capacity(ordered.len());
        let mut skipped = Vec::new();

        for (filename, item) in ordered {
            match decode_frame(filename, &item.bytes) {
                Ok(frame) => {
                    frames.push(apply_watermark(frame, asset.as_ref(), settings.watermark));
                }
                Err(e) => {
                    // Per-file failure: the file contributes no frame, the
                    // loop continues.
                    warn!(filename = filename, error = %e, "Unable to open image during export");
                    skipped.push(filename.to_string());
                }
            }
        }

        (frames, skipped)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Frame preparation task failed: {}", e)))?;

    if frames.is_empty() {
        crate::metrics::record_export_failed(preset.as_str());
        return Err(ApiError::Media(reel_media::MediaError::NoFrames));
    }

    let created_at = Utc::now();
    let filename = artifact_filename(created_at);
    let output_path = state.artifact_root.session_dir(&id).join(&filename);

    let encoding = EncodingConfig::default();
    let report = assemble_slideshow(
        frames,
        &settings,
        &encoding,
        &output_path,
        Some(state.config.export_timeout_secs),
    )
    .await
    .map_err(|e| {
        crate::metrics::record_export_failed(preset.as_str());
        ApiError::Media(e)
    })?;

    let size_bytes = tokio::fs::metadata(&output_path)
        .await
        .map_err(|e| ApiError::internal(format!("Artifact metadata unavailable: {}", e)))?
        .len();

    let meta = ExportArtifact {
        id: ArtifactId::new(),
        filename,
        size_bytes,
        frame_count: report.frame_count,
        fps: report.fps,
        skipped,
        created_at,
    };

    // A session swept mid-export leaves the artifact without an owner.
    state
        .sessions
        .add_artifact(
            &id,
            StoredArtifact {
                meta: meta.clone(),
                path: output_path,
            },
        )
        .await
        .map_err(|_| ApiError::not_found("Session not found"))?;

    crate::metrics::record_export(preset.as_str(), report.frame_count);

    info!(
        session_id = %id,
        artifact_id = %meta.id,
        frames = meta.frame_count,
        fps = meta.fps,
        size_bytes = meta.size_bytes,
        skipped = meta.skipped.len(),
        "Export completed"
    );

    Ok(Json(meta))
}

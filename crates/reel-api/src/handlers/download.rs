//! Artifact download handler.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

use reel_models::{ArtifactId, SessionId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Stream an exported MP4, honoring single byte-range requests.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path((session_id, artifact_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let id = SessionId::from_string(session_id);
    let artifact_id = ArtifactId::from_string(artifact_id);

    let artifact = state
        .sessions
        .artifact(&id, &artifact_id)
        .await
        .ok_or_else(|| ApiError::not_found("Artifact not found"))?;

    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(|_| ApiError::not_found("Artifact not found"))?;
    let total_len = bytes.len() as u64;

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| parse_range(s, total_len));

    let disposition = format!("attachment; filename=\"{}\"", artifact.meta.filename);

    let mut response_builder = Response::builder()
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::ACCEPT_RANGES, "bytes")
        .header("Cross-Origin-Resource-Policy", "cross-origin");

    let body = if let Some((start, end)) = range {
        response_builder = response_builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, total_len),
            )
            .header(header::CONTENT_LENGTH, end - start + 1);
        bytes[start as usize..=end as usize].to_vec()
    } else {
        response_builder = response_builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, total_len);
        bytes
    };

    response_builder
        .body(Body::from(body))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

/// Parse a single `bytes=` range against a known length.
///
/// Returns inclusive (start, end). Unparsable or unsatisfiable ranges are
/// ignored; the caller serves the whole file instead.
fn parse_range(value: &str, len: u64) -> Option<(u64, u64)> {
    if len == 0 {
        return None;
    }

    let ranges = value.strip_prefix("bytes=")?;
    // Single range only; multipart ranges are not supported.
    let (start_str, end_str) = ranges.split_once('-')?;

    if start_str.is_empty() {
        // Suffix form: last N bytes
        let suffix: u64 = end_str.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        let start = len.saturating_sub(suffix);
        return Some((start, len - 1));
    }

    let start: u64 = start_str.parse().ok()?;
    if start >= len {
        return None;
    }

    let end = if end_str.is_empty() {
        len - 1
    } else {
        end_str.parse::<u64>().ok()?.min(len - 1)
    };

    if start > end {
        return None;
    }

    Some((start, end))
}

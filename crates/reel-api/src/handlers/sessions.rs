//! Session lifecycle handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use reel_models::{SessionId, SessionSummary};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, StoreError};

/// Create a new editing session.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<Json<SessionSummary>> {
    let summary = state.sessions.create().await;
    crate::metrics::set_active_sessions(state.sessions.len().await);
    info!(session_id = %summary.id, "Session created");
    Ok(Json(summary))
}

/// Session summary.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    let id = SessionId::from_string(session_id);
    state
        .sessions
        .summary(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Session not found"))
}

#[derive(Deserialize)]
pub struct SetOrderRequest {
    /// Full replacement order; must be a permutation of the session's
    /// filenames.
    pub order: Vec<String>,
}

/// Replace the playback order.
///
/// The drag-and-drop frontend always submits the complete arrangement, so
/// anything that is not a permutation of the stored filenames is a client
/// bug and gets a 400; the stored order stays untouched in that case.
pub async fn set_order(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SetOrderRequest>,
) -> ApiResult<Json<SessionSummary>> {
    let id = SessionId::from_string(session_id);

    match state.sessions.set_order(&id, request.order).await {
        Ok(summary) => Ok(Json(summary)),
        Err(StoreError::SessionNotFound) => Err(ApiError::not_found("Session not found")),
        Err(StoreError::NotAPermutation) => Err(ApiError::bad_request(
            "Order must contain each uploaded filename exactly once",
        )),
    }
}

/// Delete a session and its artifacts.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = SessionId::from_string(session_id);

    let removed = state
        .sessions
        .remove(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    // Artifact files go with the session; removal is best effort.
    let session_dir = state.artifact_root.session_dir(&removed.id);
    if session_dir.exists() {
        if let Err(e) = tokio::fs::remove_dir_all(&session_dir).await {
            tracing::warn!(
                session_id = %removed.id,
                error = %e,
                "Failed to remove session artifact directory"
            );
        }
    }

    crate::metrics::set_active_sessions(state.sessions.len().await);
    info!(session_id = %removed.id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

//! Idle session sweeper.
//!
//! Sessions and their artifacts are scoped to the user's visit; anything
//! idle past the TTL is evicted and its artifact files deleted.

use std::time::Duration;

use tracing::{info, warn};

use crate::state::{AppState, StoredSession};

/// Sweep interval.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Background task evicting idle sessions.
pub struct SessionSweeper {
    state: AppState,
}

impl SessionSweeper {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run the sweep loop forever.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }

    /// One sweep pass.
    pub async fn sweep_once(&self) {
        let ttl = chrono::Duration::seconds(self.state.config.session_ttl_secs as i64);
        let removed = self.state.sessions.remove_expired(ttl).await;

        if removed.is_empty() {
            return;
        }

        for session in &removed {
            self.remove_artifacts(session).await;
        }

        crate::metrics::record_sessions_swept(removed.len());
        crate::metrics::set_active_sessions(self.state.sessions.len().await);
        info!(count = removed.len(), "Swept idle sessions");
    }

    async fn remove_artifacts(&self, session: &StoredSession) {
        let dir = self.state.artifact_root.session_dir(&session.id);
        if !dir.exists() {
            return;
        }
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            warn!(
                session_id = %session.id,
                error = %e,
                "Failed to remove artifacts of swept session"
            );
        }
    }
}

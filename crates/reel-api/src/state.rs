//! Application state: in-memory session store and the artifact root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use tokio::sync::RwLock;

use reel_models::{ArtifactId, ExportArtifact, SessionId, SessionSummary, UploadedImage};

use crate::config::ApiConfig;

/// One exported MP4 held for the session.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub meta: ExportArtifact,
    pub path: PathBuf,
}

/// Server-side session state.
#[derive(Debug)]
pub struct StoredSession {
    pub id: SessionId,
    /// Validated uploads keyed by filename.
    pub items: HashMap<String, UploadedImage>,
    /// Current playback order; always a permutation of `items` keys.
    pub order: Vec<String>,
    pub artifacts: HashMap<ArtifactId, StoredArtifact>,
    pub created_at: DateTime<Utc>,
    pub last_touched: DateTime<Utc>,
}

impl StoredSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            items: HashMap::new(),
            order: Vec::new(),
            artifacts: HashMap::new(),
            created_at: now,
            last_touched: now,
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            order: self.order.clone(),
            image_count: self.items.len(),
            artifact_count: self.artifacts.len(),
            created_at: self.created_at,
        }
    }
}

/// Store operation errors.
#[derive(Debug, PartialEq, Eq)]
pub enum StoreError {
    SessionNotFound,
    /// Submitted order is not a permutation of the session's filenames.
    NotAPermutation,
}

/// In-memory session store.
///
/// One process, session-scoped state only; everything here dies with the
/// process or is swept after the idle TTL.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty session.
    pub async fn create(&self) -> SessionSummary {
        let session = StoredSession::new();
        let summary = session.summary();
        self.inner
            .write()
            .await
            .insert(session.id.as_str().to_string(), session);
        summary
    }

    /// Session summary, touching the idle clock.
    pub async fn summary(&self, id: &SessionId) -> Option<SessionSummary> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(id.as_str())?;
        session.last_touched = Utc::now();
        Some(session.summary())
    }

    /// Insert validated uploads. New filenames are appended to the order;
    /// a re-upload of an existing filename replaces the bytes and keeps its
    /// position.
    pub async fn insert_images(
        &self,
        id: &SessionId,
        images: Vec<UploadedImage>,
    ) -> Result<SessionSummary, StoreError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or(StoreError::SessionNotFound)?;

        for image in images {
            if !session.items.contains_key(&image.filename) {
                session.order.push(image.filename.clone());
            }
            session.items.insert(image.filename.clone(), image);
        }

        session.last_touched = Utc::now();
        Ok(session.summary())
    }

    /// Replace the full order. The submitted list must be a permutation of
    /// the session's filenames; on failure the stored order is unchanged.
    pub async fn set_order(
        &self,
        id: &SessionId,
        order: Vec<String>,
    ) -> Result<SessionSummary, StoreError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or(StoreError::SessionNotFound)?;

        if !is_permutation(&order, &session.items) {
            return Err(StoreError::NotAPermutation);
        }

        session.order = order;
        session.last_touched = Utc::now();
        Ok(session.summary())
    }

    /// Snapshot items and order for one export run. The pipeline works on
    /// this copy; the session stays mutable for the next interaction.
    pub async fn export_snapshot(
        &self,
        id: &SessionId,
    ) -> Option<(HashMap<String, UploadedImage>, Vec<String>)> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(id.as_str())?;
        session.last_touched = Utc::now();
        Some((session.items.clone(), session.order.clone()))
    }

    /// Register a finished artifact.
    pub async fn add_artifact(
        &self,
        id: &SessionId,
        artifact: StoredArtifact,
    ) -> Result<(), StoreError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or(StoreError::SessionNotFound)?;
        session
            .artifacts
            .insert(artifact.meta.id.clone(), artifact);
        session.last_touched = Utc::now();
        Ok(())
    }

    /// Look up one artifact.
    pub async fn artifact(
        &self,
        id: &SessionId,
        artifact_id: &ArtifactId,
    ) -> Option<StoredArtifact> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(id.as_str())?;
        session.last_touched = Utc::now();
        session.artifacts.get(artifact_id).cloned()
    }

    /// Remove a session, returning it for resource cleanup.
    pub async fn remove(&self, id: &SessionId) -> Option<StoredSession> {
        self.inner.write().await.remove(id.as_str())
    }

    /// Remove all sessions idle for longer than `ttl`, returning them for
    /// resource cleanup.
    pub async fn remove_expired(&self, ttl: Duration) -> Vec<StoredSession> {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.inner.write().await;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.last_touched < cutoff)
            .map(|(k, _)| k.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|k| sessions.remove(&k))
            .collect()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Check that `order` is a permutation of the map's keys.
fn is_permutation(order: &[String], items: &HashMap<String, UploadedImage>) -> bool {
    if order.len() != items.len() {
        return false;
    }
    let mut seen = std::collections::HashSet::with_capacity(order.len());
    for name in order {
        if !items.contains_key(name) || !seen.insert(name) {
            return false;
        }
    }
    true
}

/// Where exported MP4s live: a fixed directory, or a temp dir tied to the
/// process lifetime.
pub enum ArtifactRoot {
    Fixed(PathBuf),
    Temp(TempDir),
}

impl ArtifactRoot {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactRoot::Fixed(path) => path,
            ArtifactRoot::Temp(dir) => dir.path(),
        }
    }

    /// Directory for one session's artifacts.
    pub fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.path().join(id.as_str())
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub sessions: SessionStore,
    pub artifact_root: Arc<ArtifactRoot>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let artifact_root = match &config.artifact_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                ArtifactRoot::Fixed(dir.clone())
            }
            None => ArtifactRoot::Temp(tempfile::tempdir()?),
        };

        Ok(Self {
            config,
            sessions: SessionStore::new(),
            artifact_root: Arc::new(artifact_root),
        })
    }
}

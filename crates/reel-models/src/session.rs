//! Session and upload models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an exported artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    /// Generate a new random artifact ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArtifactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A validated uploaded image retained for the session.
///
/// Only constructed for inputs that already survived a full decode; the raw
/// bytes are kept so the export pipeline can decode them again when building
/// frames.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original filename, unique key within the session.
    pub filename: String,
    /// Raw uploaded bytes.
    pub bytes: Vec<u8>,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            uploaded_at: Utc::now(),
        }
    }

    /// Size of the stored upload in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Per-file warning for an upload that failed validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadWarning {
    /// Filename of the rejected upload.
    pub filename: String,
    /// Human-readable rejection reason.
    pub reason: String,
}

impl UploadWarning {
    pub fn new(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}

/// Session summary returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionSummary {
    pub id: SessionId,
    /// Filenames in current playback order.
    pub order: Vec<String>,
    /// Number of valid images in the session.
    pub image_count: usize,
    /// Number of artifacts exported so far.
    pub artifact_count: usize,
    pub created_at: DateTime<Utc>,
}

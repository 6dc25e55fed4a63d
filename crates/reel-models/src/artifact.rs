//! Export artifact metadata.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::session::ArtifactId;

/// Filename prefix for exported reels.
pub const ARTIFACT_FILENAME_PREFIX: &str = "twnty_two_hat_";

/// Build the artifact filename for a generation timestamp:
/// `twnty_two_hat_<YYYYMMDDHHMMSS>.mp4`.
pub fn artifact_filename(timestamp: DateTime<Utc>) -> String {
    format!(
        "{}{}.mp4",
        ARTIFACT_FILENAME_PREFIX,
        timestamp.format("%Y%m%d%H%M%S")
    )
}

/// Metadata for one exported MP4.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportArtifact {
    pub id: ArtifactId,
    /// Download filename, `twnty_two_hat_<YYYYMMDDHHMMSS>.mp4`.
    pub filename: String,
    /// Size of the encoded file in bytes.
    pub size_bytes: u64,
    /// Number of encoded frames (doubled when repeat was enabled).
    pub frame_count: usize,
    /// Encoded frame rate (1 / frame duration).
    pub fps: f64,
    /// Files that were skipped during export because they failed to
    /// re-open; each contributed no frame.
    pub skipped: Vec<String>,
    pub created_at: DateTime<Utc>,
}

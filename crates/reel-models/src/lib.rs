//! Shared data models for the TWNTY-TWO reel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Sessions, uploaded images and per-file warnings
//! - Export presets and resolved export settings
//! - Encoding configuration
//! - Export artifacts

pub mod artifact;
pub mod encoding;
pub mod preset;
pub mod session;
pub mod settings;

// Re-export common types
pub use artifact::{artifact_filename, ExportArtifact};
pub use encoding::EncodingConfig;
pub use preset::Preset;
pub use session::{ArtifactId, SessionId, SessionSummary, UploadWarning, UploadedImage};
pub use settings::{ExportRequest, ExportSettings, SettingsError};

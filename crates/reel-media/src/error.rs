//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Watermark compositing failure.
///
/// Compositing is best-effort for the pipeline, but the failure itself is
/// explicit: the caller decides whether to fall back to the original frame.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Watermark target size is degenerate ({width}x{height})")]
    DegenerateTarget { width: u32, height: u32 },

    #[error("Watermark does not fit the frame at the fixed inset")]
    DoesNotFit,

    #[error("Watermark asset decode failed: {0}")]
    AssetDecode(String),
}

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Unable to open image: {filename}")]
    Decode { filename: String, reason: String },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("No valid images uploaded")]
    NoValidInput,

    #[error("No valid images were processed")]
    NoFrames,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Watermark compositing failed: {0}")]
    Composite(#[from] CompositeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a per-file decode error.
    pub fn decode(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#![deny(unreachable_patterns)]
//! Media pipeline for the TWNTY-TWO reel backend.
//!
//! This crate provides:
//! - Upload validation (full decode, PNG/JPEG only)
//! - Ordering of validated uploads
//! - Watermark compositing onto frames via the `image` crate
//! - Type-safe FFmpeg command building and slideshow encoding
//! - Progress parsing from `-progress pipe:2`

pub mod assemble;
pub mod command;
pub mod error;
pub mod fs_utils;
pub mod progress;
pub mod sequence;
pub mod validate;
pub mod watermark;

pub use assemble::{assemble_slideshow, build_fade_filter, stage_frames, AssembleReport};
pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{CompositeError, MediaError, MediaResult};
pub use fs_utils::move_file;
pub use progress::{FfmpegProgress, ProgressCallback};
pub use sequence::sequence_items;
pub use validate::{decode_frame, validate_batch, validate_image};
pub use watermark::{
    apply_watermark, composite_watermark, WatermarkAsset, WatermarkConfig,
    DEFAULT_WATERMARK_PATH, INSET_BOTTOM, INSET_RIGHT, LOGO_WIDTH_RATIO,
};

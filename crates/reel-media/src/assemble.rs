//! Slideshow export assembly.
//!
//! Stages composited frames as a numbered PNG sequence in scratch storage,
//! encodes them with FFmpeg at one encoded frame per still (frame rate =
//! 1 / display duration), and moves the finished MP4 to its final location.
//! Scratch storage is released on every exit path.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbImage;
use tracing::info;

use reel_models::{EncodingConfig, ExportSettings};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;

/// Encoded output name inside the staging directory.
const STAGED_OUTPUT: &str = "out.mp4";

/// Summary of one completed assembly.
#[derive(Debug, Clone)]
pub struct AssembleReport {
    /// Number of encoded frames (doubled when repeat was enabled).
    pub frame_count: usize,
    /// Encoded frame rate.
    pub fps: f64,
    /// Total clip length in seconds.
    pub clip_secs: f64,
}

/// Staged frame filename for an index.
fn frame_filename(index: usize) -> String {
    format!("frame_{:05}.png", index)
}

/// Write the frame sequence into `dir`.
///
/// With `repeat`, the sequence is doubled by copying each staged file to the
/// second-half index: one playthrough followed by an identical second one,
/// never a reverse. Returns the total staged frame count.
pub fn stage_frames(frames: &[RgbImage], repeat: bool, dir: &Path) -> MediaResult<usize> {
    let count = frames.len();

    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_filename(i));
        frame
            .save(&path)
            .map_err(|e| MediaError::internal(format!("Failed to stage frame {}: {}", i, e)))?;
    }

    if repeat {
        for i in 0..count {
            std::fs::copy(dir.join(frame_filename(i)), dir.join(frame_filename(count + i)))?;
        }
    }

    Ok(if repeat { count * 2 } else { count })
}

/// Build the trailing linear fade-to-black filter.
///
/// The fade starts `fade_secs` before the end of the clip; a fade longer
/// than the clip starts at 0 and spans the whole clip.
pub fn build_fade_filter(clip_secs: f64, fade_secs: f64) -> String {
    let start = (clip_secs - fade_secs).max(0.0);
    format!("fade=t=out:st={:.3}:d={:.3}", start, fade_secs)
}

/// Encode an ordered frame sequence into an MP4 at `output_path`.
///
/// Frames are consumed; they exist only for this one export. Encoding
/// either completes or fails as a whole: there is no partial artifact, and
/// the staging directory is dropped regardless of outcome.
pub async fn assemble_slideshow(
    frames: Vec<RgbImage>,
    settings: &ExportSettings,
    encoding: &EncodingConfig,
    output_path: &Path,
    timeout_secs: Option<u64>,
) -> MediaResult<AssembleReport> {
    if frames.is_empty() {
        return Err(MediaError::NoFrames);
    }

    let staging = tempfile::tempdir()?;
    let staging_path: PathBuf = staging.path().to_path_buf();

    let repeat = settings.repeat;
    let frame_count = tokio::task::spawn_blocking(move || {
        stage_frames(&frames, repeat, &staging_path)
    })
    .await
    .map_err(|e| MediaError::internal(format!("Frame staging task failed: {}", e)))??;

    let fps = settings.fps();
    let clip_secs = frame_count as f64 * settings.duration_secs as f64;

    let pattern = staging.path().join("frame_%05d.png");
    let staged_output = staging.path().join(STAGED_OUTPUT);

    let mut cmd = FfmpegCommand::new(&pattern, &staged_output)
        .input_args(["-start_number", "0"])
        .framerate(fps)
        .output_args(encoding.to_ffmpeg_args());

    if let Some(fade_secs) = settings.fade_duration_secs {
        cmd = cmd.video_filter(build_fade_filter(clip_secs, fade_secs as f64));
    }

    cmd = cmd.output_args(["-movflags", "+faststart"]).no_audio();

    info!(
        frames = frame_count,
        fps = fps,
        clip_secs = clip_secs,
        output = %output_path.display(),
        "Encoding slideshow"
    );

    let mut runner = FfmpegRunner::new();
    if let Some(secs) = timeout_secs {
        runner = runner.with_timeout(secs);
    }

    let start = Instant::now();
    runner.run(&cmd).await?;
    metrics::histogram!("reel_ffmpeg_duration_seconds").record(start.elapsed().as_secs_f64());

    move_file(&staged_output, output_path).await?;

    info!(output = %output_path.display(), "Slideshow encoded");

    Ok(AssembleReport {
        frame_count,
        fps,
        clip_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame(r: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([r, 0, 0]))
    }

    #[test]
    fn test_stage_frames_writes_sequence() {
        let dir = TempDir::new().unwrap();
        let count = stage_frames(&[frame(1), frame(2), frame(3)], false, dir.path()).unwrap();

        assert_eq!(count, 3);
        for i in 0..3 {
            assert!(dir.path().join(frame_filename(i)).exists());
        }
        assert!(!dir.path().join(frame_filename(3)).exists());
    }

    #[test]
    fn test_stage_frames_repeat_doubles_count() {
        let dir = TempDir::new().unwrap();
        let count = stage_frames(&[frame(1), frame(2)], true, dir.path()).unwrap();

        assert_eq!(count, 4);
        // Second playthrough is byte-identical, same order (no ping-pong)
        let first = std::fs::read(dir.path().join(frame_filename(0))).unwrap();
        let third = std::fs::read(dir.path().join(frame_filename(2))).unwrap();
        assert_eq!(first, third);
        let second = std::fs::read(dir.path().join(frame_filename(1))).unwrap();
        let fourth = std::fs::read(dir.path().join(frame_filename(3))).unwrap();
        assert_eq!(second, fourth);
    }

    #[test]
    fn test_fade_filter_places_start_before_end() {
        assert_eq!(build_fade_filter(6.0, 1.0), "fade=t=out:st=5.000:d=1.000");
        assert_eq!(build_fade_filter(3.0, 3.0), "fade=t=out:st=0.000:d=3.000");
    }

    #[test]
    fn test_fade_filter_clamps_overlong_fade() {
        // Fade longer than the clip starts at 0 and covers the whole clip
        assert_eq!(build_fade_filter(1.0, 3.0), "fade=t=out:st=0.000:d=3.000");
    }

    #[tokio::test]
    async fn test_assemble_rejects_empty_sequence() {
        let settings = ExportSettings {
            duration_secs: 1.5,
            watermark: false,
            repeat: false,
            fade_duration_secs: None,
        };
        let err = assemble_slideshow(
            Vec::new(),
            &settings,
            &EncodingConfig::default(),
            Path::new("/tmp/never-written.mp4"),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::NoFrames));
    }
}

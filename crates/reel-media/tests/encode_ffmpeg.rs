//! End-to-end encoding tests against a real FFmpeg binary.

use image::RgbImage;
use tempfile::TempDir;

use reel_media::assemble_slideshow;
use reel_models::{EncodingConfig, ExportSettings};

fn frames(n: usize) -> Vec<RgbImage> {
    (0..n)
        .map(|i| RgbImage::from_pixel(64, 48, image::Rgb([(40 * i) as u8, 80, 160])))
        .collect()
}

#[tokio::test]
#[ignore = "requires FFmpeg"]
async fn test_encode_basic_slideshow() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reel.mp4");

    let settings = ExportSettings {
        duration_secs: 0.5,
        watermark: false,
        repeat: false,
        fade_duration_secs: None,
    };

    let report = assemble_slideshow(
        frames(3),
        &settings,
        &EncodingConfig::default(),
        &output,
        Some(120),
    )
    .await
    .expect("encode failed");

    assert_eq!(report.frame_count, 3);
    assert!((report.fps - 2.0).abs() < 1e-9);
    assert!(output.exists());
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[tokio::test]
#[ignore = "requires FFmpeg"]
async fn test_encode_repeat_and_fade() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reel.mp4");

    let settings = ExportSettings {
        duration_secs: 0.5,
        watermark: false,
        repeat: true,
        fade_duration_secs: Some(1.0),
    };

    let report = assemble_slideshow(
        frames(2),
        &settings,
        &EncodingConfig::default(),
        &output,
        Some(120),
    )
    .await
    .expect("encode failed");

    // Repeat doubles the encoded frame count
    assert_eq!(report.frame_count, 4);
    assert!((report.clip_secs - 2.0).abs() < 1e-6);
    assert!(output.exists());
}

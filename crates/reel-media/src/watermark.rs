//! Watermark compositing for exported frames.
//!
//! The brand logo is loaded once per export, shared read-only across all
//! frame compositions, and blended into the bottom-right corner of each
//! frame at a size proportional to the frame width.
//!
//! # Architecture
//!
//! - `WatermarkConfig`: asset path resolution and availability checks
//! - `WatermarkAsset`: the decoded RGBA logo
//! - `composite_watermark`: the compositing step, with explicit errors
//! - `apply_watermark`: policy wrapper choosing fallback-to-original

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::error::CompositeError;

// =============================================================================
// Constants
// =============================================================================

/// Watermark width as a fraction of the frame width.
pub const LOGO_WIDTH_RATIO: f64 = 0.15;

/// Inset from the right edge, pixels.
pub const INSET_RIGHT: u32 = 4;

/// Inset from the bottom edge, pixels.
pub const INSET_BOTTOM: u32 = 2;

/// Default watermark asset path in the production container.
pub const DEFAULT_WATERMARK_PATH: &str = "/app/assets/logo.png";

/// Development fallback paths to check.
const DEV_WATERMARK_PATHS: &[&str] = &["./assets/logo.png", "../assets/logo.png", "logo.png"];

// =============================================================================
// Configuration
// =============================================================================

/// Watermark asset configuration.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Path to the logo image (PNG with transparency).
    pub image_path: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            image_path: resolve_watermark_path(),
        }
    }
}

impl WatermarkConfig {
    /// Create config with a custom image path.
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = path.into();
        self
    }

    /// Check if the watermark image exists.
    pub fn is_available(&self) -> bool {
        Path::new(&self.image_path).exists()
    }
}

/// Resolve the watermark path: env override first, then the production
/// path, then dev fallbacks.
fn resolve_watermark_path() -> String {
    if let Ok(path) = std::env::var("REEL_WATERMARK_PATH") {
        return path;
    }

    if Path::new(DEFAULT_WATERMARK_PATH).exists() {
        return DEFAULT_WATERMARK_PATH.to_string();
    }

    for path in DEV_WATERMARK_PATHS {
        if Path::new(path).exists() {
            debug!(path = path, "Found watermark at dev fallback path");
            return path.to_string();
        }
    }

    // Missing asset disables watermarking downstream rather than erroring.
    DEFAULT_WATERMARK_PATH.to_string()
}

// =============================================================================
// Asset
// =============================================================================

/// The decoded logo, shared read-only across all compositions of one export.
#[derive(Debug, Clone)]
pub struct WatermarkAsset {
    image: RgbaImage,
}

impl WatermarkAsset {
    /// Load the asset if it is present and decodable.
    ///
    /// A missing or unreadable asset silently disables watermarking; that is
    /// an expected state in development, not an error.
    pub fn load(config: &WatermarkConfig) -> Option<Self> {
        if !config.is_available() {
            debug!(
                watermark = %config.image_path,
                "Skipping watermark: asset not found"
            );
            return None;
        }

        match image::open(&config.image_path) {
            Ok(img) => Some(Self {
                image: img.to_rgba8(),
            }),
            Err(e) => {
                debug!(
                    watermark = %config.image_path,
                    error = %e,
                    "Skipping watermark: asset failed to decode"
                );
                None
            }
        }
    }

    /// Build an asset from an already decoded image (tests, embedded logos).
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Logo dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

// =============================================================================
// Compositing
// =============================================================================

/// Composite the logo onto the frame's bottom-right corner.
///
/// Target logo width is 15% of the frame width (integer truncation); height
/// scales by the same ratio. The resized logo is alpha-blended at a fixed
/// inset of 4 px from the right edge and 2 px from the bottom edge, then the
/// result is flattened back to opaque RGB.
///
/// Output dimensions always equal input dimensions. Errors are explicit;
/// the caller chooses whether to fall back to the original frame.
pub fn composite_watermark(
    frame: &RgbImage,
    asset: &WatermarkAsset,
) -> Result<RgbImage, CompositeError> {
    let (frame_w, frame_h) = frame.dimensions();
    let (logo_w, logo_h) = asset.dimensions();

    if logo_w == 0 || logo_h == 0 {
        return Err(CompositeError::AssetDecode("empty logo image".to_string()));
    }

    let target_w = (frame_w as f64 * LOGO_WIDTH_RATIO) as u32;
    let ratio = target_w as f64 / logo_w as f64;
    let target_h = (logo_h as f64 * ratio) as u32;

    if target_w == 0 || target_h == 0 {
        return Err(CompositeError::DegenerateTarget {
            width: target_w,
            height: target_h,
        });
    }

    let pos_x = (frame_w as i64) - (target_w as i64) - (INSET_RIGHT as i64);
    let pos_y = (frame_h as i64) - (target_h as i64) - (INSET_BOTTOM as i64);
    if pos_x < 0 || pos_y < 0 {
        return Err(CompositeError::DoesNotFit);
    }

    let resized = imageops::resize(&asset.image, target_w, target_h, FilterType::Lanczos3);

    let mut canvas: RgbaImage = DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
    imageops::overlay(&mut canvas, &resized, pos_x, pos_y);

    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Apply the watermark as pipeline policy: passthrough when disabled or the
/// asset is absent, and fall back to the unmodified frame on any
/// compositing error. Never fails, never changes frame dimensions.
pub fn apply_watermark(frame: RgbImage, asset: Option<&WatermarkAsset>, enabled: bool) -> RgbImage {
    if !enabled {
        return frame;
    }

    let Some(asset) = asset else {
        return frame;
    };

    match composite_watermark(&frame, asset) {
        Ok(watermarked) => watermarked,
        Err(e) => {
            debug!(error = %e, "Watermark compositing failed, keeping original frame");
            frame
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn blue_frame(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, image::Rgb([0, 0, 255]))
    }

    fn solid_logo(w: u32, h: u32, alpha: u8) -> WatermarkAsset {
        WatermarkAsset::from_image(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, alpha])))
    }

    #[test]
    fn test_composite_preserves_dimensions() {
        let frame = blue_frame(100, 50);
        let out = composite_watermark(&frame, &solid_logo(20, 10, 255)).unwrap();
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn test_composite_places_logo_bottom_right() {
        let frame = blue_frame(100, 50);
        let out = composite_watermark(&frame, &solid_logo(20, 10, 255)).unwrap();

        // target 15x7 at (81, 41): inside is logo red, outside stays blue
        assert_eq!(out.get_pixel(90, 44), &image::Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(10, 10), &image::Rgb([0, 0, 255]));
        assert_eq!(out.get_pixel(99, 49), &image::Rgb([0, 0, 255]));
    }

    #[test]
    fn test_composite_respects_alpha_mask() {
        let frame = blue_frame(100, 50);
        let out = composite_watermark(&frame, &solid_logo(20, 10, 0)).unwrap();
        // Fully transparent logo leaves every pixel untouched
        for (_, _, px) in out.enumerate_pixels() {
            assert_eq!(px, &image::Rgb([0, 0, 255]));
        }
    }

    #[test]
    fn test_composite_degenerate_target_errors() {
        // 15% of 5 px truncates to 0
        let frame = blue_frame(5, 5);
        let err = composite_watermark(&frame, &solid_logo(20, 10, 255)).unwrap_err();
        assert!(matches!(err, CompositeError::DegenerateTarget { .. }));
    }

    #[test]
    fn test_composite_does_not_fit_errors() {
        // target 6x3 but only 4 px of height above the bottom inset
        let frame = blue_frame(40, 4);
        let err = composite_watermark(&frame, &solid_logo(20, 10, 255)).unwrap_err();
        assert!(matches!(err, CompositeError::DoesNotFit));
    }

    #[test]
    fn test_apply_watermark_disabled_passthrough() {
        let frame = blue_frame(100, 50);
        let out = apply_watermark(frame.clone(), Some(&solid_logo(20, 10, 255)), false);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_apply_watermark_missing_asset_passthrough() {
        let frame = blue_frame(100, 50);
        let out = apply_watermark(frame.clone(), None, true);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_apply_watermark_falls_back_on_error() {
        // Degenerate geometry: policy wrapper returns the original frame
        let frame = blue_frame(5, 5);
        let out = apply_watermark(frame.clone(), Some(&solid_logo(20, 10, 255)), true);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_config_not_available_for_missing_path() {
        let config = WatermarkConfig::default().with_image_path("/nonexistent/logo.png");
        assert!(!config.is_available());
        assert!(WatermarkAsset::load(&config).is_none());
    }
}

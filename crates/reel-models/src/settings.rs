//! Export settings.
//!
//! `ExportRequest` is the wire payload; `ExportSettings` is the immutable
//! record resolved from it at the moment the export is triggered. The
//! pipeline only ever sees the resolved record, passed by value.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::preset::Preset;

/// Frame duration slider bounds (custom preset), seconds.
pub const MIN_FRAME_DURATION_SECS: f32 = 0.5;
pub const MAX_FRAME_DURATION_SECS: f32 = 5.0;
/// Default frame duration when the custom slider is untouched.
pub const DEFAULT_FRAME_DURATION_SECS: f32 = 1.5;

/// Fade-out slider bounds, seconds.
pub const MIN_FADE_DURATION_SECS: f32 = 0.5;
pub const MAX_FADE_DURATION_SECS: f32 = 3.0;

/// Settings resolution error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid export settings: {0}")]
    Invalid(String),
}

/// Export request payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate, Default)]
pub struct ExportRequest {
    /// Selected preset.
    #[serde(default)]
    pub preset: Preset,

    /// Frame display time in seconds. Only honored for the `custom` preset.
    #[validate(range(min = 0.5, max = 5.0))]
    #[serde(default)]
    pub duration_secs: Option<f32>,

    /// Watermark toggle. Only honored for the `custom` preset.
    #[serde(default)]
    pub watermark: Option<bool>,

    /// Repeat the full sequence once (one extra identical playthrough).
    #[serde(default)]
    pub repeat: bool,

    /// Trailing fade-out duration in seconds; absent disables the fade.
    #[validate(range(min = 0.5, max = 3.0))]
    #[serde(default)]
    pub fade_duration_secs: Option<f32>,
}

/// Immutable settings record for one export run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExportSettings {
    /// Per-frame display duration in seconds (> 0).
    pub duration_secs: f32,
    /// Whether to composite the brand watermark onto every frame.
    pub watermark: bool,
    /// Whether the frame sequence is doubled before encoding.
    pub repeat: bool,
    /// Trailing linear fade-out to black, in seconds.
    pub fade_duration_secs: Option<f32>,
}

impl ExportSettings {
    /// Resolve the immutable settings record from a request.
    ///
    /// Preset values win over the manual fields; the custom preset falls
    /// back to the slider defaults when a field is absent.
    pub fn resolve(request: &ExportRequest) -> Result<Self, SettingsError> {
        request
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        let (duration_secs, watermark) = match request.preset {
            Preset::Custom => (
                request.duration_secs.unwrap_or(DEFAULT_FRAME_DURATION_SECS),
                request.watermark.unwrap_or(false),
            ),
            preset => (
                preset
                    .duration_secs()
                    .expect("non-custom preset has a fixed duration"),
                preset
                    .watermark()
                    .expect("non-custom preset has a fixed watermark toggle"),
            ),
        };

        Ok(Self {
            duration_secs,
            watermark,
            repeat: request.repeat,
            fade_duration_secs: request.fade_duration_secs,
        })
    }

    /// Output frame rate: each still occupies exactly one encoded frame
    /// held for `duration_secs`.
    pub fn fps(&self) -> f64 {
        1.0 / self.duration_secs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_short_reel_overrides_manual_fields() {
        let request = ExportRequest {
            preset: Preset::ShortReel,
            duration_secs: Some(4.0),
            watermark: Some(false),
            ..Default::default()
        };
        let settings = ExportSettings::resolve(&request).unwrap();
        assert_eq!(settings.duration_secs, 1.5);
        assert!(settings.watermark);
    }

    #[test]
    fn test_resolve_longer_reel() {
        let request = ExportRequest {
            preset: Preset::LongerReel,
            ..Default::default()
        };
        let settings = ExportSettings::resolve(&request).unwrap();
        assert_eq!(settings.duration_secs, 2.2);
        assert!(settings.watermark);
        assert!(!settings.repeat);
        assert!(settings.fade_duration_secs.is_none());
    }

    #[test]
    fn test_resolve_custom_defaults() {
        let request = ExportRequest {
            preset: Preset::Custom,
            ..Default::default()
        };
        let settings = ExportSettings::resolve(&request).unwrap();
        assert_eq!(settings.duration_secs, DEFAULT_FRAME_DURATION_SECS);
        assert!(!settings.watermark);
    }

    #[test]
    fn test_resolve_custom_honors_fields() {
        let request = ExportRequest {
            preset: Preset::Custom,
            duration_secs: Some(0.5),
            watermark: Some(true),
            repeat: true,
            fade_duration_secs: Some(1.0),
        };
        let settings = ExportSettings::resolve(&request).unwrap();
        assert_eq!(settings.duration_secs, 0.5);
        assert!(settings.watermark);
        assert!(settings.repeat);
        assert_eq!(settings.fade_duration_secs, Some(1.0));
    }

    #[test]
    fn test_resolve_rejects_out_of_range_duration() {
        let request = ExportRequest {
            preset: Preset::Custom,
            duration_secs: Some(10.0),
            ..Default::default()
        };
        assert!(ExportSettings::resolve(&request).is_err());
    }

    #[test]
    fn test_resolve_rejects_out_of_range_fade() {
        let request = ExportRequest {
            fade_duration_secs: Some(0.1),
            ..Default::default()
        };
        assert!(ExportSettings::resolve(&request).is_err());
    }

    #[test]
    fn test_fps_is_reciprocal_of_duration() {
        for duration in [0.5f32, 1.0, 1.5, 2.2, 5.0] {
            let settings = ExportSettings {
                duration_secs: duration,
                watermark: false,
                repeat: false,
                fade_duration_secs: None,
            };
            let expected = 1.0 / duration as f64;
            assert!((settings.fps() - expected).abs() < 1e-9);
        }
    }
}

//! Export presets.
//!
//! A preset is a named bundle of default export settings. The two reel
//! presets fix frame duration and force the brand watermark on; `custom`
//! leaves both to the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named export preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Short reel: 1.5 s per frame, watermark on.
    #[default]
    ShortReel,
    /// Longer reel: 2.2 s per frame, watermark on.
    LongerReel,
    /// Caller-supplied duration and watermark toggle.
    Custom,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::ShortReel => "short_reel",
            Preset::LongerReel => "longer_reel",
            Preset::Custom => "custom",
        }
    }

    /// Fixed per-frame duration for non-custom presets.
    pub fn duration_secs(&self) -> Option<f32> {
        match self {
            Preset::ShortReel => Some(1.5),
            Preset::LongerReel => Some(2.2),
            Preset::Custom => None,
        }
    }

    /// Fixed watermark toggle for non-custom presets.
    pub fn watermark(&self) -> Option<bool> {
        match self {
            Preset::ShortReel | Preset::LongerReel => Some(true),
            Preset::Custom => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Preset::ShortReel).unwrap(), "\"short_reel\"");
        let p: Preset = serde_json::from_str("\"longer_reel\"").unwrap();
        assert_eq!(p, Preset::LongerReel);
    }

    #[test]
    fn test_preset_defaults() {
        assert_eq!(Preset::ShortReel.duration_secs(), Some(1.5));
        assert_eq!(Preset::LongerReel.duration_secs(), Some(2.2));
        assert_eq!(Preset::Custom.duration_secs(), None);
        assert_eq!(Preset::ShortReel.watermark(), Some(true));
        assert_eq!(Preset::Custom.watermark(), None);
    }
}

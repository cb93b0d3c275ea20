/// User-tunable settings for the overlay and series navigation
///
/// Serialized to JSON so a host application can persist them between
/// sessions. All defaults match the behavior of the original overlay:
/// 70% opacity, a 5/5 dashed capture-bounds outline in blue, circular
/// navigation, and a 10 second bound on edge extraction.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What happens when navigation runs past either end of the series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Wrap around: previous from the first photo lands on the last.
    #[default]
    Circular,
    /// Stick at the ends: previous from the first photo stays put.
    Clamp,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Opacity applied when compositing the edge mask (0.0 to 1.0)
    pub overlay_opacity: f32,

    /// Dash on/off lengths, in pixels, for the capture-bounds outline
    pub outline_dash: [u32; 2],

    /// Outline stroke width in pixels
    pub outline_width: u32,

    /// Outline color, RGB
    pub outline_color: [u8; 3],

    /// End-of-list behavior for previous/next navigation
    pub wrap_policy: WrapPolicy,

    /// How long to wait for edge extraction before proceeding without
    /// an alignment guide, in seconds
    pub extraction_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overlay_opacity: 0.7,
            outline_dash: [5, 5],
            outline_width: 2,
            outline_color: [0x21, 0x96, 0xf3],
            wrap_policy: WrapPolicy::Circular,
            extraction_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to JSON string for persistence by the host
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from a previously saved JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

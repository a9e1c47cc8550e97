use std::path::Path;

use anyhow::Context as _;

use crate::foundation::color::parse_hex_color;
use crate::foundation::error::{ThumbError, ThumbResult};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Process-level configuration. Every field has a default, so an empty JSON object is valid.
pub struct Settings {
    pub compositor: CompositorSettings,
    pub editor: EditorSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Substitutions the compositor makes instead of failing.
pub struct CompositorSettings {
    /// Family used when a zone's font cannot be measured.
    pub fallback_font: String,
    /// Text color when `color_rules` has neither a match nor a `default`.
    pub default_text_color: String,
    /// Fill for an empty or missing background.
    pub placeholder_color: String,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            fallback_font: "sans-serif".to_string(),
            default_text_color: "#FFFFFF".to_string(),
            placeholder_color: "#1a1a1a".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Interactive editor tuning.
pub struct EditorSettings {
    /// Preview surface width in pixels.
    pub preview_width: f64,
    /// A drawn rectangle must exceed this size (preview pixels) on both axes to commit.
    pub min_draw_px: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            preview_width: 800.0,
            min_draw_px: 20.0,
        }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> ThumbResult<Self> {
        let settings: Settings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> ThumbResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ThumbResult<()> {
        let c = &self.compositor;
        if c.fallback_font.trim().is_empty() {
            return Err(ThumbError::validation(
                "compositor.fallback_font must be non-empty",
            ));
        }
        parse_hex_color(&c.default_text_color).map_err(|e| {
            ThumbError::validation(format!("compositor.default_text_color: {e}"))
        })?;
        parse_hex_color(&c.placeholder_color)
            .map_err(|e| ThumbError::validation(format!("compositor.placeholder_color: {e}")))?;

        let e = &self.editor;
        if !e.preview_width.is_finite() || e.preview_width <= 0.0 {
            return Err(ThumbError::validation(
                "editor.preview_width must be finite and > 0",
            ));
        }
        if !e.min_draw_px.is_finite() || e.min_draw_px < 0.0 {
            return Err(ThumbError::validation(
                "editor.min_draw_px must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ThumbError, ThumbResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Measured single-line run, in pixels.
pub struct TextExtent {
    /// Advance width without letter spacing.
    pub width: f64,
    /// Distance from the baseline to the top of the line's content area.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line's content area.
    pub descent: f64,
}

/// Text measurement seam.
///
/// The compositor only needs single-line advance widths and vertical metrics; shaping engines
/// keep internal caches, hence `&mut self`.
pub trait FontMetrics {
    /// Whether `family` can be measured with real font data.
    fn has_family(&mut self, family: &str) -> bool;

    /// Measure `text` on one line at `size_px`.
    fn measure(&mut self, family: &str, size_px: f64, text: &str) -> TextExtent;
}

/// Deterministic metrics that need no font data.
///
/// Every character advances `advance_em * size`; ascent and descent are fixed fractions of the
/// size. Used in tests and as the fallback for families without registered font bytes.
#[derive(Clone, Debug)]
pub struct ApproxMetrics {
    advance_em: f64,
    ascent_em: f64,
    descent_em: f64,
    families: Option<BTreeSet<String>>,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            advance_em: 0.6,
            ascent_em: 0.8,
            descent_em: 0.2,
            families: None,
        }
    }
}

impl ApproxMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the listed families report as available.
    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: Some(families.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn advance_em(mut self, em: f64) -> Self {
        self.advance_em = em;
        self
    }
}

impl FontMetrics for ApproxMetrics {
    fn has_family(&mut self, family: &str) -> bool {
        self.families
            .as_ref()
            .is_none_or(|known| known.contains(family))
    }

    fn measure(&mut self, _family: &str, size_px: f64, text: &str) -> TextExtent {
        let chars = text.chars().count() as f64;
        TextExtent {
            width: chars * self.advance_em * size_px,
            ascent: self.ascent_em * size_px,
            descent: self.descent_em * size_px,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MeasureBrush;

/// Metrics from real font files shaped with Parley.
///
/// Fonts are registered under an alias (the name templates use, e.g. `Impact`). Families with no
/// registered bytes are measured with [`ApproxMetrics`].
pub struct ParleyMetrics {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MeasureBrush>,
    aliases: BTreeMap<String, String>,
    fallback: ApproxMetrics,
}

impl Default for ParleyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyMetrics {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            aliases: BTreeMap::new(),
            fallback: ApproxMetrics::default(),
        }
    }

    /// Register font bytes under `alias`. Returns the family name found in the font.
    pub fn register_font(&mut self, alias: impl Into<String>, font_bytes: &[u8]) -> ThumbResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ThumbError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ThumbError::validation("registered font family has no name"))?
            .to_string();

        let alias = alias.into();
        tracing::debug!(%alias, family = %family_name, "registered font");
        self.aliases.insert(alias, family_name.clone());
        self.aliases
            .insert(family_name.clone(), family_name.clone());
        Ok(family_name)
    }

    /// Register every `.ttf`/`.otf` file in `dir`, aliased by file stem.
    pub fn register_dir(&mut self, dir: &Path) -> ThumbResult<usize> {
        let mut count = 0;
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read font folder '{}'", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("list '{}'", dir.display()))?
                .path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_font {
                continue;
            }
            let bytes =
                std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
            self.register_font(stem, &bytes)?;
            count += 1;
        }
        Ok(count)
    }
}

impl FontMetrics for ParleyMetrics {
    fn has_family(&mut self, family: &str) -> bool {
        self.aliases.contains_key(family)
    }

    fn measure(&mut self, family: &str, size_px: f64, text: &str) -> TextExtent {
        let Some(family_name) = self.aliases.get(family).cloned() else {
            return self.fallback.measure(family, size_px, text);
        };
        if text.is_empty() || !size_px.is_finite() || size_px <= 0.0 {
            return TextExtent::default();
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(MeasureBrush));

        let mut layout: parley::Layout<MeasureBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut extent = TextExtent::default();
        for line in layout.lines() {
            let m = line.metrics();
            extent.width = extent.width.max(f64::from(m.advance));
            extent.ascent = extent.ascent.max(f64::from(m.ascent));
            extent.descent = extent.descent.max(f64::from(m.descent));
        }
        extent
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/metrics.rs"]
mod tests;

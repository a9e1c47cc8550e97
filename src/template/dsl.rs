use std::collections::BTreeMap;

use crate::{
    foundation::core::Canvas,
    foundation::error::{ThumbError, ThumbResult},
    template::model::{
        BackgroundConfig, BadgeZone, ImageZone, LayoutMode, SelectionPolicy, SubjectConfig,
        Template, TextAlign, TextBackground, TextCase, TextEffects, TextSize, TextVAlign,
        TextZone, Zone, ZonePosition,
    },
    template::zones::ZoneMap,
};

pub struct TemplateBuilder {
    id: String,
    name: String,
    pipeline: String,
    canvas: Canvas,
    background: BackgroundConfig,
    subject: Option<SubjectConfig>,
    zones: ZoneMap,
    overlays: Vec<String>,
}

impl TemplateBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pipeline: pipeline.into(),
            canvas: Canvas::default(),
            background: BackgroundConfig::default(),
            subject: None,
            zones: ZoneMap::new(),
            overlays: Vec::new(),
        }
    }

    pub fn canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn background(mut self, background: BackgroundConfig) -> Self {
        self.background = background;
        self
    }

    pub fn background_image(mut self, reference: impl Into<String>) -> Self {
        self.background.fixed_images.push(reference.into());
        self
    }

    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.background.selection = selection;
        self
    }

    pub fn subject(mut self, subject: SubjectConfig) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn zone(mut self, name: impl Into<String>, zone: Zone) -> ThumbResult<Self> {
        self.zones.insert(name, zone)?;
        Ok(self)
    }

    pub fn overlay(mut self, reference: impl Into<String>) -> Self {
        self.overlays.push(reference.into());
        self
    }

    pub fn build(self) -> ThumbResult<Template> {
        let template = Template {
            canvas: self.canvas,
            background: self.background,
            subject: self.subject,
            zones: self.zones,
            overlays: self.overlays,
            ..Template::new(self.id, self.name, self.pipeline)
        };
        template.validate()?;
        Ok(template)
    }
}

pub fn position(x: i32, y: i32, width: i32, height: i32) -> ZonePosition {
    ZonePosition::new(x, y, width, height)
}

/// Enabled subject with neutral placement.
pub fn subject(image: impl Into<String>) -> SubjectConfig {
    SubjectConfig {
        enabled: true,
        image: image.into(),
        ..SubjectConfig::default()
    }
}

pub fn badge_zone<K, V>(position: ZonePosition, variants: impl IntoIterator<Item = (K, V)>) -> Zone
where
    K: Into<String>,
    V: Into<String>,
{
    Zone::Badge(BadgeZone {
        position,
        variants: collect_pairs(variants),
        visible_when: None,
    })
}

pub fn image_zone<K, V>(position: ZonePosition, mapping: impl IntoIterator<Item = (K, V)>) -> Zone
where
    K: Into<String>,
    V: Into<String>,
{
    Zone::Image(ImageZone {
        position,
        mapping: collect_pairs(mapping),
    })
}

fn collect_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

pub struct TextZoneBuilder {
    zone: TextZone,
}

impl TextZoneBuilder {
    pub fn new(position: ZonePosition) -> Self {
        Self {
            zone: TextZone::new(position),
        }
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.zone.font = font.into();
        self
    }

    pub fn size(mut self, min: u32, max: u32, auto: bool) -> Self {
        self.zone.size = TextSize { min, max, auto };
        self
    }

    pub fn color_rule(mut self, value: impl Into<String>, color: impl Into<String>) -> Self {
        self.zone.color_rules.insert(value.into(), color.into());
        self
    }

    pub fn effects(mut self, effects: TextEffects) -> Self {
        self.zone.effects = effects;
        self
    }

    pub fn layout_mode(mut self, mode: LayoutMode) -> Self {
        self.zone.layout_mode = mode;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.zone.rotation = degrees;
        self
    }

    pub fn align(mut self, align: TextAlign, valign: TextVAlign) -> Self {
        self.zone.align = align;
        self.zone.valign = valign;
        self
    }

    pub fn letter_spacing(mut self, px: f64) -> Self {
        self.zone.letter_spacing = px;
        self
    }

    pub fn line_height(mut self, factor: f64) -> Self {
        self.zone.line_height = factor;
        self
    }

    pub fn stack_gap(mut self, px: f64) -> Self {
        self.zone.stack_gap = px;
        self
    }

    pub fn transform(mut self, case: TextCase) -> Self {
        self.zone.transform = case;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.zone.opacity = opacity;
        self
    }

    pub fn plate(mut self, plate: TextBackground) -> Self {
        self.zone.text_background = plate;
        self
    }

    pub fn build(self) -> ThumbResult<Zone> {
        let z = &self.zone;
        if z.size.min > z.size.max {
            return Err(ThumbError::validation("text size.min must be <= size.max"));
        }
        if !z.line_height.is_finite() || z.line_height <= 0.0 {
            return Err(ThumbError::validation(
                "text line_height must be finite and > 0",
            ));
        }
        Ok(Zone::Text(self.zone))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/dsl.rs"]
mod tests;

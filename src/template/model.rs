use std::collections::BTreeMap;

use crate::{
    foundation::color::parse_hex_color,
    foundation::core::{Canvas, Rect},
    foundation::error::{ThumbError, ThumbResult},
    template::condition::Condition,
    template::zones::ZoneMap,
};

/// Per-render data: zone name -> literal value.
pub type DataRecord = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A reusable thumbnail recipe.
///
/// A template is pure data. It can be:
/// - built programmatically (see [`crate::TemplateBuilder`])
/// - serialized/deserialized via Serde (JSON), which is the wire shape shared with persistence
///
/// Rendering never mutates a template: see [`crate::render`].
pub struct Template {
    /// Persistence identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Pipeline tag the template belongs to.
    pub pipeline: String,
    /// Incremented by persistence on each stored mutation.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Output resolution.
    #[serde(default)]
    pub canvas: Canvas,
    /// Background layer configuration.
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Optional foreground cutout between background and zones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectConfig>,
    /// Named zones in insertion order.
    #[serde(default)]
    pub zones: ZoneMap,
    /// Overlay asset references applied after all zones, in order.
    #[serde(default)]
    pub overlays: Vec<String>,
    /// Creation timestamp, owned by persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last-update timestamp, owned by persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_version() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where the background image comes from.
pub enum BackgroundMode {
    /// One of `fixed_images`, chosen by [`SelectionPolicy`].
    #[default]
    Fixed,
    /// Generated externally from [`AiConfig`]; the result becomes a fixed image.
    Ai,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Policy for picking among several fixed background images.
pub enum SelectionPolicy {
    /// Always index 0.
    #[default]
    First,
    /// `render_count % len`.
    Rotate,
    /// Uniform pick derived from the render seed.
    Random,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Prompt settings for externally generated backgrounds.
pub struct AiConfig {
    /// Prompt with `{field}` placeholders filled from the data record.
    #[serde(default)]
    pub prompt_template: String,
    /// Things the generator should avoid.
    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,
    /// Prompt used when the template is empty or cannot be filled.
    #[serde(default = "default_fallback_prompt")]
    pub fallback_prompt: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            prompt_template: String::new(),
            negative_prompt: default_negative_prompt(),
            fallback_prompt: default_fallback_prompt(),
        }
    }
}

fn default_negative_prompt() -> String {
    "text, words, watermark, blurry".to_string()
}

fn default_fallback_prompt() -> String {
    "abstract dark background".to_string()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Request handed to the external background generator.
pub struct GenerationRequest {
    /// Fully resolved prompt.
    pub prompt: String,
    /// Negative prompt, passed through.
    pub negative_prompt: String,
    /// Requested width (canvas width).
    pub width: u32,
    /// Requested height (canvas height).
    pub height: u32,
}

impl AiConfig {
    /// Resolve the prompt for one render. Falls back to `fallback_prompt` when the template is
    /// blank, malformed, or references a field missing from `data`.
    pub fn generation_request(&self, data: &DataRecord, canvas: Canvas) -> GenerationRequest {
        let prompt = fill_placeholders(&self.prompt_template, data)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.fallback_prompt.clone());
        GenerationRequest {
            prompt,
            negative_prompt: self.negative_prompt.clone(),
            width: canvas.width,
            height: canvas.height,
        }
    }
}

// `{name}` substitution with `{{`/`}}` escapes.
fn fill_placeholders(template: &str, data: &DataRecord) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return None,
                    }
                }
                out.push_str(data.get(name.trim())?);
            }
            '}' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Background layer: image source plus pan/zoom placement.
pub struct BackgroundConfig {
    /// Image source mode.
    #[serde(default)]
    pub mode: BackgroundMode,
    /// Ordered fixed image references.
    #[serde(default, alias = "images")]
    pub fixed_images: Vec<String>,
    /// Selection policy among `fixed_images`.
    #[serde(default)]
    pub selection: SelectionPolicy,
    /// Generation settings for [`BackgroundMode::Ai`].
    #[serde(default)]
    pub ai_config: AiConfig,
    /// Horizontal offset of the image center from the canvas center, canvas pixels.
    #[serde(default)]
    pub offset_x: i32,
    /// Vertical offset of the image center from the canvas center, canvas pixels.
    #[serde(default)]
    pub offset_y: i32,
    /// Zoom; `1.0` fills the canvas exactly.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::Fixed,
            fixed_images: Vec::new(),
            selection: SelectionPolicy::First,
            ai_config: AiConfig::default(),
            offset_x: 0,
            offset_y: 0,
            scale: default_scale(),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Foreground cutout layer.
pub struct SubjectConfig {
    /// Disabled subjects contribute nothing.
    #[serde(default)]
    pub enabled: bool,
    /// Asset reference of the cutout image.
    #[serde(default)]
    pub image: String,
    /// Horizontal offset from the canvas center, canvas pixels.
    #[serde(default)]
    pub offset_x: i32,
    /// Vertical offset from the canvas center, canvas pixels.
    #[serde(default)]
    pub offset_y: i32,
    /// Multiplier on the image's natural size.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Mirror around the subject's own center.
    #[serde(default)]
    pub flip_horizontal: bool,
    /// Whole-layer opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            image: String::new(),
            offset_x: 0,
            offset_y: 0,
            scale: default_scale(),
            flip_horizontal: false,
            opacity: default_opacity(),
        }
    }
}

impl SubjectConfig {
    /// Enabled and pointing at an image.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.image.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Zone layout box in canvas pixels. Defines the layout area, never the glyph bounds.
pub struct ZonePosition {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ZonePosition {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// A named region filled per render from the data record.
pub enum Zone {
    /// Styled text.
    Text(TextZone),
    /// Variant graphic chosen by data value.
    Badge(BadgeZone),
    /// Image chosen by data value, stretched to the zone box.
    Image(ImageZone),
}

impl Zone {
    pub fn position(&self) -> &ZonePosition {
        match self {
            Self::Text(z) => &z.position,
            Self::Badge(z) => &z.position,
            Self::Image(z) => &z.position,
        }
    }

    pub fn position_mut(&mut self) -> &mut ZonePosition {
        match self {
            Self::Text(z) => &mut z.position,
            Self::Badge(z) => &mut z.position,
            Self::Image(z) => &mut z.position,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Badge(_) => "badge",
            Self::Image(_) => "image",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Font size bounds. With `auto`, the largest size in `[min, max]` that fits is used.
pub struct TextSize {
    #[serde(default = "default_size_min")]
    pub min: u32,
    #[serde(default = "default_size_max")]
    pub max: u32,
    #[serde(default = "default_true")]
    pub auto: bool,
}

impl Default for TextSize {
    fn default() -> Self {
        Self {
            min: default_size_min(),
            max: default_size_max(),
            auto: true,
        }
    }
}

fn default_size_min() -> u32 {
    48
}

fn default_size_max() -> u32 {
    96
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Outline and drop shadow settings.
pub struct TextEffects {
    #[serde(default = "default_black")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_black")]
    pub shadow_color: String,
    #[serde(default = "default_shadow_blur")]
    pub shadow_blur: u32,
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: [i32; 2],
}

impl Default for TextEffects {
    fn default() -> Self {
        Self {
            stroke_color: default_black(),
            stroke_width: default_stroke_width(),
            shadow_color: default_black(),
            shadow_blur: default_shadow_blur(),
            shadow_offset: default_shadow_offset(),
        }
    }
}

fn default_black() -> String {
    "#000000".to_string()
}

fn default_stroke_width() -> u32 {
    4
}

fn default_shadow_blur() -> u32 {
    8
}

fn default_shadow_offset() -> [i32; 2] {
    [2, 2]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How a text value is split into display units.
pub enum LayoutMode {
    /// One unit, laid out in a row.
    #[default]
    Horizontal,
    /// One unit per whitespace-separated word, stacked vertically.
    StackedWords,
    /// One unit per character, stacked vertically.
    StackedChars,
    /// One unit, rotated rigidly around the block center.
    Rotated,
}

impl LayoutMode {
    pub fn is_stacked(self) -> bool {
        matches!(self, Self::StackedWords | Self::StackedChars)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal alignment.
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Vertical alignment.
pub enum TextVAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Case transform applied before layout.
pub enum TextCase {
    #[default]
    #[serde(rename = "none")]
    AsIs,
    Uppercase,
    Lowercase,
}

impl TextCase {
    pub fn apply(self, s: &str) -> String {
        match self {
            Self::AsIs => s.to_string(),
            Self::Uppercase => s.to_uppercase(),
            Self::Lowercase => s.to_lowercase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Plate drawn behind the laid-out text block.
pub struct TextBackground {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_black")]
    pub color: String,
    #[serde(default = "default_plate_opacity")]
    pub opacity: f64,
    #[serde(default = "default_plate_padding")]
    pub padding: u32,
    #[serde(default)]
    pub border_radius: u32,
}

impl Default for TextBackground {
    fn default() -> Self {
        Self {
            enabled: false,
            color: default_black(),
            opacity: default_plate_opacity(),
            padding: default_plate_padding(),
            border_radius: 0,
        }
    }
}

fn default_plate_opacity() -> f64 {
    0.7
}

fn default_plate_padding() -> u32 {
    20
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Text zone definition.
pub struct TextZone {
    /// Layout box.
    pub position: ZonePosition,
    /// Font family reference.
    #[serde(default = "default_font")]
    pub font: String,
    /// Size bounds and auto-fit flag.
    #[serde(default)]
    pub size: TextSize,
    /// Raw data value -> color, with a `default` fallback key.
    #[serde(default = "default_color_rules")]
    pub color_rules: BTreeMap<String, String>,
    /// Stroke and shadow.
    #[serde(default)]
    pub effects: TextEffects,
    /// Unit partitioning.
    #[serde(default)]
    pub layout_mode: LayoutMode,
    /// Degrees; only used by [`LayoutMode::Rotated`].
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub valign: TextVAlign,
    /// Extra pixels after each character.
    #[serde(default)]
    pub letter_spacing: f64,
    /// Line box height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Extra pixels between stacked units.
    #[serde(default)]
    pub stack_gap: f64,
    #[serde(default)]
    pub transform: TextCase,
    /// Zone-wide opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub text_background: TextBackground,
}

fn default_font() -> String {
    "Impact".to_string()
}

fn default_color_rules() -> BTreeMap<String, String> {
    BTreeMap::from([("default".to_string(), "#FFFFFF".to_string())])
}

fn default_line_height() -> f64 {
    1.2
}

impl TextZone {
    /// A text zone with the authoring defaults.
    pub fn new(position: ZonePosition) -> Self {
        Self {
            position,
            font: default_font(),
            size: TextSize::default(),
            color_rules: default_color_rules(),
            effects: TextEffects::default(),
            layout_mode: LayoutMode::Horizontal,
            rotation: 0.0,
            align: TextAlign::Center,
            valign: TextVAlign::Middle,
            letter_spacing: 0.0,
            line_height: default_line_height(),
            stack_gap: 0.0,
            transform: TextCase::AsIs,
            opacity: default_opacity(),
            text_background: TextBackground::default(),
        }
    }

    /// Color for a raw (pre-transform) data value: exact rule, then `default`.
    pub fn color_for(&self, raw_value: &str) -> Option<&str> {
        self.color_rules
            .get(raw_value)
            .or_else(|| self.color_rules.get("default"))
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Badge zone: data value -> variant id.
pub struct BadgeZone {
    pub position: ZonePosition,
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
    /// Condition over data values; the badge is omitted when it evaluates false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Image zone: data value -> asset reference.
pub struct ImageZone {
    pub position: ZonePosition,
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// Lookup with a `default` fallback key, shared by badge variants and image mappings.
pub(crate) fn lookup_with_default<'a>(
    map: &'a BTreeMap<String, String>,
    value: &str,
) -> Option<&'a str> {
    map.get(value)
        .or_else(|| map.get("default"))
        .map(String::as_str)
}

impl Template {
    /// An empty template: default 1280x720 canvas, no zones.
    pub fn new(id: impl Into<String>, name: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pipeline: pipeline.into(),
            version: default_version(),
            canvas: Canvas::default(),
            background: BackgroundConfig::default(),
            subject: None,
            zones: ZoneMap::new(),
            overlays: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Parse the wire shape and validate it.
    pub fn from_json(s: &str) -> ThumbResult<Self> {
        let template: Template = serde_json::from_str(s)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json_pretty(&self) -> ThumbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.get(name)
    }

    /// Validate template invariants. Render assumes a validated template.
    pub fn validate(&self) -> ThumbResult<()> {
        if self.id.trim().is_empty() {
            return Err(ThumbError::validation("template id must be non-empty"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ThumbError::validation("canvas width/height must be > 0"));
        }

        let bg = &self.background;
        validate_scale(bg.scale, "background scale")?;
        for image in &bg.fixed_images {
            validate_ref(image, "background fixed_images entry")?;
        }

        if let Some(subject) = &self.subject {
            validate_scale(subject.scale, "subject scale")?;
            validate_unit(subject.opacity, "subject opacity")?;
        }

        for (name, zone) in &self.zones {
            if name.trim().is_empty() {
                return Err(ThumbError::validation("zone name must be non-empty"));
            }
            validate_zone(name, zone)?;
        }

        for overlay in &self.overlays {
            validate_ref(overlay, "overlay entry")?;
        }
        Ok(())
    }
}

fn validate_zone(name: &str, zone: &Zone) -> ThumbResult<()> {
    let pos = zone.position();
    if pos.width < 0 || pos.height < 0 {
        return Err(ThumbError::validation(format!(
            "zone '{name}' position width/height must be >= 0"
        )));
    }

    match zone {
        Zone::Text(z) => {
            if z.size.max == 0 {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' size.max must be > 0"
                )));
            }
            if z.size.min > z.size.max {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' size.min must be <= size.max"
                )));
            }
            for (key, color) in &z.color_rules {
                parse_hex_color(color).map_err(|e| {
                    ThumbError::validation(format!("zone '{name}' color_rules['{key}']: {e}"))
                })?;
            }
            for (field, color) in [
                ("effects.stroke_color", &z.effects.stroke_color),
                ("effects.shadow_color", &z.effects.shadow_color),
                ("text_background.color", &z.text_background.color),
            ] {
                parse_hex_color(color)
                    .map_err(|e| ThumbError::validation(format!("zone '{name}' {field}: {e}")))?;
            }
            if !z.rotation.is_finite() {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' rotation must be finite"
                )));
            }
            if !z.letter_spacing.is_finite() {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' letter_spacing must be finite"
                )));
            }
            if !z.line_height.is_finite() || z.line_height <= 0.0 {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' line_height must be finite and > 0"
                )));
            }
            if !z.stack_gap.is_finite() || z.stack_gap < 0.0 {
                return Err(ThumbError::validation(format!(
                    "zone '{name}' stack_gap must be finite and >= 0"
                )));
            }
            validate_unit(z.opacity, &format!("zone '{name}' opacity"))?;
            validate_unit(
                z.text_background.opacity,
                &format!("zone '{name}' text_background.opacity"),
            )?;
        }
        Zone::Badge(z) => {
            for (key, variant) in &z.variants {
                validate_ref(variant, &format!("zone '{name}' variants['{key}']"))?;
            }
            if let Some(cond) = &z.visible_when {
                Condition::parse(cond).map_err(|e| {
                    ThumbError::validation(format!("zone '{name}' visible_when: {e}"))
                })?;
            }
        }
        Zone::Image(z) => {
            for (key, asset) in &z.mapping {
                validate_ref(asset, &format!("zone '{name}' mapping['{key}']"))?;
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_scale(value: f64, field: &str) -> ThumbResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ThumbError::validation(format!(
            "{field} must be finite and >= 0"
        )));
    }
    Ok(())
}

fn validate_unit(value: f64, field: &str) -> ThumbResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ThumbError::validation(format!("{field} must be in [0, 1]")));
    }
    Ok(())
}

fn validate_ref(reference: &str, field: &str) -> ThumbResult<()> {
    if reference.trim().is_empty() {
        return Err(ThumbError::validation(format!("{field} must be non-empty")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;

use crate::{
    assets::catalog::{AssetCatalog, AssetKind},
    compile::placement::{
        background_placement, cover_rect, subject_bounds, subject_transform, visible_region,
    },
    foundation::color::parse_hex_color,
    foundation::core::{Affine, Canvas, Rect, Rgba8, Size, Vec2},
    foundation::math::seeded_index,
    layout::text::{LaidUnit, layout_text_zone, plate_rect, stroke_offsets},
    settings::CompositorSettings,
    template::condition::Condition,
    template::model::{
        BadgeZone, DataRecord, ImageZone, SelectionPolicy, Template, TextZone, Zone,
        lookup_with_default,
    },
    text::metrics::FontMetrics,
    transform::preview::PreviewSpace,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Backend-agnostic description of one thumbnail, in canvas pixels.
///
/// Draw order is `background`, `subject`, `zones` (template order), then `overlays`.
pub struct RenderPlan {
    pub canvas: Canvas,
    pub background: BackgroundPlan,
    pub subject: Option<SubjectPlan>,
    pub zones: Vec<ZonePlan>,
    pub overlays: Vec<OverlayPlan>,
}

impl RenderPlan {
    /// Canvas -> preview transform for drawing this plan on a preview surface.
    pub fn preview_transform(&self, space: &PreviewSpace) -> Affine {
        space.affine()
    }

    pub fn zone(&self, name: &str) -> Option<&ZonePlan> {
        self.zones.iter().find(|z| z.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Source color plus its parsed straight-alpha value.
pub struct ResolvedColor {
    pub source: String,
    pub rgba: Rgba8,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundPlan {
    /// No image configured; fill the canvas with `fill`.
    Empty { fill: Rgba8 },
    /// The selected reference is not in the asset store; fill with the placeholder.
    Missing { reference: String, fill: Rgba8 },
    Image(BackgroundImage),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BackgroundImage {
    pub reference: String,
    /// Index in `fixed_images`, or `None` for an override.
    pub selected_index: Option<usize>,
    /// Placement box (canvas size times scale, offset from center).
    pub placement: Rect,
    /// Where the whole image lands (cover fit inside `placement`).
    pub image_rect: Rect,
    /// Clip rectangle: `placement` intersected with the canvas.
    pub visible: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SubjectPlan {
    pub reference: String,
    /// Subject-local (origin at the image center) to canvas transform.
    pub transform: Affine,
    pub natural: Option<Size>,
    pub bounds: Option<Rect>,
    pub flip_horizontal: bool,
    pub opacity: f64,
    pub missing: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ZonePlan {
    pub name: String,
    /// Zone layout box.
    pub area: Rect,
    pub content: ZoneContent,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneContent {
    Text(TextPlan),
    Badge(BadgePlan),
    Image(ImagePlan),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Fully resolved text zone.
///
/// Element colors carry only their own alpha. `opacity` applies to the zone as a group: draw
/// plate, shadow, stroke copies and fill into one layer, then composite that layer at `opacity`.
pub struct TextPlan {
    /// Display string after the case transform.
    pub text: String,
    pub requested_font: String,
    pub font_family: String,
    pub font_fallback: bool,
    pub font_size: f64,
    pub letter_spacing: f64,
    /// Group alpha for the whole zone.
    pub opacity: f64,
    pub fill: ResolvedColor,
    pub units: Vec<LaidUnit>,
    pub block: Rect,
    pub rotation_deg: f64,
    pub transform: Affine,
    pub bounds: Rect,
    pub overflow: bool,
    pub stroke: Option<StrokePlan>,
    pub shadow: Option<ShadowPlan>,
    pub plate: Option<PlatePlan>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Outline drawn as eight offset copies of the glyph run, underneath the fill.
pub struct StrokePlan {
    pub color: ResolvedColor,
    pub width: f64,
    pub offsets: [Vec2; 8],
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShadowPlan {
    pub color: ResolvedColor,
    pub blur: f64,
    pub offset: Vec2,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Rounded rectangle behind the text block, in block-local space (apply the text transform).
pub struct PlatePlan {
    pub rect: Rect,
    pub color: ResolvedColor,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BadgePlan {
    pub value: String,
    pub variant: String,
    pub missing: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Image stretched to the zone box.
pub struct ImagePlan {
    pub value: String,
    pub reference: String,
    pub missing: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayPlan {
    /// Radial darkening toward the corners.
    Vignette { strength: f64 },
    /// Per-pixel noise.
    Grain { amount: f64 },
    /// Overlay image drawn over the whole canvas.
    Asset { reference: String, missing: bool },
}

/// Everything a render needs besides the template and its data.
///
/// Selection state (`render_count`, `seed`) is passed in so that renders stay reproducible.
pub struct RenderContext<'a> {
    assets: &'a dyn AssetCatalog,
    metrics: &'a mut dyn FontMetrics,
    settings: CompositorSettings,
    render_count: u64,
    seed: u64,
    background_override: Option<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(assets: &'a dyn AssetCatalog, metrics: &'a mut dyn FontMetrics) -> Self {
        Self {
            assets,
            metrics,
            settings: CompositorSettings::default(),
            render_count: 0,
            seed: 0,
            background_override: None,
        }
    }

    pub fn settings(mut self, settings: CompositorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Counter used by the `rotate` selection policy.
    pub fn render_count(mut self, n: u64) -> Self {
        self.render_count = n;
        self
    }

    /// Seed used by the `random` selection policy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Background reference that wins over the selection policy (e.g. a generated image).
    pub fn background_override(mut self, reference: Option<String>) -> Self {
        self.background_override = reference.filter(|r| !r.trim().is_empty());
        self
    }
}

/// Resolve `template` with `data` into a [`RenderPlan`].
///
/// The template is assumed valid (see [`Template::validate`]). Missing assets and fonts are
/// substituted, never reported as errors.
#[tracing::instrument(skip(template, data, ctx), fields(template = %template.id))]
pub fn render(template: &Template, data: &DataRecord, ctx: &mut RenderContext<'_>) -> RenderPlan {
    let background = resolve_background(template, ctx);
    let subject = resolve_subject(template, ctx);

    let mut zones = Vec::with_capacity(template.zones.len());
    for (name, zone) in &template.zones {
        let value = data.get(name).map(String::as_str).unwrap_or("");
        let content = match zone {
            Zone::Text(z) => resolve_text(name, z, value, ctx).map(ZoneContent::Text),
            Zone::Badge(z) => resolve_badge(name, z, value, data, ctx).map(ZoneContent::Badge),
            Zone::Image(z) => resolve_image(name, z, value, ctx).map(ZoneContent::Image),
        };
        if let Some(content) = content {
            zones.push(ZonePlan {
                name: name.to_string(),
                area: zone.position().rect(),
                content,
            });
        }
    }

    let overlays = template
        .overlays
        .iter()
        .map(|o| resolve_overlay(o, ctx))
        .collect();

    RenderPlan {
        canvas: template.canvas,
        background,
        subject,
        zones,
        overlays,
    }
}

fn resolve_color(source: &str, fallback: &str, alpha: f64) -> ResolvedColor {
    let (source, rgba) = match parse_hex_color(source) {
        Ok(c) => (source.to_string(), c),
        Err(_) => match parse_hex_color(fallback) {
            Ok(c) => (fallback.to_string(), c),
            Err(_) => ("#FFFFFF".to_string(), Rgba8::WHITE),
        },
    };
    ResolvedColor {
        source,
        rgba: rgba.with_alpha_mul(alpha),
    }
}

fn placeholder_fill(ctx: &RenderContext<'_>) -> Rgba8 {
    parse_hex_color(&ctx.settings.placeholder_color).unwrap_or(Rgba8::opaque(0x1a, 0x1a, 0x1a))
}

fn resolve_background(template: &Template, ctx: &RenderContext<'_>) -> BackgroundPlan {
    let bg = &template.background;
    let (reference, selected_index) = match &ctx.background_override {
        Some(r) => (r.clone(), None),
        None => {
            let images = &bg.fixed_images;
            if images.is_empty() {
                return BackgroundPlan::Empty {
                    fill: placeholder_fill(ctx),
                };
            }
            let idx = match bg.selection {
                SelectionPolicy::First => 0,
                SelectionPolicy::Rotate => (ctx.render_count % images.len() as u64) as usize,
                SelectionPolicy::Random => seeded_index(ctx.seed, images.len()),
            };
            (images[idx].clone(), Some(idx))
        }
    };

    let probe = ctx.assets.probe(AssetKind::Background, &reference);
    if !probe.is_present() {
        tracing::debug!(%reference, "background asset missing, using placeholder");
        return BackgroundPlan::Missing {
            reference,
            fill: placeholder_fill(ctx),
        };
    }

    let placement = background_placement(template.canvas, bg.offset_x, bg.offset_y, bg.scale);
    let image_rect = match probe.natural() {
        Some(natural) => cover_rect(placement, natural),
        None => placement,
    };
    BackgroundPlan::Image(BackgroundImage {
        reference,
        selected_index,
        placement,
        image_rect,
        visible: visible_region(template.canvas, placement),
    })
}

fn resolve_subject(template: &Template, ctx: &RenderContext<'_>) -> Option<SubjectPlan> {
    let subject = template.subject.as_ref().filter(|s| s.is_active())?;
    let probe = ctx.assets.probe(AssetKind::Subject, &subject.image);
    let missing = !probe.is_present();
    if missing {
        tracing::debug!(reference = %subject.image, "subject asset missing, using placeholder");
    }
    let transform = subject_transform(template.canvas, subject);
    let natural = probe.natural();
    Some(SubjectPlan {
        reference: subject.image.clone(),
        transform,
        natural,
        bounds: natural.map(|n| subject_bounds(transform, n)),
        flip_horizontal: subject.flip_horizontal,
        opacity: subject.opacity,
        missing,
    })
}

fn resolve_text(
    name: &str,
    zone: &TextZone,
    value: &str,
    ctx: &mut RenderContext<'_>,
) -> Option<TextPlan> {
    if value.is_empty() {
        return None;
    }
    let text = zone.transform.apply(value);

    let font_fallback = !ctx.metrics.has_family(&zone.font);
    let family = if font_fallback {
        tracing::debug!(zone = name, font = %zone.font, fallback = %ctx.settings.fallback_font, "font unavailable");
        ctx.settings.fallback_font.clone()
    } else {
        zone.font.clone()
    };

    let block = layout_text_zone(zone, &text, &family, &mut *ctx.metrics)?;
    if block.overflow {
        tracing::debug!(zone = name, size = block.font_size, "text overflows zone");
    }

    let default_color = ctx.settings.default_text_color.as_str();
    let fill = resolve_color(
        zone.color_for(value).unwrap_or(default_color),
        default_color,
        1.0,
    );

    let fx = &zone.effects;
    let stroke = (fx.stroke_width > 0).then(|| StrokePlan {
        color: resolve_color(&fx.stroke_color, "#000000", 1.0),
        width: f64::from(fx.stroke_width),
        offsets: stroke_offsets(f64::from(fx.stroke_width)),
    });
    let shadow_offset = Vec2::new(
        f64::from(fx.shadow_offset[0]),
        f64::from(fx.shadow_offset[1]),
    );
    let shadow = (fx.shadow_blur > 0 || shadow_offset != Vec2::ZERO).then(|| ShadowPlan {
        color: resolve_color(&fx.shadow_color, "#000000", 1.0),
        blur: f64::from(fx.shadow_blur),
        offset: shadow_offset,
    });

    let tb = &zone.text_background;
    let plate = tb.enabled.then(|| PlatePlan {
        rect: plate_rect(block.block, f64::from(tb.padding)),
        color: resolve_color(&tb.color, "#000000", tb.opacity),
        radius: f64::from(tb.border_radius),
    });

    Some(TextPlan {
        text,
        requested_font: zone.font.clone(),
        font_family: family,
        font_fallback,
        font_size: block.font_size,
        letter_spacing: zone.letter_spacing,
        opacity: zone.opacity,
        fill,
        units: block.units,
        block: block.block,
        rotation_deg: block.rotation_deg,
        transform: block.transform,
        bounds: block.bounds,
        overflow: block.overflow,
        stroke,
        shadow,
        plate,
    })
}

fn resolve_badge(
    name: &str,
    zone: &BadgeZone,
    value: &str,
    data: &DataRecord,
    ctx: &RenderContext<'_>,
) -> Option<BadgePlan> {
    if let Some(src) = &zone.visible_when {
        match Condition::parse(src) {
            Ok(cond) if cond.evaluate(data) => {}
            Ok(_) => return None,
            Err(err) => {
                tracing::debug!(zone = name, error = %err, "unparseable visible_when, hiding badge");
                return None;
            }
        }
    }
    let variant = lookup_with_default(&zone.variants, value)?;
    let missing = !ctx.assets.probe(AssetKind::Badge, variant).is_present();
    if missing {
        tracing::debug!(zone = name, %variant, "badge asset missing, using placeholder");
    }
    Some(BadgePlan {
        value: value.to_string(),
        variant: variant.to_string(),
        missing,
    })
}

fn resolve_image(
    name: &str,
    zone: &ImageZone,
    value: &str,
    ctx: &RenderContext<'_>,
) -> Option<ImagePlan> {
    let reference = lookup_with_default(&zone.mapping, value)?;
    let missing = !ctx.assets.probe(AssetKind::Image, reference).is_present();
    if missing {
        tracing::debug!(zone = name, %reference, "image asset missing, using placeholder");
    }
    Some(ImagePlan {
        value: value.to_string(),
        reference: reference.to_string(),
        missing,
    })
}

fn resolve_overlay(reference: &str, ctx: &RenderContext<'_>) -> OverlayPlan {
    match reference {
        "vignette" => OverlayPlan::Vignette { strength: 0.5 },
        "vignette_subtle" => OverlayPlan::Vignette { strength: 0.3 },
        "grain" => OverlayPlan::Grain { amount: 0.1 },
        _ => OverlayPlan::Asset {
            reference: reference.to_string(),
            missing: !ctx.assets.probe(AssetKind::Overlay, reference).is_present(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;

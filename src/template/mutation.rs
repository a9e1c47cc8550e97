//! Template mutations.
//!
//! `apply_edit` and `resize_canvas` return a new validated snapshot and leave `self` alone; the
//! `&mut self` helpers edit in place, so callers that share snapshots clone first.

use crate::{
    foundation::core::Canvas,
    foundation::error::{ThumbError, ThumbResult},
    foundation::math::round_i32,
    template::model::{
        BackgroundMode, SubjectConfig, Template, TextZone, Zone, ZonePosition, validate_scale,
    },
};

/// Geometry used for freshly added text zones.
pub const DEFAULT_ZONE_POSITION: ZonePosition = ZonePosition {
    x: 50,
    y: 500,
    width: 1180,
    height: 150,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// A pannable/zoomable image layer.
pub enum Layer {
    Background,
    Subject,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// A single committed change produced by the edit controller.
pub enum TemplateEdit {
    /// Replace a zone's layout box (canvas pixels).
    SetZonePosition { zone: String, position: ZonePosition },
    /// Replace a layer's center offset (canvas pixels).
    SetLayerOffset { layer: Layer, x: i32, y: i32 },
    /// Replace a layer's zoom.
    SetLayerScale { layer: Layer, scale: f64 },
    /// Offset back to `(0, 0)` and scale back to `1.0`.
    ResetLayer { layer: Layer },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// What to do with zone geometry when the canvas changes size.
pub enum CanvasResize {
    /// Refuse to resize a template that already has zones.
    #[default]
    Reject,
    /// Scale zone boxes and layer offsets proportionally.
    Rescale,
}

impl Template {
    /// Apply one edit and return the resulting snapshot. `self` is left untouched.
    pub fn apply_edit(&self, edit: &TemplateEdit) -> ThumbResult<Template> {
        let mut next = self.clone();
        match edit {
            TemplateEdit::SetZonePosition { zone, position } => {
                let z = next
                    .zones
                    .get_mut(zone)
                    .ok_or_else(|| ThumbError::edit(format!("unknown zone '{zone}'")))?;
                *z.position_mut() = *position;
            }
            TemplateEdit::SetLayerOffset { layer, x, y } => match layer {
                Layer::Background => {
                    next.background.offset_x = *x;
                    next.background.offset_y = *y;
                }
                Layer::Subject => {
                    let subject = next.subject_mut()?;
                    subject.offset_x = *x;
                    subject.offset_y = *y;
                }
            },
            TemplateEdit::SetLayerScale { layer, scale } => {
                validate_scale(*scale, "layer scale")?;
                match layer {
                    Layer::Background => next.background.scale = *scale,
                    Layer::Subject => next.subject_mut()?.scale = *scale,
                }
            }
            TemplateEdit::ResetLayer { layer } => match layer {
                Layer::Background => {
                    next.background.offset_x = 0;
                    next.background.offset_y = 0;
                    next.background.scale = 1.0;
                }
                Layer::Subject => {
                    let subject = next.subject_mut()?;
                    subject.offset_x = 0;
                    subject.offset_y = 0;
                    subject.scale = 1.0;
                }
            },
        }
        next.validate()?;
        Ok(next)
    }

    /// Current `(offset_x, offset_y)` of a layer, if the layer exists.
    pub fn layer_offset(&self, layer: Layer) -> Option<(i32, i32)> {
        match layer {
            Layer::Background => Some((self.background.offset_x, self.background.offset_y)),
            Layer::Subject => self.subject.as_ref().map(|s| (s.offset_x, s.offset_y)),
        }
    }

    fn subject_mut(&mut self) -> ThumbResult<&mut SubjectConfig> {
        self.subject
            .as_mut()
            .ok_or_else(|| ThumbError::edit("template has no subject layer"))
    }

    /// Add a text zone with default styling. The first zone is `title`, later ones `zone_<n>`.
    pub fn add_text_zone(&mut self) -> ThumbResult<String> {
        let name = if self.zones.is_empty() {
            "title".to_string()
        } else {
            let mut n = self.zones.len() + 1;
            loop {
                let candidate = format!("zone_{n}");
                if !self.zones.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        };
        self.zones
            .insert(name.clone(), Zone::Text(TextZone::new(DEFAULT_ZONE_POSITION)))?;
        Ok(name)
    }

    /// Copy under a new identity. Version restarts and persistence timestamps are cleared.
    pub fn duplicate(&self, new_id: impl Into<String>, new_name: impl Into<String>) -> Template {
        Template {
            id: new_id.into(),
            name: new_name.into(),
            version: 1,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }

    /// Change the output resolution.
    pub fn resize_canvas(&self, canvas: Canvas, policy: CanvasResize) -> ThumbResult<Template> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        if canvas == self.canvas {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.canvas = canvas;
        match policy {
            CanvasResize::Reject => {
                if !self.zones.is_empty() {
                    return Err(ThumbError::validation(
                        "cannot resize canvas of a template with zones (use rescale)",
                    ));
                }
            }
            CanvasResize::Rescale => {
                let sx = f64::from(canvas.width) / f64::from(self.canvas.width);
                let sy = f64::from(canvas.height) / f64::from(self.canvas.height);
                let scale_x = |v: i32| round_i32(f64::from(v) * sx);
                let scale_y = |v: i32| round_i32(f64::from(v) * sy);

                for (_, zone) in next.zones.iter_mut() {
                    let p = zone.position_mut();
                    *p = ZonePosition {
                        x: scale_x(p.x),
                        y: scale_y(p.y),
                        width: scale_x(p.width),
                        height: scale_y(p.height),
                    };
                }
                next.background.offset_x = scale_x(next.background.offset_x);
                next.background.offset_y = scale_y(next.background.offset_y);
                if let Some(subject) = next.subject.as_mut() {
                    subject.offset_x = scale_x(subject.offset_x);
                    subject.offset_y = scale_y(subject.offset_y);
                }
            }
        }
        next.validate()?;
        Ok(next)
    }

    /// Adopt an externally generated background: it becomes the first fixed image.
    pub fn accept_generated_background(&mut self, reference: impl Into<String>) -> ThumbResult<()> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(ThumbError::validation(
                "generated background reference must be non-empty",
            ));
        }
        self.background.fixed_images.retain(|r| r != &reference);
        self.background.fixed_images.insert(0, reference);
        self.background.mode = BackgroundMode::Fixed;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/mutation.rs"]
mod tests;

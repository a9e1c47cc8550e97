//! Pointer-driven authoring state machine.
//!
//! ```text
//!            begin_mode(DrawZone)            pointer_up (always)
//!   Idle ─────────────────────────▶ DrawingZone ─────────────────▶ Idle
//!     │  begin_mode(MoveBackground/MoveSubject)
//!     └──────────────────────────▶ Moving* ──pointer_up──▶ Moving* (stays)
//!                                   exit_mode ─▶ Idle
//! ```
//!
//! The controller never touches the template. Commits come out as [`TemplateEdit`] values that
//! the owner applies.

use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::math::round_i32;
use crate::settings::EditorSettings;
use crate::template::model::{Template, Zone};
use crate::template::mutation::{Layer, TemplateEdit};
use crate::transform::preview::PreviewSpace;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Rectangle drag in progress (preview pixels).
pub struct DrawDrag {
    pub start: Point,
    pub current: Point,
}

impl DrawDrag {
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Layer drag in progress. `baseline` is read from the template at press time.
pub struct MoveDrag {
    pub start: Point,
    pub baseline: (i32, i32),
    pub live: (i32, i32),
}

#[derive(Clone, Debug, PartialEq)]
/// Authoring mode. Exactly one is active.
pub enum EditMode {
    Idle,
    DrawingZone { zone: String, drag: Option<DrawDrag> },
    MovingBackground { drag: Option<MoveDrag> },
    MovingSubject { drag: Option<MoveDrag> },
}

impl EditMode {
    pub fn is_dragging(&self) -> bool {
        match self {
            Self::Idle => false,
            Self::DrawingZone { drag, .. } => drag.is_some(),
            Self::MovingBackground { drag } | Self::MovingSubject { drag } => drag.is_some(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Mode selection request.
pub enum ModeRequest {
    DrawZone(String),
    MoveBackground,
    MoveSubject,
}

#[derive(Clone, Debug)]
pub struct EditController {
    mode: EditMode,
    space: PreviewSpace,
    min_draw_px: f64,
}

impl EditController {
    pub fn new(space: PreviewSpace, settings: &EditorSettings) -> Self {
        Self {
            mode: EditMode::Idle,
            space,
            min_draw_px: settings.min_draw_px,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn space(&self) -> &PreviewSpace {
        &self.space
    }

    /// Swap the preview surface (window resize, canvas change). Not allowed mid-drag.
    pub fn set_space(&mut self, space: PreviewSpace) -> ThumbResult<()> {
        if self.mode.is_dragging() {
            return Err(ThumbError::edit("cannot change preview size during a drag"));
        }
        self.space = space;
        Ok(())
    }

    /// Enter a mode, replacing whatever mode was active.
    pub fn begin_mode(&mut self, request: ModeRequest, template: &Template) -> ThumbResult<()> {
        if self.mode.is_dragging() {
            return Err(ThumbError::edit("cannot change mode during a drag"));
        }
        self.mode = match request {
            ModeRequest::DrawZone(zone) => match template.zone(&zone) {
                Some(Zone::Text(_)) => EditMode::DrawingZone { zone, drag: None },
                Some(_) => {
                    return Err(ThumbError::edit(format!(
                        "zone '{zone}' is not a text zone; only text zones are drawn"
                    )));
                }
                None => return Err(ThumbError::edit(format!("unknown zone '{zone}'"))),
            },
            ModeRequest::MoveBackground => EditMode::MovingBackground { drag: None },
            ModeRequest::MoveSubject => {
                if template.subject.is_none() {
                    return Err(ThumbError::edit("template has no subject layer"));
                }
                EditMode::MovingSubject { drag: None }
            }
        };
        Ok(())
    }

    /// Leave the current mode. Committed values stay; an unreleased drag is dropped.
    pub fn exit_mode(&mut self) {
        self.mode = EditMode::Idle;
    }

    /// Press inside the preview surface. Returns whether a drag started.
    pub fn pointer_down(&mut self, p: Point, template: &Template) -> bool {
        if !self.space.contains(p) || self.mode.is_dragging() {
            return false;
        }
        match &mut self.mode {
            EditMode::Idle => false,
            EditMode::DrawingZone { drag, .. } => {
                *drag = Some(DrawDrag {
                    start: p,
                    current: p,
                });
                true
            }
            EditMode::MovingBackground { drag } => {
                let baseline = (template.background.offset_x, template.background.offset_y);
                *drag = Some(MoveDrag {
                    start: p,
                    baseline,
                    live: baseline,
                });
                true
            }
            EditMode::MovingSubject { drag } => match template.layer_offset(Layer::Subject) {
                Some(baseline) => {
                    *drag = Some(MoveDrag {
                        start: p,
                        baseline,
                        live: baseline,
                    });
                    true
                }
                None => false,
            },
        }
    }

    /// Pointer motion. Positions outside the preview surface are ignored.
    pub fn pointer_move(&mut self, p: Point) {
        if !self.space.contains(p) {
            return;
        }
        let space = self.space;
        match &mut self.mode {
            EditMode::Idle => {}
            EditMode::DrawingZone { drag, .. } => {
                if let Some(d) = drag {
                    d.current = p;
                }
            }
            EditMode::MovingBackground { drag } | EditMode::MovingSubject { drag } => {
                if let Some(d) = drag {
                    let delta: Vec2 = space.delta_to_canvas(p - d.start);
                    d.live = (
                        round_i32(f64::from(d.baseline.0) + delta.x),
                        round_i32(f64::from(d.baseline.1) + delta.y),
                    );
                }
            }
        }
    }

    /// Release, anywhere. Ends the drag and returns the edit to commit, if any.
    ///
    /// A release inside the surface counts as a final move; outside, the last computed value is
    /// committed. Drawing always returns to `Idle`; moving modes stay active.
    pub fn pointer_up(&mut self, p: Point) -> Option<TemplateEdit> {
        self.pointer_move(p);
        let min = self.min_draw_px;
        let space = self.space;
        match &mut self.mode {
            EditMode::Idle => None,
            EditMode::DrawingZone { zone, drag } => {
                let zone = std::mem::take(zone);
                let drag = drag.take();
                self.mode = EditMode::Idle;
                let rect = drag?.rect();
                if rect.width() > min && rect.height() > min {
                    let position = space.rect_to_canvas(rect);
                    tracing::trace!(%zone, ?position, "zone drawn");
                    Some(TemplateEdit::SetZonePosition { zone, position })
                } else {
                    tracing::trace!(%zone, w = rect.width(), h = rect.height(), "draw below threshold, discarded");
                    None
                }
            }
            EditMode::MovingBackground { drag } => {
                let d = drag.take()?;
                tracing::trace!(x = d.live.0, y = d.live.1, "background moved");
                Some(TemplateEdit::SetLayerOffset {
                    layer: Layer::Background,
                    x: d.live.0,
                    y: d.live.1,
                })
            }
            EditMode::MovingSubject { drag } => {
                let d = drag.take()?;
                tracing::trace!(x = d.live.0, y = d.live.1, "subject moved");
                Some(TemplateEdit::SetLayerOffset {
                    layer: Layer::Subject,
                    x: d.live.0,
                    y: d.live.1,
                })
            }
        }
    }

    /// Zoom control; committed immediately regardless of drag state.
    pub fn set_scale(&self, layer: Layer, value: f64) -> ThumbResult<TemplateEdit> {
        if !value.is_finite() || value < 0.0 {
            return Err(ThumbError::edit("scale must be finite and >= 0"));
        }
        Ok(TemplateEdit::SetLayerScale {
            layer,
            scale: value,
        })
    }

    pub fn reset_layer(&self, layer: Layer) -> TemplateEdit {
        TemplateEdit::ResetLayer { layer }
    }

    /// Re-read the dragged layer's baseline from `template`, keeping the drag delta.
    ///
    /// Call after the template changed mid-drag (reset, external edit) so the release commits
    /// relative to the new offset.
    pub fn rebase(&mut self, template: &Template) {
        let (layer, d) = match &mut self.mode {
            EditMode::MovingBackground { drag: Some(d) } => (Layer::Background, d),
            EditMode::MovingSubject { drag: Some(d) } => (Layer::Subject, d),
            _ => return,
        };
        let Some(baseline) = template.layer_offset(layer) else {
            return;
        };
        let dx = d.live.0.saturating_sub(d.baseline.0);
        let dy = d.live.1.saturating_sub(d.baseline.1);
        d.baseline = baseline;
        d.live = (baseline.0.saturating_add(dx), baseline.1.saturating_add(dy));
    }

    /// Uncommitted layer offset being dragged, for live preview.
    pub fn live_offset(&self) -> Option<(Layer, (i32, i32))> {
        match &self.mode {
            EditMode::MovingBackground { drag: Some(d) } => Some((Layer::Background, d.live)),
            EditMode::MovingSubject { drag: Some(d) } => Some((Layer::Subject, d.live)),
            _ => None,
        }
    }

    /// Rectangle being drawn, in preview pixels.
    pub fn live_rect(&self) -> Option<(&str, Rect)> {
        match &self.mode {
            EditMode::DrawingZone {
                zone,
                drag: Some(d),
            } => Some((zone.as_str(), d.rect())),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/controller.rs"]
mod tests;

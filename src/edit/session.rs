use std::sync::Arc;

use crate::{
    compile::plan::{RenderContext, RenderPlan, render},
    edit::controller::{EditController, EditMode, ModeRequest},
    foundation::core::Point,
    foundation::error::{ThumbError, ThumbResult},
    settings::EditorSettings,
    template::model::{DataRecord, Template},
    template::mutation::{Layer, TemplateEdit},
    transform::preview::PreviewSpace,
};

#[derive(Clone, Debug, PartialEq)]
/// Everything the editor UI can ask for.
pub enum EditorAction {
    SelectZone(Option<String>),
    /// Draw a box for the selected zone.
    BeginDrawing,
    BeginMovingBackground,
    BeginMovingSubject,
    ExitMode,
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    SetScale(Layer, f64),
    ResetLayer(Layer),
    SetPreviewValue { zone: String, value: String },
    AddTextZone,
    RemoveZone(String),
    ResizePreview(f64),
    AcceptGeneratedBackground(String),
}

/// Editor application state: the current template snapshot plus interaction state.
///
/// Template snapshots are immutable; each committed change installs a new `Arc<Template>` and
/// bumps `revision`, so holders of an older snapshot are unaffected.
pub struct EditorSession {
    template: Arc<Template>,
    preview_data: DataRecord,
    selected_zone: Option<String>,
    controller: EditController,
    revision: u64,
}

impl EditorSession {
    pub fn new(template: Template, settings: &EditorSettings) -> ThumbResult<Self> {
        template.validate()?;
        let space = PreviewSpace::new(template.canvas, settings.preview_width)?;
        Ok(Self {
            template: Arc::new(template),
            preview_data: DataRecord::new(),
            selected_zone: None,
            controller: EditController::new(space, settings),
            revision: 0,
        })
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mode(&self) -> &EditMode {
        self.controller.mode()
    }

    pub fn controller(&self) -> &EditController {
        &self.controller
    }

    pub fn selected_zone(&self) -> Option<&str> {
        self.selected_zone.as_deref()
    }

    pub fn preview_data(&self) -> &DataRecord {
        &self.preview_data
    }

    /// Handle one action. Returns whether the template snapshot changed.
    #[tracing::instrument(skip(self), fields(revision = self.revision))]
    pub fn dispatch(&mut self, action: EditorAction) -> ThumbResult<bool> {
        match action {
            EditorAction::SelectZone(zone) => {
                if let Some(z) = &zone
                    && !self.template.zones.contains(z)
                {
                    return Err(ThumbError::edit(format!("unknown zone '{z}'")));
                }
                self.selected_zone = zone;
                Ok(false)
            }
            EditorAction::BeginDrawing => {
                let zone = self
                    .selected_zone
                    .clone()
                    .ok_or_else(|| ThumbError::edit("select a zone before drawing"))?;
                self.controller
                    .begin_mode(ModeRequest::DrawZone(zone), &self.template)?;
                Ok(false)
            }
            EditorAction::BeginMovingBackground => {
                self.controller
                    .begin_mode(ModeRequest::MoveBackground, &self.template)?;
                Ok(false)
            }
            EditorAction::BeginMovingSubject => {
                self.controller
                    .begin_mode(ModeRequest::MoveSubject, &self.template)?;
                Ok(false)
            }
            EditorAction::ExitMode => {
                self.controller.exit_mode();
                Ok(false)
            }
            EditorAction::PointerDown(p) => {
                self.controller.pointer_down(p, &self.template);
                Ok(false)
            }
            EditorAction::PointerMove(p) => {
                self.controller.pointer_move(p);
                Ok(false)
            }
            EditorAction::PointerUp(p) => match self.controller.pointer_up(p) {
                Some(edit) => self.commit(&edit),
                None => Ok(false),
            },
            EditorAction::SetScale(layer, value) => {
                let edit = self.controller.set_scale(layer, value)?;
                self.commit(&edit)
            }
            EditorAction::ResetLayer(layer) => {
                let edit = self.controller.reset_layer(layer);
                self.commit(&edit)
            }
            EditorAction::SetPreviewValue { zone, value } => {
                self.preview_data.insert(zone, value);
                Ok(false)
            }
            EditorAction::AddTextZone => {
                let mut next = (*self.template).clone();
                let name = next.add_text_zone()?;
                self.selected_zone = Some(name);
                self.install(next);
                Ok(true)
            }
            EditorAction::RemoveZone(name) => {
                if self.controller.mode().is_dragging() {
                    return Err(ThumbError::edit("cannot remove a zone during a drag"));
                }
                let mut next = (*self.template).clone();
                if next.zones.remove(&name).is_none() {
                    return Err(ThumbError::edit(format!("unknown zone '{name}'")));
                }
                if self.selected_zone.as_deref() == Some(name.as_str()) {
                    self.selected_zone = None;
                }
                if matches!(self.controller.mode(), EditMode::DrawingZone { zone, .. } if *zone == name)
                {
                    self.controller.exit_mode();
                }
                self.preview_data.remove(&name);
                self.install(next);
                Ok(true)
            }
            EditorAction::ResizePreview(width) => {
                let space = PreviewSpace::new(self.template.canvas, width)?;
                self.controller.set_space(space)?;
                Ok(false)
            }
            EditorAction::AcceptGeneratedBackground(reference) => {
                let mut next = (*self.template).clone();
                next.accept_generated_background(reference)?;
                self.install(next);
                Ok(true)
            }
        }
    }

    fn commit(&mut self, edit: &TemplateEdit) -> ThumbResult<bool> {
        let next = self.template.apply_edit(edit)?;
        if next == *self.template {
            return Ok(false);
        }
        self.install(next);
        Ok(true)
    }

    fn install(&mut self, next: Template) {
        self.controller.rebase(&next);
        self.template = Arc::new(next);
        self.revision += 1;
        tracing::trace!(revision = self.revision, "template snapshot replaced");
    }

    /// Template as the preview should show it: the committed snapshot with any in-flight layer
    /// drag applied.
    pub fn live_template(&self) -> Arc<Template> {
        let Some((layer, (x, y))) = self.controller.live_offset() else {
            return Arc::clone(&self.template);
        };
        let edit = TemplateEdit::SetLayerOffset { layer, x, y };
        match self.template.apply_edit(&edit) {
            Ok(t) => Arc::new(t),
            Err(_) => Arc::clone(&self.template),
        }
    }

    /// Render the live template with the preview data.
    pub fn render_preview(&self, ctx: &mut RenderContext<'_>) -> RenderPlan {
        render(&self.live_template(), &self.preview_data, ctx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/session.rs"]
mod tests;

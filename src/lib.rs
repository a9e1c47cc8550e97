//! thumbkit is a template-driven thumbnail compositor.
//!
//! - Describe a thumbnail once as a [`Template`] (canvas, background, subject, named zones)
//! - Resolve it with per-render data into a backend-agnostic [`RenderPlan`] via [`render`]
//! - Edit templates interactively through [`EditController`] / [`EditorSession`]
//!
//! See [`guide`] for the full walkthrough.
#![forbid(unsafe_code)]

mod assets;
mod compile;
mod edit;
mod foundation;
mod layout;
mod settings;
mod template;
mod text;
mod transform;

/// Architecture and usage walkthrough.
pub mod guide;

pub use crate::foundation::color::parse_hex_color;
pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{ThumbError, ThumbResult};

pub use crate::transform::preview::{PreviewSpace, to_canvas_point, to_preview_point};

pub use crate::template::condition::Condition;
pub use crate::template::dsl::{
    TemplateBuilder, TextZoneBuilder, badge_zone, image_zone, position, subject,
};
pub use crate::template::model::{
    AiConfig, BackgroundConfig, BackgroundMode, BadgeZone, DataRecord, GenerationRequest,
    ImageZone, LayoutMode, SelectionPolicy, SubjectConfig, Template, TextAlign, TextBackground,
    TextCase, TextEffects, TextSize, TextVAlign, TextZone, Zone, ZonePosition,
};
pub use crate::template::mutation::{CanvasResize, DEFAULT_ZONE_POSITION, Layer, TemplateEdit};
pub use crate::template::zones::ZoneMap;

pub use crate::assets::catalog::{AssetCatalog, AssetIndex, AssetKind, AssetProbe, AssumePresent};
pub use crate::text::metrics::{ApproxMetrics, FontMetrics, ParleyMetrics, TextExtent};

pub use crate::layout::text::{LaidUnit, TextBlock, layout_text_zone, split_units, stroke_offsets};

pub use crate::compile::placement::{
    background_placement, cover_rect, subject_bounds, subject_transform, visible_region,
};
pub use crate::compile::plan::{
    BackgroundImage, BackgroundPlan, BadgePlan, ImagePlan, OverlayPlan, PlatePlan, RenderContext,
    RenderPlan, ResolvedColor, ShadowPlan, StrokePlan, SubjectPlan, TextPlan, ZoneContent,
    ZonePlan, render,
};

pub use crate::edit::controller::{DrawDrag, EditController, EditMode, ModeRequest, MoveDrag};
pub use crate::edit::session::{EditorAction, EditorSession};

pub use crate::settings::{CompositorSettings, EditorSettings, Settings};

//! Canvas-space <-> preview-space mapping.
//!
//! The preview surface is a uniformly scaled copy of the canvas: `s = preview_width /
//! canvas.width` applies to both axes, and the preview height is derived from it. Geometry read
//! from pointer input is divided by `s` before it is written into a template; template geometry
//! is multiplied by `s` before it positions anything on the preview surface. Canvas-space values
//! written back are rounded to integers.

use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::math::round_i32;
use crate::template::model::ZonePosition;

/// A preview surface of a given width showing a canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSpace {
    canvas: Canvas,
    preview_width: f64,
}

impl PreviewSpace {
    /// Build a preview space; `preview_width` must be finite and > 0.
    pub fn new(canvas: Canvas, preview_width: f64) -> ThumbResult<Self> {
        if !preview_width.is_finite() || preview_width <= 0.0 {
            return Err(ThumbError::validation(
                "preview width must be finite and > 0",
            ));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ThumbError::validation("canvas width/height must be > 0"));
        }
        Ok(Self {
            canvas,
            preview_width,
        })
    }

    /// Identity space (preview == canvas), used for final fixed-resolution renders.
    pub fn identity(canvas: Canvas) -> ThumbResult<Self> {
        Self::new(canvas, f64::from(canvas.width))
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Uniform preview scale `s`.
    pub fn scale(&self) -> f64 {
        self.preview_width / f64::from(self.canvas.width)
    }

    /// Preview surface size; the height follows the canvas aspect ratio.
    pub fn preview_size(&self) -> Size {
        Size::new(
            self.preview_width,
            f64::from(self.canvas.height) * self.scale(),
        )
    }

    /// Whether a preview-space point lies on the surface (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        let size = self.preview_size();
        p.x >= 0.0 && p.y >= 0.0 && p.x <= size.width && p.y <= size.height
    }

    pub fn to_preview(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x * s, p.y * s)
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x / s, p.y / s)
    }

    /// Preview-space drag delta expressed in canvas pixels (unrounded).
    pub fn delta_to_canvas(&self, d: Vec2) -> Vec2 {
        d / self.scale()
    }

    /// Canvas -> preview affine, for placing canvas-space plan geometry on the surface.
    pub fn affine(&self) -> Affine {
        Affine::scale(self.scale())
    }

    /// Convert a preview rectangle into a rounded canvas-space zone position.
    pub fn rect_to_canvas(&self, r: Rect) -> ZonePosition {
        let s = self.scale();
        let r = r.abs();
        ZonePosition {
            x: round_i32(r.x0 / s),
            y: round_i32(r.y0 / s),
            width: round_i32(r.width() / s),
            height: round_i32(r.height() / s),
        }
    }

    /// Zone position as a preview-space rectangle.
    pub fn rect_to_preview(&self, pos: &ZonePosition) -> Rect {
        let s = self.scale();
        let r = pos.rect();
        Rect::new(r.x0 * s, r.y0 * s, r.x1 * s, r.y1 * s)
    }
}

/// Map a canvas point into a preview of width `preview_width`.
pub fn to_preview_point(p: Point, canvas: Canvas, preview_width: f64) -> ThumbResult<Point> {
    Ok(PreviewSpace::new(canvas, preview_width)?.to_preview(p))
}

/// Map a preview point back into canvas space.
pub fn to_canvas_point(p: Point, canvas: Canvas, preview_width: f64) -> ThumbResult<Point> {
    Ok(PreviewSpace::new(canvas, preview_width)?.to_canvas(p))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/preview.rs"]
mod tests;

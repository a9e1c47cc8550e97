//! Layer placement math for the background and subject.

use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};
use crate::template::model::SubjectConfig;

/// Background placement box: the canvas size times `scale`, centered on the canvas center
/// shifted by the offset.
pub fn background_placement(canvas: Canvas, offset_x: i32, offset_y: i32, scale: f64) -> Rect {
    let size = canvas.size();
    let center = canvas.center() + Vec2::new(f64::from(offset_x), f64::from(offset_y));
    Rect::from_center_size(center, Size::new(size.width * scale, size.height * scale))
}

/// Rectangle an image of `natural` size covers when filling `target` (aspect preserved,
/// centered, overflowing one axis as needed).
pub fn cover_rect(target: Rect, natural: Size) -> Rect {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return target;
    }
    let k = (target.width() / natural.width).max(target.height() / natural.height);
    Rect::from_center_size(
        target.center(),
        Size::new(natural.width * k, natural.height * k),
    )
}

/// Part of `placement` that lands on the canvas, if any.
pub fn visible_region(canvas: Canvas, placement: Rect) -> Option<Rect> {
    let visible = canvas.rect().intersect(placement);
    (visible.width() > 0.0 && visible.height() > 0.0).then_some(visible)
}

/// Subject-local to canvas transform.
///
/// Subject-local space has its origin at the image center. The image is mirrored first, then
/// scaled, then moved to the canvas center plus the offset.
pub fn subject_transform(canvas: Canvas, subject: &SubjectConfig) -> Affine {
    let center = canvas.center() + Vec2::new(f64::from(subject.offset_x), f64::from(subject.offset_y));
    let flip = if subject.flip_horizontal {
        Affine::scale_non_uniform(-1.0, 1.0)
    } else {
        Affine::IDENTITY
    };
    Affine::translate(center.to_vec2()) * Affine::scale(subject.scale) * flip
}

/// Canvas bounds of a subject image of `natural` size under `transform`.
pub fn subject_bounds(transform: Affine, natural: Size) -> Rect {
    transform.transform_rect_bbox(Rect::from_center_size(Point::ORIGIN, natural))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/placement.rs"]
mod tests;

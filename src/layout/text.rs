//! Text zone layout.
//!
//! A zone's display string is split into units (whole string, words, or characters) and placed
//! inside the zone box the way a single-row or single-column flex container would:
//!
//! - `horizontal`/`rotated`: one unit in a row; `align` positions it on x, `valign` on y.
//! - `stacked-*`: units in a column separated by `stack_gap`; `valign` positions the whole column
//!   on y and `align` positions each unit on x.
//!
//! Free space may be negative, so text wider than the box overflows symmetrically when centered.
//! All geometry is in canvas pixels.

use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::template::model::{LayoutMode, TextAlign, TextVAlign, TextZone};
use crate::text::metrics::{FontMetrics, TextExtent};

const FIT_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One positioned display unit.
pub struct LaidUnit {
    pub text: String,
    /// Line box of the unit, before any block rotation.
    pub rect: Rect,
    /// Pen start on the baseline.
    pub baseline: Point,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Result of laying out a text zone at a chosen font size.
pub struct TextBlock {
    pub font_size: f64,
    /// Units in stack order.
    pub units: Vec<LaidUnit>,
    /// Union of the unit boxes, before rotation.
    pub block: Rect,
    /// Rotation in degrees around the block center (zero unless the zone is `rotated`).
    pub rotation_deg: f64,
    /// Block-local to canvas transform (identity or a rotation about the block center).
    pub transform: Affine,
    /// Axis-aligned bounds of the transformed block.
    pub bounds: Rect,
    /// The block does not fit the zone box, even at the chosen size.
    pub overflow: bool,
}

/// Split a display string into layout units.
pub fn split_units(mode: LayoutMode, text: &str) -> Vec<String> {
    match mode {
        LayoutMode::Horizontal | LayoutMode::Rotated => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
        LayoutMode::StackedWords => text.split_whitespace().map(str::to_string).collect(),
        LayoutMode::StackedChars => text.chars().map(String::from).collect(),
    }
}

fn align_offset(align: TextAlign, free: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => free / 2.0,
        TextAlign::Right => free,
    }
}

fn valign_offset(valign: TextVAlign, free: f64) -> f64 {
    match valign {
        TextVAlign::Top => 0.0,
        TextVAlign::Middle => free / 2.0,
        TextVAlign::Bottom => free,
    }
}

struct Measured {
    size: f64,
    extents: Vec<TextExtent>,
    widths: Vec<f64>,
    line_box: f64,
    block_w: f64,
    block_h: f64,
}

fn measure_at(
    zone: &TextZone,
    family: &str,
    units: &[String],
    size: f64,
    metrics: &mut dyn FontMetrics,
) -> Measured {
    let extents: Vec<TextExtent> = units
        .iter()
        .map(|u| metrics.measure(family, size, u))
        .collect();
    let widths: Vec<f64> = units
        .iter()
        .zip(&extents)
        .map(|(u, e)| e.width + zone.letter_spacing * u.chars().count() as f64)
        .collect();
    let line_box = size * zone.line_height;
    let n = units.len() as f64;

    let block_w = widths.iter().copied().fold(0.0, f64::max);
    let block_h = if zone.layout_mode.is_stacked() {
        n * line_box + (n - 1.0).max(0.0) * zone.stack_gap
    } else {
        line_box
    };

    Measured {
        size,
        extents,
        widths,
        line_box,
        block_w,
        block_h,
    }
}

fn rotation_deg(zone: &TextZone) -> f64 {
    if zone.layout_mode == LayoutMode::Rotated {
        zone.rotation
    } else {
        0.0
    }
}

/// Axis-aligned size of a `w`x`h` box rotated by `deg`.
pub fn rotated_extent(w: f64, h: f64, deg: f64) -> (f64, f64) {
    if deg == 0.0 {
        return (w, h);
    }
    let (sin, cos) = deg.to_radians().sin_cos();
    (
        (w * cos).abs() + (h * sin).abs(),
        (w * sin).abs() + (h * cos).abs(),
    )
}

fn fits(m: &Measured, zone: &TextZone, box_w: f64, box_h: f64) -> bool {
    let (w, h) = rotated_extent(m.block_w, m.block_h, rotation_deg(zone));
    w <= box_w + FIT_EPSILON && h <= box_h + FIT_EPSILON
}

/// Lay out `text` (already case-transformed) in `zone`, measuring with `family`.
///
/// Returns `None` when the text has no units to show.
pub fn layout_text_zone(
    zone: &TextZone,
    text: &str,
    family: &str,
    metrics: &mut dyn FontMetrics,
) -> Option<TextBlock> {
    let units = split_units(zone.layout_mode, text);
    if units.is_empty() {
        return None;
    }

    let area = zone.position.rect();
    let (box_w, box_h) = (area.width(), area.height());

    let max = zone.size.max.max(1);
    let min = zone.size.min.clamp(1, max);

    let (measured, overflow) = if zone.size.auto {
        let smallest = measure_at(zone, family, &units, f64::from(min), metrics);
        if !fits(&smallest, zone, box_w, box_h) {
            tracing::debug!(min, "text does not fit at minimum size");
            (smallest, true)
        } else {
            // The block only grows with size, so the fitting sizes form a prefix of [min, max].
            let (mut lo, mut hi) = (min, max);
            let mut best = smallest;
            while lo < hi {
                let mid = lo + (hi - lo).div_ceil(2);
                let m = measure_at(zone, family, &units, f64::from(mid), metrics);
                if fits(&m, zone, box_w, box_h) {
                    lo = mid;
                    best = m;
                } else {
                    hi = mid - 1;
                }
            }
            (best, false)
        }
    } else {
        let m = measure_at(zone, family, &units, f64::from(max), metrics);
        let overflow = !fits(&m, zone, box_w, box_h);
        (m, overflow)
    };

    Some(place(zone, area, units, &measured, overflow))
}

fn place(zone: &TextZone, area: Rect, units: Vec<String>, m: &Measured, overflow: bool) -> TextBlock {
    let stacked = zone.layout_mode.is_stacked();
    let top = area.y0 + valign_offset(zone.valign, area.height() - m.block_h);

    let mut laid = Vec::with_capacity(units.len());
    for (i, text) in units.into_iter().enumerate() {
        let w = m.widths[i];
        let e = m.extents[i];
        let x = area.x0 + align_offset(zone.align, area.width() - w);
        let y = if stacked {
            top + i as f64 * (m.line_box + zone.stack_gap)
        } else {
            top
        };
        let half_leading = (m.line_box - (e.ascent + e.descent)) / 2.0;
        laid.push(LaidUnit {
            text,
            rect: Rect::new(x, y, x + w, y + m.line_box),
            baseline: Point::new(x, y + half_leading + e.ascent),
        });
    }

    let block = laid
        .iter()
        .map(|u| u.rect)
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO);

    let rotation_deg = rotation_deg(zone);
    let transform = if rotation_deg == 0.0 {
        Affine::IDENTITY
    } else {
        Affine::rotate_about(rotation_deg.to_radians(), block.center())
    };
    let bounds = transform.transform_rect_bbox(block);

    TextBlock {
        font_size: m.size,
        units: laid,
        block,
        rotation_deg,
        transform,
        bounds,
        overflow,
    }
}

/// The eight stroke copy offsets: four diagonals, then the four axis directions.
pub fn stroke_offsets(width: f64) -> [Vec2; 8] {
    let w = width;
    [
        Vec2::new(-w, -w),
        Vec2::new(w, -w),
        Vec2::new(-w, w),
        Vec2::new(w, w),
        Vec2::new(0.0, -w),
        Vec2::new(0.0, w),
        Vec2::new(-w, 0.0),
        Vec2::new(w, 0.0),
    ]
}

/// Plate rectangle behind a block, grown by `padding` on every side.
pub fn plate_rect(block: Rect, padding: f64) -> Rect {
    block.inflate(padding, padding)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;

//! # thumbkit guide (v0.1.0)
//!
//! This module is a standalone walkthrough of thumbkit's architecture and public API.
//!
//! If you are looking for copy/paste commands, start with the `thumbkit` binary's `--help`.
//! If you are implementing new features, start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Template`](crate::Template): the reusable recipe (canvas, background, subject, zones)
//! - [`DataRecord`](crate::DataRecord): per-render values, keyed by zone name
//! - [`RenderPlan`](crate::RenderPlan): backend-agnostic description of one thumbnail, in canvas
//!   pixels
//! - [`PreviewSpace`](crate::PreviewSpace): the uniform canvas <-> preview scale
//! - [`EditController`](crate::EditController): pointer-driven authoring state machine
//! - [`EditorSession`](crate::EditorSession): editor application state holding immutable template
//!   snapshots
//!
//! A render is a pure function:
//!
//! 1. Validate the template once, when it is written: [`Template::validate`](crate::Template::validate)
//! 2. Resolve it with data: [`render`](crate::render)
//! 3. Hand the plan to a pixel backend, or draw it on a preview surface through
//!    [`RenderPlan::preview_transform`](crate::RenderPlan::preview_transform)
//!
//! ---
//!
//! ## No IO in the compositor
//!
//! [`render`](crate::render) never reads files. The two things it needs from the outside world are
//! injected through [`RenderContext`](crate::RenderContext):
//!
//! - an [`AssetCatalog`](crate::AssetCatalog) answering "does this reference exist, and how big
//!   is it?" ([`AssetIndex::scan_dir`](crate::AssetIndex::scan_dir) builds one from disk up front)
//! - a [`FontMetrics`](crate::FontMetrics) implementation for measuring text
//!   ([`ParleyMetrics`](crate::ParleyMetrics) for real fonts, [`ApproxMetrics`](crate::ApproxMetrics)
//!   for deterministic tests)
//!
//! Missing assets and fonts are substituted (placeholder fill, fallback family) and logged at
//! `debug` level. They never fail a render.
//!
//! ---
//!
//! ## Coordinate spaces
//!
//! Everything stored in a template and everything in a plan is in **canvas space**: integer
//! pixels of the final output. The preview surface is the canvas scaled by
//! `s = preview_width / canvas.width` on both axes.
//!
//! - Pointer input is divided by `s` before it is written into a template, and rounded.
//! - Plan geometry is multiplied by `s` to draw a preview. The subject transform therefore becomes
//!   `scale(s) * translate(center + offset) * scale(subject.scale) * flip`.
//!
//! ---
//!
//! ## Layers
//!
//! Draw order in a plan is background, subject, zones (template order), overlays.
//!
//! ### Background
//!
//! One of `fixed_images` is picked by the selection policy. `rotate` and `random` read the
//! `render_count` and `seed` passed to the context, so a given context always picks the same
//! image. A background override (for example a freshly generated image) wins over the policy.
//!
//! The placement box is `canvas * scale`, centered on the canvas center moved by the offset. The
//! image covers that box (aspect preserved), and the canvas clips the result. At scale `1.0` and
//! offset `(0, 0)` the box is exactly the canvas.
//!
//! ### Subject
//!
//! Placed by a transform whose local origin is the image center: mirror (if flipped), scale,
//! translate to canvas center plus offset. Opacity applies to the whole layer.
//!
//! ### Text zones
//!
//! The value is case-transformed, split into units (`horizontal`/`rotated`: one; `stacked-words`:
//! words; `stacked-chars`: characters) and laid out like a flex container:
//!
//! | mode       | x from   | y from                       | spacing     |
//! |------------|----------|------------------------------|-------------|
//! | horizontal | `align`  | `valign`                     | n/a         |
//! | stacked-*  | `align`, per unit | `valign`, whole column | `stack_gap` |
//!
//! With `size.auto` the largest integer size in `[min, max]` whose block (rotated bounds, for
//! `rotated`) fits the zone box is used; otherwise `size.max`. When nothing fits, the plan uses
//! `size.min` and sets `overflow`.
//!
//! The stroke is eight offset copies of the glyph run in the stroke color, drawn under the fill.
//! Backends that want parity with the preview draw exactly those eight copies.
//!
//! Zone opacity is a group alpha: [`TextPlan::opacity`](crate::TextPlan::opacity) applies to the
//! plate, shadow, stroke copies and fill drawn together as one layer, so overlapping stroke
//! copies never add up past it. Element colors carry only their own alpha.
//!
//! ### Badges and images
//!
//! The value is looked up in `variants`/`mapping`, falling back to the `default` key. No match
//! means no zone in the plan. Badges may also carry `visible_when`:
//!
//! ```text
//! severity == CRITICAL
//! severity in [HIGH, CRITICAL] && !muted
//! not (kind == "recap")
//! ```
//!
//! ---
//!
//! ## Editing
//!
//! [`EditController`](crate::EditController) has four states: `Idle`, `DrawingZone`,
//! `MovingBackground`, `MovingSubject`.
//!
//! - Drawing (text zones only): press, drag, release. The rectangle commits only if both sides
//!   exceed `editor.min_draw_px` preview pixels; the controller always returns to `Idle`.
//! - Moving: each press re-reads the committed offset as its baseline, so consecutive drags
//!   accumulate. Release commits; the mode stays active until exited.
//! - Moves outside the preview surface are ignored. A release anywhere commits the last value.
//! - A reset or other template change during a move drag re-bases the drag: the release commits
//!   the new offset plus the drag delta, so it never restores the pre-reset value.
//!
//! Commits come out as [`TemplateEdit`](crate::TemplateEdit) values.
//! [`EditorSession`](crate::EditorSession) applies them to produce the next template snapshot.

//! Painting seam and primitive tree traversal.

use crate::bitmap::Bitmap;
use crate::primitives::{
    Drawing, FillRule, LINE_HEIGHT, PrimitiveId, PrimitiveKind, PrimitiveTree, Text,
};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;
use plotview_core::svg::FontFace;

/// One line of text ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left end of the baseline.
    pub origin: Point,
    pub font_family: Vec<String>,
    pub font_size: f64,
    pub face: FontFace,
    pub color: Color,
}

/// Immediate-mode 2D drawing surface.
///
/// `save`/`restore` bracket changes to the transform and clip. Coordinates
/// passed to drawing calls are in the current user space.
pub trait Context2d {
    fn save(&mut self);
    fn restore(&mut self);
    /// Concatenate `affine` onto the current transform.
    fn transform(&mut self, affine: Affine);
    /// Intersect the current clip with `path`.
    fn clip(&mut self, path: &BezPath);
    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule);
    fn stroke_path(&mut self, path: &BezPath, color: Color, stroke: &Stroke);
    fn fill_text(&mut self, run: &TextRun);
    fn draw_image(&mut self, bitmap: &Bitmap, dest: Rect, opacity: f64);
    /// Fill the whole surface, ignoring transform and clip.
    fn clear(&mut self, color: Color);
}

/// Paint the tree from its root. Does nothing for an empty tree.
pub fn paint(tree: &PrimitiveTree, ctx: &mut dyn Context2d) {
    if let Some(root) = tree.root() {
        paint_node(tree, root, ctx, 1.0);
    }
}

/// Paint the subtree rooted at `id`.
///
/// Opacity is multiplied down the tree into fill, stroke and image alpha
/// rather than composited per group.
pub fn paint_node(tree: &PrimitiveTree, id: PrimitiveId, ctx: &mut dyn Context2d, inherited_opacity: f64) {
    let Some(prim) = tree.get(id) else {
        return;
    };
    if !prim.visible {
        return;
    }
    let opacity = inherited_opacity * prim.opacity;
    if opacity <= 0.0 {
        return;
    }

    ctx.save();
    if prim.transform != Affine::IDENTITY {
        ctx.transform(prim.transform);
    }
    if let Some(clip) = &prim.clip {
        ctx.clip(clip);
    }

    match prim.drawing() {
        Drawing::Pane(_) | Drawing::Group => {}
        Drawing::Text(text) => {
            if let Some(color) = prim.paint.fill_with_opacity(opacity) {
                for run in text_runs(text, color) {
                    ctx.fill_text(&run);
                }
            }
        }
        Drawing::Image(image) => {
            if let (Some(bitmap), Some(dest)) = (&image.bitmap, image.dest_rect()) {
                ctx.draw_image(bitmap, dest, opacity);
            }
        }
        _ => {
            if let Some(path) = prim.path() {
                if prim.kind() != PrimitiveKind::Line {
                    if let Some(fill) = prim.paint.fill_with_opacity(opacity) {
                        ctx.fill_path(path, fill, prim.paint.fill_rule);
                    }
                }
                if let Some(stroke) = prim.paint.stroke_with_opacity(opacity) {
                    ctx.stroke_path(path, stroke, &prim.paint.stroke());
                }
            }
        }
    }

    for child in prim.children() {
        paint_node(tree, *child, ctx, opacity);
    }
    ctx.restore();
}

/// Split text content into one run per line.
pub fn text_runs(text: &Text, color: Color) -> Vec<TextRun> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            let width = text.line_width(line);
            TextRun {
                text: line.to_string(),
                origin: Point::new(
                    text.line_start(width),
                    text.y + i as f64 * text.font_size * LINE_HEIGHT,
                ),
                font_family: text.font_family.clone(),
                font_size: text.font_size,
                face: text.face,
                color,
            }
        })
        .collect()
}

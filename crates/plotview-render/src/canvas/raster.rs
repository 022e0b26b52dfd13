//! CPU raster backend built on tiny-skia.

use super::{Canvas, CanvasError, CanvasPeer, CanvasResult, Snapshot, pixel_dimensions};
use crate::bitmap::Bitmap;
use crate::font::{self, GlyphMask};
use crate::primitives::FillRule;
use crate::renderer::{Context2d, TextRun};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Rect, Size, Stroke};
use peniko::Color;
use std::fmt;
use std::sync::Arc;
use tiny_skia::{
    ColorU8, FilterQuality, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, PixmapPaint,
    StrokeDash, Transform,
};

/// Allocates [`RasterCanvas`]es.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCanvasPeer;

impl CanvasPeer for RasterCanvasPeer {
    type Canvas = RasterCanvas;

    fn create_canvas(&self, size: Size, content_scale: Option<f64>) -> CanvasResult<RasterCanvas> {
        let scale = content_scale.unwrap_or(1.0);
        let (width, height) = pixel_dimensions(size, scale)?;
        let context = RasterContext::new(width, height, Affine::scale(scale))?;
        log::debug!("Created {width}x{height} raster canvas (scale {scale})");
        Ok(RasterCanvas {
            size,
            scale,
            pixel_size: (width, height),
            context: Some(context),
        })
    }

    fn create_snapshot(&self, bitmap: Bitmap) -> CanvasResult<RasterSnapshot> {
        let expected = bitmap.width as usize * bitmap.height as usize * 4;
        if bitmap.rgba.len() != expected {
            return Err(CanvasError::BufferSize {
                expected,
                actual: bitmap.rgba.len(),
            });
        }
        Ok(RasterSnapshot::new(bitmap))
    }
}

/// A tiny-skia pixmap with a logical size and content scale.
#[derive(Debug)]
pub struct RasterCanvas {
    size: Size,
    scale: f64,
    pixel_size: (u32, u32),
    context: Option<RasterContext>,
}

impl RasterCanvas {
    pub fn is_disposed(&self) -> bool {
        self.context.is_none()
    }
}

impl Canvas for RasterCanvas {
    type Snapshot = RasterSnapshot;

    fn size(&self) -> Size {
        self.size
    }

    fn content_scale(&self) -> f64 {
        self.scale
    }

    fn pixel_size(&self) -> (u32, u32) {
        self.pixel_size
    }

    fn context2d(&mut self) -> CanvasResult<&mut dyn Context2d> {
        match self.context.as_mut() {
            Some(ctx) => Ok(ctx),
            None => Err(CanvasError::Disposed),
        }
    }

    fn take_snapshot(&self) -> CanvasResult<RasterSnapshot> {
        let ctx = self.context.as_ref().ok_or(CanvasError::Disposed)?;
        Ok(RasterSnapshot::new(ctx.to_bitmap()))
    }

    fn dispose(&mut self) {
        if self.context.take().is_some() {
            log::trace!("Disposed raster canvas");
        }
    }
}

/// Pixels captured from a [`RasterCanvas`] or wrapped from a [`Bitmap`].
#[derive(Debug, Clone)]
pub struct RasterSnapshot {
    size: (u32, u32),
    bitmap: Option<Arc<Bitmap>>,
}

impl RasterSnapshot {
    fn new(bitmap: Bitmap) -> Self {
        Self {
            size: (bitmap.width, bitmap.height),
            bitmap: Some(Arc::new(bitmap)),
        }
    }

    /// Shared handle to the pixels, usable from other threads.
    pub fn shared_bitmap(&self) -> CanvasResult<Arc<Bitmap>> {
        self.bitmap.clone().ok_or(CanvasError::Disposed)
    }
}

impl Snapshot for RasterSnapshot {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn bitmap(&self) -> CanvasResult<&Bitmap> {
        self.bitmap.as_deref().ok_or(CanvasError::Disposed)
    }

    fn copy(&self) -> CanvasResult<Self> {
        let bitmap = self.bitmap()?;
        Ok(RasterSnapshot::new(bitmap.clone()))
    }

    fn dispose(&mut self) {
        self.bitmap = None;
    }
}

#[derive(Clone)]
struct RasterState {
    transform: Affine,
    clip: Option<Mask>,
}

/// [`Context2d`] over a tiny-skia pixmap.
///
/// Glyphs are rasterized at the device scale of the current transform and
/// composited as coverage images.
pub struct RasterContext {
    pixmap: Pixmap,
    state: RasterState,
    stack: Vec<RasterState>,
}

impl fmt::Debug for RasterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterContext")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("transform", &self.state.transform)
            .field("clipped", &self.state.clip.is_some())
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl RasterContext {
    /// A transparent surface with `base` as the initial transform.
    pub fn new(width: u32, height: u32, base: Affine) -> CanvasResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(CanvasError::Allocation { width, height })?;
        Ok(Self {
            pixmap,
            state: RasterState {
                transform: base,
                clip: None,
            },
            stack: Vec::new(),
        })
    }

    /// Unpremultiplied copy of the pixels.
    pub fn to_bitmap(&self) -> Bitmap {
        let mut rgba = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Bitmap {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
            rgba,
        }
    }

    fn new_mask(&self) -> Option<Mask> {
        Mask::new(self.pixmap.width(), self.pixmap.height())
    }
}

impl Context2d for RasterContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("restore() without matching save()"),
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn clip(&mut self, path: &BezPath) {
        let transform = to_transform(self.state.transform);
        let Some(path) = to_path(path) else {
            // An empty clip hides everything.
            self.state.clip = self.new_mask();
            return;
        };
        match self.state.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, tiny_skia::FillRule::Winding, true, transform),
            None => {
                let mut mask = self.new_mask();
                if let Some(mask) = mask.as_mut() {
                    mask.fill_path(&path, tiny_skia::FillRule::Winding, true, transform);
                }
                self.state.clip = mask;
            }
        }
    }

    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule) {
        let Some(path) = to_path(path) else {
            return;
        };
        let paint = solid_paint(color);
        let rule = match rule {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        };
        self.pixmap.fill_path(
            &path,
            &paint,
            rule,
            to_transform(self.state.transform),
            self.state.clip.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, stroke: &Stroke) {
        let Some(path) = to_path(path) else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap.stroke_path(
            &path,
            &paint,
            &to_stroke(stroke),
            to_transform(self.state.transform),
            self.state.clip.as_ref(),
        );
    }

    fn fill_text(&mut self, run: &TextRun) {
        let [a, b, c, d, _, _] = self.state.transform.as_coeffs();
        let scale = (a * d - b * c).abs().sqrt();
        if run.text.is_empty() || run.font_size <= 0.0 || scale <= 0.0 {
            return;
        }
        let color = run.color.to_rgba8();
        let rgba = [color.r, color.g, color.b, color.a];
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        // Glyph masks are in device pixels; map them back into user space.
        let base = self.state.transform
            * Affine::translate(run.origin.to_vec2())
            * Affine::scale(1.0 / scale);
        for glyph in font::rasterize_line(&run.text, run.font_size * scale, run.face) {
            let Some(image) = glyph_pixmap(&glyph, rgba) else {
                continue;
            };
            self.pixmap.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &paint,
                to_transform(base * Affine::translate((glyph.left, glyph.top))),
                self.state.clip.as_ref(),
            );
        }
    }

    fn draw_image(&mut self, bitmap: &Bitmap, dest: Rect, opacity: f64) {
        let Some(mut image) = Pixmap::new(bitmap.width, bitmap.height) else {
            return;
        };
        for (dst, src) in image.pixels_mut().iter_mut().zip(bitmap.rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        let placement = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / bitmap.width as f64,
                dest.height() / bitmap.height as f64,
            );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            to_transform(self.state.transform * placement),
            self.state.clip.as_ref(),
        );
    }

    fn clear(&mut self, color: Color) {
        let c = color.to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }
}

/// Tint a glyph's coverage with `rgba`.
fn glyph_pixmap(glyph: &GlyphMask, rgba: [u8; 4]) -> Option<Pixmap> {
    let mut image = Pixmap::new(glyph.width as u32, glyph.height as u32)?;
    for (dst, coverage) in image.pixels_mut().iter_mut().zip(&glyph.coverage) {
        let alpha = (u16::from(rgba[3]) * u16::from(*coverage) / 255) as u8;
        *dst = ColorU8::from_rgba(rgba[0], rgba[1], rgba[2], alpha).premultiply();
    }
    Some(image)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let c = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    let dash = if stroke.dash_pattern.is_empty() {
        None
    } else {
        StrokeDash::new(
            stroke.dash_pattern.iter().map(|d| *d as f32).collect(),
            stroke.dash_offset as f32,
        )
    };
    tiny_skia::Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap: match stroke.start_cap {
            Cap::Butt => LineCap::Butt,
            Cap::Square => LineCap::Square,
            Cap::Round => LineCap::Round,
        },
        line_join: match stroke.join {
            Join::Bevel => LineJoin::Bevel,
            Join::Miter => LineJoin::Miter,
            Join::Round => LineJoin::Round,
        },
        dash,
    }
}

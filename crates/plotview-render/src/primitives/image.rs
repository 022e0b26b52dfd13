//! Raster image primitive.

use super::Geometry;
use crate::bitmap::Bitmap;
use kurbo::{BezPath, Rect};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bitmap: Option<Arc<Bitmap>>,
    /// Fit the bitmap inside the viewport, centered, instead of stretching.
    pub preserve_aspect_ratio: bool,
}

impl Image {
    /// Viewport requested by the `x`/`y`/`width`/`height` attributes. A
    /// missing width or height falls back to the bitmap's size.
    pub fn viewport(&self) -> Rect {
        let (bw, bh) = self
            .bitmap
            .as_ref()
            .map(|b| (b.width as f64, b.height as f64))
            .unwrap_or((0.0, 0.0));
        let width = if self.width > 0.0 { self.width } else { bw };
        let height = if self.height > 0.0 { self.height } else { bh };
        Rect::new(self.x, self.y, self.x + width, self.y + height)
    }

    /// Rectangle the bitmap is drawn into.
    pub fn dest_rect(&self) -> Option<Rect> {
        let bitmap = self.bitmap.as_ref()?;
        let viewport = self.viewport();
        if viewport.area() <= 0.0 {
            return None;
        }
        if !self.preserve_aspect_ratio {
            return Some(viewport);
        }
        let scale = (viewport.width() / bitmap.width as f64).min(viewport.height() / bitmap.height as f64);
        let width = bitmap.width as f64 * scale;
        let height = bitmap.height as f64 * scale;
        let x = viewport.x0 + (viewport.width() - width) / 2.0;
        let y = viewport.y0 + (viewport.height() - height) / 2.0;
        Some(Rect::new(x, y, x + width, y + height))
    }
}

impl Geometry for Image {
    fn to_path(&self) -> Option<BezPath> {
        None
    }

    fn bounds(&self) -> Option<Rect> {
        let viewport = self.viewport();
        (viewport.area() > 0.0).then_some(viewport)
    }
}

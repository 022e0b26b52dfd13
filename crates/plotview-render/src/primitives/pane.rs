//! Root surface of a mapped scene.

use super::Geometry;
use kurbo::{BezPath, Rect, Size};

/// Top-level container sized by the source `svg` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pane {
    pub width: f64,
    pub height: f64,
}

impl Pane {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Geometry for Pane {
    fn to_path(&self) -> Option<BezPath> {
        None
    }

    fn bounds(&self) -> Option<Rect> {
        (self.width > 0.0 && self.height > 0.0)
            .then(|| Rect::new(0.0, 0.0, self.width, self.height))
    }
}

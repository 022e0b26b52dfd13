//! Arbitrary path primitive.

use super::Geometry;
use kurbo::{BezPath, Rect, Shape as KurboShape};

/// A path from SVG path data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathShape {
    pub data: BezPath,
}

impl Geometry for PathShape {
    fn to_path(&self) -> Option<BezPath> {
        (!self.data.elements().is_empty()).then(|| self.data.clone())
    }

    fn bounds(&self) -> Option<Rect> {
        (!self.data.elements().is_empty()).then(|| self.data.bounding_box())
    }
}

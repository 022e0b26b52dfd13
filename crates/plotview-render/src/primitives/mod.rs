//! Concrete drawing primitives.

mod circle;
mod ellipse;
mod image;
mod line;
mod pane;
mod path;
mod rectangle;
mod text;
mod tree;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use image::Image;
pub use line::Line;
pub use pane::Pane;
pub use path::PathShape;
pub use rectangle::Rectangle;
pub use text::{LINE_HEIGHT, Text, TextAnchor};
pub use tree::{PrimitiveTree, StructureError, StructureResult};

use kurbo::{Affine, BezPath, Rect, Stroke};
use peniko::Color;
use plotview_core::ElementId;
use std::cell::OnceCell;
use uuid::Uuid;

/// Unique identifier for primitives.
pub type PrimitiveId = Uuid;

/// Tolerance used when flattening curves into paths.
pub(crate) const PATH_TOLERANCE: f64 = 0.1;

/// Primitive kinds. `Pane` and `Group` hold children; the rest draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Pane,
    Group,
    Rect,
    Ellipse,
    Circle,
    Line,
    Path,
    Text,
    Image,
}

impl PrimitiveKind {
    pub fn is_container(&self) -> bool {
        matches!(self, PrimitiveKind::Pane | PrimitiveKind::Group)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Pane => "Pane",
            PrimitiveKind::Group => "Group",
            PrimitiveKind::Rect => "Rect",
            PrimitiveKind::Ellipse => "Ellipse",
            PrimitiveKind::Circle => "Circle",
            PrimitiveKind::Line => "Line",
            PrimitiveKind::Path => "Path",
            PrimitiveKind::Text => "Text",
            PrimitiveKind::Image => "Image",
        }
    }
}

/// Fill rule for closed paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Fill and stroke properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintStyle {
    /// Fill color (None = no fill).
    pub fill: Option<Color>,
    pub fill_opacity: f64,
    pub fill_rule: FillRule,
    /// Stroke color (None = no stroke).
    pub stroke: Option<Color>,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    /// Dash lengths; empty means a solid stroke.
    pub dash_array: Vec<f64>,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            fill: Some(Color::BLACK),
            fill_opacity: 1.0,
            fill_rule: FillRule::NonZero,
            stroke: None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            dash_array: Vec::new(),
        }
    }
}

impl PaintStyle {
    /// Fill color with `fill-opacity` and the inherited `opacity` applied.
    pub fn fill_with_opacity(&self, opacity: f64) -> Option<Color> {
        self.fill
            .map(|c| c.multiply_alpha((self.fill_opacity * opacity).clamp(0.0, 1.0) as f32))
    }

    /// Stroke color with `stroke-opacity` and the inherited `opacity` applied.
    pub fn stroke_with_opacity(&self, opacity: f64) -> Option<Color> {
        if self.stroke_width <= 0.0 {
            return None;
        }
        self.stroke
            .map(|c| c.multiply_alpha((self.stroke_opacity * opacity).clamp(0.0, 1.0) as f32))
    }

    /// Stroke geometry parameters.
    pub fn stroke(&self) -> Stroke {
        let stroke = Stroke::new(self.stroke_width);
        // An odd-length dash list repeats to an even one.
        if self.dash_array.is_empty() || self.dash_array.iter().all(|d| *d <= 0.0) {
            stroke
        } else if self.dash_array.len() % 2 == 1 {
            let doubled: Vec<f64> = self.dash_array.iter().chain(&self.dash_array).copied().collect();
            stroke.with_dashes(0.0, doubled)
        } else {
            stroke.with_dashes(0.0, self.dash_array.iter().copied())
        }
    }
}

/// Local geometry of a drawable primitive.
pub trait Geometry {
    /// Outline in local coordinates, for shapes that are filled or stroked.
    fn to_path(&self) -> Option<BezPath>;

    /// Bounding box in local coordinates.
    fn bounds(&self) -> Option<Rect>;
}

/// Kind-specific drawing data.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawing {
    Pane(Pane),
    Group,
    Rect(Rectangle),
    Ellipse(Ellipse),
    Circle(Circle),
    Line(Line),
    Path(PathShape),
    Text(Text),
    Image(Image),
}

impl Drawing {
    /// Default drawing data for `kind`.
    pub fn new(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Pane => Drawing::Pane(Pane::default()),
            PrimitiveKind::Group => Drawing::Group,
            PrimitiveKind::Rect => Drawing::Rect(Rectangle::default()),
            PrimitiveKind::Ellipse => Drawing::Ellipse(Ellipse::default()),
            PrimitiveKind::Circle => Drawing::Circle(Circle::default()),
            PrimitiveKind::Line => Drawing::Line(Line::default()),
            PrimitiveKind::Path => Drawing::Path(PathShape::default()),
            PrimitiveKind::Text => Drawing::Text(Text::default()),
            PrimitiveKind::Image => Drawing::Image(Image::default()),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Drawing::Pane(_) => PrimitiveKind::Pane,
            Drawing::Group => PrimitiveKind::Group,
            Drawing::Rect(_) => PrimitiveKind::Rect,
            Drawing::Ellipse(_) => PrimitiveKind::Ellipse,
            Drawing::Circle(_) => PrimitiveKind::Circle,
            Drawing::Line(_) => PrimitiveKind::Line,
            Drawing::Path(_) => PrimitiveKind::Path,
            Drawing::Text(_) => PrimitiveKind::Text,
            Drawing::Image(_) => PrimitiveKind::Image,
        }
    }
}

impl Geometry for Drawing {
    fn to_path(&self) -> Option<BezPath> {
        match self {
            Drawing::Pane(_) | Drawing::Group => None,
            Drawing::Rect(s) => s.to_path(),
            Drawing::Ellipse(s) => s.to_path(),
            Drawing::Circle(s) => s.to_path(),
            Drawing::Line(s) => s.to_path(),
            Drawing::Path(s) => s.to_path(),
            Drawing::Text(s) => s.to_path(),
            Drawing::Image(s) => s.to_path(),
        }
    }

    fn bounds(&self) -> Option<Rect> {
        match self {
            Drawing::Pane(s) => s.bounds(),
            Drawing::Group => None,
            Drawing::Rect(s) => s.bounds(),
            Drawing::Ellipse(s) => s.bounds(),
            Drawing::Circle(s) => s.bounds(),
            Drawing::Line(s) => s.bounds(),
            Drawing::Path(s) => s.bounds(),
            Drawing::Text(s) => s.bounds(),
            Drawing::Image(s) => s.bounds(),
        }
    }
}

/// Derived values computed on first use and dropped whenever the drawing
/// data changes.
#[derive(Debug, Clone, Default)]
struct Derived {
    path: OnceCell<Option<BezPath>>,
    bounds: OnceCell<Option<Rect>>,
}

/// A node of the concrete primitive tree.
#[derive(Debug, Clone)]
pub struct Primitive {
    id: PrimitiveId,
    source: Option<ElementId>,
    pub(crate) parent: Option<PrimitiveId>,
    pub(crate) children: Vec<PrimitiveId>,
    pub visible: bool,
    pub opacity: f64,
    pub transform: Affine,
    /// Clip outline in local coordinates.
    pub clip: Option<BezPath>,
    pub style_class: Vec<String>,
    pub paint: PaintStyle,
    drawing: Drawing,
    derived: Derived,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: None,
            parent: None,
            children: Vec::new(),
            visible: true,
            opacity: 1.0,
            transform: Affine::IDENTITY,
            clip: None,
            style_class: Vec::new(),
            paint: PaintStyle::default(),
            drawing: Drawing::new(kind),
            derived: Derived::default(),
        }
    }

    /// Record the abstract element this primitive renders.
    pub fn with_source(mut self, source: ElementId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn source(&self) -> Option<ElementId> {
        self.source
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.drawing.kind()
    }

    pub fn parent(&self) -> Option<PrimitiveId> {
        self.parent
    }

    pub fn children(&self) -> &[PrimitiveId] {
        &self.children
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// Mutable access to the drawing data. Invalidates derived geometry.
    pub fn drawing_mut(&mut self) -> &mut Drawing {
        self.derived = Derived::default();
        &mut self.drawing
    }

    /// Reset visual properties and drawing data to their defaults, keeping
    /// identity and structure.
    pub fn reset_properties(&mut self) {
        let kind = self.kind();
        self.visible = true;
        self.opacity = 1.0;
        self.transform = Affine::IDENTITY;
        self.clip = None;
        self.style_class.clear();
        self.paint = PaintStyle::default();
        self.drawing = Drawing::new(kind);
        self.derived = Derived::default();
    }

    /// Outline in local coordinates (memoized).
    pub fn path(&self) -> Option<&BezPath> {
        self.derived
            .path
            .get_or_init(|| self.drawing.to_path())
            .as_ref()
    }

    /// Own bounds in local coordinates, children excluded (memoized).
    pub fn local_bounds(&self) -> Option<Rect> {
        *self.derived.bounds.get_or_init(|| self.drawing.bounds())
    }

    pub fn as_text(&self) -> Option<&Text> {
        match &self.drawing {
            Drawing::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self.drawing_mut() {
            Drawing::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pane(&self) -> Option<&Pane> {
        match &self.drawing {
            Drawing::Pane(p) => Some(p),
            _ => None,
        }
    }
}

//! Abstract scene graph: the SVG-like element tree produced by the plotting
//! engine.

mod document;
mod style;

pub use document::{ChangeFeed, ElementId, SceneError, SceneResult, SvgChange, SvgDocument};
pub use style::{FontFace, StyleSheet, TextStyle};

use kurbo::{Affine, Rect};
use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute names understood by the mapping layer.
pub mod attr {
    pub const ID: &str = "id";
    pub const CLASS: &str = "class";
    pub const STYLE: &str = "style";
    pub const TRANSFORM: &str = "transform";
    pub const VISIBILITY: &str = "visibility";
    pub const OPACITY: &str = "opacity";
    pub const CLIP_BOUNDS: &str = "clip-bounds";
    pub const CLIP_PATH: &str = "clip-path";

    pub const FILL: &str = "fill";
    pub const FILL_OPACITY: &str = "fill-opacity";
    pub const FILL_RULE: &str = "fill-rule";
    pub const STROKE: &str = "stroke";
    pub const STROKE_OPACITY: &str = "stroke-opacity";
    pub const STROKE_WIDTH: &str = "stroke-width";
    pub const STROKE_DASHARRAY: &str = "stroke-dasharray";

    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const RX: &str = "rx";
    pub const RY: &str = "ry";
    pub const CX: &str = "cx";
    pub const CY: &str = "cy";
    pub const R: &str = "r";
    pub const X1: &str = "x1";
    pub const Y1: &str = "y1";
    pub const X2: &str = "x2";
    pub const Y2: &str = "y2";
    pub const D: &str = "d";

    pub const TEXT_ANCHOR: &str = "text-anchor";
    pub const FONT_FAMILY: &str = "font-family";
    pub const FONT_SIZE: &str = "font-size";
    pub const FONT_WEIGHT: &str = "font-weight";
    pub const FONT_STYLE: &str = "font-style";

    pub const HREF: &str = "href";
    pub const PRESERVE_ASPECT_RATIO: &str = "preserveAspectRatio";
}

/// Source element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Svg,
    G,
    Rect,
    Ellipse,
    Circle,
    Line,
    Path,
    Text,
    TSpan,
    TextNode,
    Image,
    Style,
    Defs,
    ClipPath,
}

impl ElementKind {
    /// SVG tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Svg => "svg",
            ElementKind::G => "g",
            ElementKind::Rect => "rect",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Circle => "circle",
            ElementKind::Line => "line",
            ElementKind::Path => "path",
            ElementKind::Text => "text",
            ElementKind::TSpan => "tspan",
            ElementKind::TextNode => "#text",
            ElementKind::Image => "image",
            ElementKind::Style => "style",
            ElementKind::Defs => "defs",
            ElementKind::ClipPath => "clipPath",
        }
    }

    /// Look up a kind by SVG tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "svg" => ElementKind::Svg,
            "g" => ElementKind::G,
            "rect" => ElementKind::Rect,
            "ellipse" => ElementKind::Ellipse,
            "circle" => ElementKind::Circle,
            "line" => ElementKind::Line,
            "path" => ElementKind::Path,
            "text" => ElementKind::Text,
            "tspan" => ElementKind::TSpan,
            "#text" => ElementKind::TextNode,
            "image" => ElementKind::Image,
            "style" => ElementKind::Style,
            "defs" => ElementKind::Defs,
            "clipPath" => ElementKind::ClipPath,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether elements of this kind may hold children.
    pub fn is_container(&self) -> bool {
        !matches!(self, ElementKind::TextNode)
    }
}

/// Tri-state visibility as carried by the `visibility` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::Collapse => "collapse",
        };
        f.write_str(s)
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Visibility(Visibility),
    Color(Color),
    Rect(Rect),
    Transform(Affine),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::Text(s) => write!(f, "{s:?}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Visibility(v) => write!(f, "{v}"),
            AttributeValue::Color(c) => f.write_str(&color_to_hex(*c)),
            AttributeValue::Rect(r) => write!(f, "rect({}, {}, {}, {})", r.x0, r.y0, r.x1, r.y1),
            AttributeValue::Transform(a) => {
                let [a, b, c, d, e, g] = a.as_coeffs();
                write!(f, "matrix({a} {b} {c} {d} {e} {g})")
            }
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<Visibility> for AttributeValue {
    fn from(v: Visibility) -> Self {
        AttributeValue::Visibility(v)
    }
}

impl From<Color> for AttributeValue {
    fn from(v: Color) -> Self {
        AttributeValue::Color(v)
    }
}

impl From<Rect> for AttributeValue {
    fn from(v: Rect) -> Self {
        AttributeValue::Rect(v)
    }
}

impl From<Affine> for AttributeValue {
    fn from(v: Affine) -> Self {
        AttributeValue::Transform(v)
    }
}

/// Parse a CSS color (`#rgb`, `#rrggbb`, `rgb(...)`, named colors, ...).
pub fn parse_css_color(s: &str) -> Option<Color> {
    parse_color(s.trim())
        .ok()
        .map(|c| c.to_alpha_color::<Srgb>())
}

/// Format a color as `#rrggbb`, or `#rrggbbaa` when not opaque.
pub fn color_to_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for kind in [ElementKind::Svg, ElementKind::ClipPath, ElementKind::TextNode] {
            assert_eq!(ElementKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ElementKind::from_tag("marquee"), None);
    }

    #[test]
    fn test_parse_css_color() {
        let red = parse_css_color("#ff0000").unwrap().to_rgba8();
        assert_eq!((red.r, red.g, red.b, red.a), (255, 0, 0, 255));
        let blue = parse_css_color(" blue ").unwrap().to_rgba8();
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));
        assert!(parse_css_color("not-a-color").is_none());
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(color_to_hex(Color::from_rgba8(0, 128, 255, 255)), "#0080ff");
        assert_eq!(color_to_hex(Color::from_rgba8(1, 2, 3, 4)), "#01020304");
    }
}

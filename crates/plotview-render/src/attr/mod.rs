//! Attribute mapping: abstract attribute name/value pairs to concrete
//! primitive properties.
//!
//! Each primitive kind resolves to one translator. A name the kind-specific
//! translator does not recognize falls through to the shared paint
//! translator (drawable shapes only) and then to the base translator, which
//! handles visibility, opacity, clipping, inline style, class, transform and
//! id. Unknown names are logged and ignored.

mod base;
pub mod coerce;
mod image;
mod paint;
mod shapes;
mod text;
mod transform;

pub use image::decode_data_url;
pub(crate) use text::parse_font_family;
pub use transform::{parse_transform, parse_transform_list};

use crate::primitives::{Primitive, PrimitiveKind};
use plotview_core::svg::AttributeValue;
use thiserror::Error;

/// Attribute translation failures. Recoverable: the synchronizer logs them
/// and moves on to the next attribute.
#[derive(Debug, Error, PartialEq)]
pub enum AttributeError {
    #[error("Unsupported value for `{name}`: {value}")]
    UnsupportedValue { name: String, value: String },
    #[error("Invalid transform `{0}`")]
    InvalidTransform(String),
    #[error("Invalid path data: {0}")]
    InvalidPathData(String),
    #[error("Invalid color `{0}`")]
    InvalidColor(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for attribute translation.
pub type AttrResult<T> = Result<T, AttributeError>;

/// Kind-specific translator. Returns `Ok(false)` for names it does not own.
type Translator = fn(&mut Primitive, &str, &AttributeValue) -> AttrResult<bool>;

fn no_attributes(_: &mut Primitive, _: &str, _: &AttributeValue) -> AttrResult<bool> {
    Ok(false)
}

/// The translator for `kind`.
fn translator(kind: PrimitiveKind) -> Translator {
    match kind {
        PrimitiveKind::Pane => shapes::set_pane,
        PrimitiveKind::Group => no_attributes,
        PrimitiveKind::Rect => shapes::set_rect,
        PrimitiveKind::Ellipse => shapes::set_ellipse,
        PrimitiveKind::Circle => shapes::set_circle,
        PrimitiveKind::Line => shapes::set_line,
        PrimitiveKind::Path => shapes::set_path,
        PrimitiveKind::Text => text::set_text,
        PrimitiveKind::Image => image::set_image,
    }
}

fn has_paint(kind: PrimitiveKind) -> bool {
    !matches!(
        kind,
        PrimitiveKind::Pane | PrimitiveKind::Group | PrimitiveKind::Image
    )
}

/// Apply one attribute to `target`.
pub fn set_attribute(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<()> {
    let kind = target.kind();
    if translator(kind)(target, name, value)? {
        return Ok(());
    }
    if has_paint(kind) && paint::set_paint(target, name, value)? {
        return Ok(());
    }
    base::set_base(target, name, value)
}

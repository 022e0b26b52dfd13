//! Fill and stroke attributes shared by drawable shapes.

use super::{AttrResult, AttributeError, coerce};
use crate::primitives::{FillRule, Primitive};
use plotview_core::svg::{AttributeValue, attr};

pub(super) fn set_paint(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    let paint = &mut target.paint;
    match name {
        attr::FILL => paint.fill = coerce::paint(name, value)?,
        attr::FILL_OPACITY => paint.fill_opacity = coerce::number(name, value)?.clamp(0.0, 1.0),
        attr::FILL_RULE => {
            paint.fill_rule = match coerce::string(name, value)?.trim() {
                "nonzero" => FillRule::NonZero,
                "evenodd" => FillRule::EvenOdd,
                _ => {
                    return Err(AttributeError::UnsupportedValue {
                        name: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        attr::STROKE => paint.stroke = coerce::paint(name, value)?,
        attr::STROKE_OPACITY => paint.stroke_opacity = coerce::number(name, value)?.clamp(0.0, 1.0),
        attr::STROKE_WIDTH => paint.stroke_width = coerce::length(name, value)?.max(0.0),
        attr::STROKE_DASHARRAY => paint.dash_array = coerce::number_list(name, value)?,
        _ => return Ok(false),
    }
    Ok(true)
}

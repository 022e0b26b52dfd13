//! Geometry attributes of the container and shape primitives.

use super::{AttrResult, AttributeError, coerce};
use crate::primitives::{Drawing, Primitive};
use kurbo::BezPath;
use plotview_core::svg::{AttributeValue, attr};

pub(super) fn set_pane(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(name, attr::WIDTH | attr::HEIGHT) {
        return Ok(false);
    }
    let v = coerce::length(name, value)?;
    if let Drawing::Pane(pane) = target.drawing_mut() {
        match name {
            attr::WIDTH => pane.width = v,
            _ => pane.height = v,
        }
    }
    Ok(true)
}

pub(super) fn set_rect(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(
        name,
        attr::X | attr::Y | attr::WIDTH | attr::HEIGHT | attr::RX | attr::RY
    ) {
        return Ok(false);
    }
    let v = coerce::number(name, value)?;
    if let Drawing::Rect(rect) = target.drawing_mut() {
        match name {
            attr::X => rect.x = v,
            attr::Y => rect.y = v,
            attr::WIDTH => rect.width = v,
            attr::HEIGHT => rect.height = v,
            attr::RX => rect.rx = v,
            _ => rect.ry = v,
        }
    }
    Ok(true)
}

pub(super) fn set_ellipse(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(name, attr::CX | attr::CY | attr::RX | attr::RY) {
        return Ok(false);
    }
    let v = coerce::number(name, value)?;
    if let Drawing::Ellipse(ellipse) = target.drawing_mut() {
        match name {
            attr::CX => ellipse.cx = v,
            attr::CY => ellipse.cy = v,
            attr::RX => ellipse.rx = v,
            _ => ellipse.ry = v,
        }
    }
    Ok(true)
}

pub(super) fn set_circle(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(name, attr::CX | attr::CY | attr::R) {
        return Ok(false);
    }
    let v = coerce::number(name, value)?;
    if let Drawing::Circle(circle) = target.drawing_mut() {
        match name {
            attr::CX => circle.cx = v,
            attr::CY => circle.cy = v,
            _ => circle.r = v,
        }
    }
    Ok(true)
}

pub(super) fn set_line(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(name, attr::X1 | attr::Y1 | attr::X2 | attr::Y2) {
        return Ok(false);
    }
    let v = coerce::number(name, value)?;
    if let Drawing::Line(line) = target.drawing_mut() {
        match name {
            attr::X1 => line.x1 = v,
            attr::Y1 => line.y1 = v,
            attr::X2 => line.x2 = v,
            _ => line.y2 = v,
        }
    }
    Ok(true)
}

pub(super) fn set_path(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if name != attr::D {
        return Ok(false);
    }
    let data = coerce::string(name, value)?;
    let path = if data.trim().is_empty() {
        BezPath::new()
    } else {
        BezPath::from_svg(&data).map_err(|e| AttributeError::InvalidPathData(e.to_string()))?
    };
    if let Drawing::Path(shape) = target.drawing_mut() {
        shape.data = path;
    }
    Ok(true)
}

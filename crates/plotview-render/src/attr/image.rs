//! Image attributes, including `data:` URL decoding.

use super::{AttrResult, AttributeError, coerce};
use crate::bitmap::Bitmap;
use crate::primitives::{Drawing, Primitive};
use base64::{Engine, engine::general_purpose::STANDARD};
use plotview_core::svg::{AttributeValue, attr};
use std::sync::Arc;

const XLINK_HREF: &str = "xlink:href";

pub(super) fn set_image(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    match name {
        attr::X | attr::Y | attr::WIDTH | attr::HEIGHT => {
            let v = coerce::number(name, value)?;
            if let Drawing::Image(image) = target.drawing_mut() {
                match name {
                    attr::X => image.x = v,
                    attr::Y => image.y = v,
                    attr::WIDTH => image.width = v,
                    _ => image.height = v,
                }
            }
        }
        attr::HREF | XLINK_HREF => {
            let url = coerce::string(name, value)?;
            let bitmap = decode_data_url(&url)?;
            if let Drawing::Image(image) = target.drawing_mut() {
                image.bitmap = Some(Arc::new(bitmap));
            }
        }
        attr::PRESERVE_ASPECT_RATIO => {
            let s = coerce::string(name, value)?;
            if let Drawing::Image(image) = target.drawing_mut() {
                image.preserve_aspect_ratio = s.trim() != "none";
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Decode a base64 `data:image/...` URL into a bitmap.
pub fn decode_data_url(url: &str) -> AttrResult<Bitmap> {
    let invalid = |msg: String| AttributeError::InvalidImage(msg);
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("only data URLs are supported".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing data URL payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(invalid(format!("unsupported data URL encoding `{header}`")));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(e.to_string()))?;
    let decoded = ::image::load_from_memory(&bytes).map_err(|e| invalid(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba(width, height, rgba.into_raw()).map_err(|e| invalid(e.to_string()))
}

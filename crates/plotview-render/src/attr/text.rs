//! Text positioning and font attributes.

use super::{AttrResult, AttributeError, coerce};
use crate::primitives::{Primitive, TextAnchor};
use plotview_core::svg::{AttributeValue, attr};

pub(super) fn set_text(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<bool> {
    if !matches!(
        name,
        attr::X
            | attr::Y
            | attr::TEXT_ANCHOR
            | attr::FONT_FAMILY
            | attr::FONT_SIZE
            | attr::FONT_WEIGHT
            | attr::FONT_STYLE
    ) {
        return Ok(false);
    }
    let Some(text) = target.as_text_mut() else {
        return Ok(false);
    };
    match name {
        attr::X => text.x = coerce::number(name, value)?,
        attr::Y => text.y = coerce::number(name, value)?,
        attr::TEXT_ANCHOR => {
            let s = coerce::string(name, value)?;
            text.anchor = TextAnchor::parse(&s).ok_or_else(|| AttributeError::UnsupportedValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
        }
        attr::FONT_FAMILY => text.font_family = parse_font_family(&coerce::string(name, value)?),
        attr::FONT_SIZE => text.font_size = coerce::length(name, value)?,
        attr::FONT_WEIGHT => {
            let s = coerce::string(name, value)?;
            text.face.bold = match s.trim() {
                "bold" | "bolder" => true,
                other => other.parse::<f64>().is_ok_and(|w| w >= 600.0),
            };
        }
        _ => {
            let s = coerce::string(name, value)?;
            text.face.italic = matches!(s.trim(), "italic" | "oblique");
        }
    }
    Ok(true)
}

/// Split a CSS font-family list, trimming whitespace and quotes.
pub(crate) fn parse_font_family(s: &str) -> Vec<String> {
    s.split(',')
        .map(|f| f.trim().trim_matches(['"', '\'']).trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

//! Value coercion shared by the translators.

use super::{AttrResult, AttributeError};
use peniko::Color;
use plotview_core::svg::{AttributeValue, Visibility, parse_css_color};

pub(crate) fn unsupported(name: &str, value: &AttributeValue) -> AttributeError {
    AttributeError::UnsupportedValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// A native number or a numeric string.
pub fn number(name: &str, value: &AttributeValue) -> AttrResult<f64> {
    match value {
        AttributeValue::Number(n) => Ok(*n),
        AttributeValue::Text(s) => s.trim().parse().map_err(|_| unsupported(name, value)),
        _ => Err(unsupported(name, value)),
    }
}

/// Like [`number`], also accepting a `px` suffix.
pub fn length(name: &str, value: &AttributeValue) -> AttrResult<f64> {
    match value {
        AttributeValue::Text(s) => {
            let s = s.trim();
            s.strip_suffix("px")
                .unwrap_or(s)
                .trim()
                .parse()
                .map_err(|_| unsupported(name, value))
        }
        _ => number(name, value),
    }
}

/// Booleans pass through, `Visible` and the string `"visible"` are true,
/// and a string parses as a case-insensitive `true`. Anything else is false.
pub fn visibility(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Bool(b) => *b,
        AttributeValue::Visibility(v) => *v == Visibility::Visible,
        AttributeValue::Text(s) => s == "visible" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Textual form of a value.
pub fn string(name: &str, value: &AttributeValue) -> AttrResult<String> {
    match value {
        AttributeValue::Text(s) => Ok(s.clone()),
        AttributeValue::Number(_) | AttributeValue::Visibility(_) | AttributeValue::Bool(_) => {
            Ok(value.to_string())
        }
        _ => Err(unsupported(name, value)),
    }
}

/// A paint value: a typed color, a CSS color string, or `none`.
pub fn paint(name: &str, value: &AttributeValue) -> AttrResult<Option<Color>> {
    match value {
        AttributeValue::Color(c) => Ok(Some(*c)),
        AttributeValue::Text(s) if s.trim() == "none" => Ok(None),
        AttributeValue::Text(s) => parse_css_color(s)
            .map(Some)
            .ok_or_else(|| AttributeError::InvalidColor(s.clone())),
        _ => Err(unsupported(name, value)),
    }
}

/// A comma and/or whitespace separated list of numbers. `none` is empty.
pub fn number_list(name: &str, value: &AttributeValue) -> AttrResult<Vec<f64>> {
    match value {
        AttributeValue::Number(n) => Ok(vec![*n]),
        AttributeValue::Text(s) if s.trim() == "none" => Ok(Vec::new()),
        AttributeValue::Text(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>().map_err(|_| unsupported(name, value)))
            .collect(),
        _ => Err(unsupported(name, value)),
    }
}

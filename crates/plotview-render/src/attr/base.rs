//! Attributes every primitive understands.

use super::{AttrResult, coerce, set_attribute, transform::parse_transform};
use crate::primitives::{PATH_TOLERANCE, Primitive};
use kurbo::Shape as KurboShape;
use plotview_core::svg::{AttributeValue, attr};

pub(super) fn set_base(target: &mut Primitive, name: &str, value: &AttributeValue) -> AttrResult<()> {
    match name {
        attr::VISIBILITY => target.visible = coerce::visibility(value),
        attr::OPACITY => target.opacity = coerce::number(name, value)?.clamp(0.0, 1.0),
        attr::CLIP_BOUNDS => {
            target.clip = match value {
                AttributeValue::Rect(r) => Some(r.to_path(PATH_TOLERANCE)),
                _ => None,
            }
        }
        attr::CLIP_PATH => log::trace!("clip-path is not supported, ignoring"),
        attr::STYLE => set_style(target, value.as_str().unwrap_or_default()),
        attr::CLASS => {
            target.style_class = value
                .as_str()
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        }
        attr::TRANSFORM => {
            target.transform = match value {
                AttributeValue::Transform(t) => *t,
                AttributeValue::Text(s) => parse_transform(s)?,
                other => return Err(coerce::unsupported(name, other)),
            }
        }
        attr::ID => {}
        _ => log::debug!("Unsupported attribute `{}` in {}", name, target.kind().name()),
    }
    Ok(())
}

/// Apply an inline `style` declaration list, one attribute per declaration.
/// A declaration that fails is logged and the rest still apply.
fn set_style(target: &mut Primitive, style: &str) {
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || name == attr::STYLE {
            continue;
        }
        if let Err(e) = set_attribute(target, name, &AttributeValue::Text(value.to_string())) {
            log::warn!("Skipping style declaration `{}` on {}: {}", name, target.kind().name(), e);
        }
    }
}

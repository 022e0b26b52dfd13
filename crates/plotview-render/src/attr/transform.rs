//! SVG `transform` attribute parsing.

use super::{AttrResult, AttributeError};
use kurbo::{Affine, Vec2};

/// Parse a transform list into its individual transforms, in source order.
pub fn parse_transform_list(s: &str) -> AttrResult<Vec<Affine>> {
    let invalid = || AttributeError::InvalidTransform(s.to_string());
    let mut out = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest[open..].find(')').map(|i| open + i).ok_or_else(invalid)?;
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let args = rest[open + 1..close]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| invalid())?;
        out.push(transform_for(name, &args).ok_or_else(invalid)?);
        rest = rest[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }
    Ok(out)
}

/// Parse a transform list and compose it into a single matrix.
pub fn parse_transform(s: &str) -> AttrResult<Affine> {
    Ok(parse_transform_list(s)?
        .into_iter()
        .fold(Affine::IDENTITY, |acc, t| acc * t))
}

fn transform_for(name: &str, args: &[f64]) -> Option<Affine> {
    let t = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
        ("translate", [tx]) => Affine::translate((*tx, 0.0)),
        ("translate", [tx, ty]) => Affine::translate((*tx, *ty)),
        ("scale", [s]) => Affine::scale(*s),
        ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
        ("rotate", [deg]) => Affine::rotate(deg.to_radians()),
        ("rotate", [deg, cx, cy]) => {
            let center = Vec2::new(*cx, *cy);
            Affine::translate(center) * Affine::rotate(deg.to_radians()) * Affine::translate(-center)
        }
        ("skewX", [deg]) => Affine::new([1.0, 0.0, deg.to_radians().tan(), 1.0, 0.0, 0.0]),
        ("skewY", [deg]) => Affine::new([1.0, deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
        _ => return None,
    };
    Some(t)
}

//! Class-based text styling carried alongside the element tree.

use super::parse_css_color;
use indexmap::IndexMap;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Weight and slant of a font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFace {
    pub bold: bool,
    pub italic: bool,
}

impl FontFace {
    pub const NORMAL: FontFace = FontFace {
        bold: false,
        italic: false,
    };
    pub const BOLD: FontFace = FontFace {
        bold: true,
        italic: false,
    };
    pub const ITALIC: FontFace = FontFace {
        bold: false,
        italic: true,
    };

    /// CSS `font-weight` keyword.
    pub fn weight(&self) -> &'static str {
        if self.bold { "bold" } else { "normal" }
    }

    /// CSS `font-style` keyword.
    pub fn style(&self) -> &'static str {
        if self.italic { "italic" } else { "normal" }
    }
}

/// Font and color for text of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub face: FontFace,
    pub size: f64,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            face: FontFace::NORMAL,
            size: 13.0,
            color: Color::BLACK,
        }
    }
}

/// Mapping from class name to text style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    styles: IndexMap<String, TextStyle>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: impl Into<String>, style: TextStyle) {
        self.styles.insert(class.into(), style);
    }

    pub fn with_style(mut self, class: impl Into<String>, style: TextStyle) -> Self {
        self.insert(class, style);
        self
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve the style for a `class` attribute value.
    ///
    /// The full value is tried first, then its whitespace-separated tokens
    /// from last to first. `None` when nothing matches.
    pub fn text_style(&self, class: &str) -> Option<&TextStyle> {
        let class = class.trim();
        if class.is_empty() {
            return None;
        }
        if let Some(style) = self.styles.get(class) {
            return Some(style);
        }
        class
            .split_whitespace()
            .rev()
            .find_map(|token| self.styles.get(token))
    }

    /// Parse a minimal stylesheet: `.class { font-family: ..; font-size: ..;
    /// font-weight: ..; font-style: ..; fill: ..; }`. Selectors without a
    /// leading dot and unknown properties are skipped.
    pub fn parse_css(css: &str) -> Self {
        let mut sheet = StyleSheet::new();
        let mut rest = css;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            let selectors = &rest[..open];
            let body = &rest[open + 1..close];
            rest = &rest[close + 1..];

            let style = parse_declarations(body);
            for selector in selectors.split(',') {
                let selector = selector.trim();
                match selector.strip_prefix('.') {
                    Some(class) if !class.is_empty() => sheet.insert(class, style.clone()),
                    _ => log::debug!("Skipping unsupported selector {selector:?}"),
                }
            }
        }
        sheet
    }
}

fn parse_declarations(body: &str) -> TextStyle {
    let mut style = TextStyle::default();
    for decl in body.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim() {
            "font-family" => style.family = value.trim_matches(['"', '\'']).to_string(),
            "font-size" => {
                if let Ok(size) = value.trim_end_matches("px").trim().parse::<f64>() {
                    style.size = size;
                }
            }
            "font-weight" => style.face.bold = matches!(value, "bold" | "bolder" | "600" | "700" | "800" | "900"),
            "font-style" => style.face.italic = matches!(value, "italic" | "oblique"),
            "fill" | "color" => {
                if let Some(color) = parse_css_color(value) {
                    style.color = color;
                }
            }
            other => log::trace!("Ignoring style property {other:?}"),
        }
    }
    style
}

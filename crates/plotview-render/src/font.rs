//! Embedded fonts, line metrics and glyph rasterization.
//!
//! Every family maps onto the bundled DejaVu Sans faces. Bold and italic
//! pick the matching face.

use fontdue::{Font, FontSettings};
use plotview_core::svg::FontFace;
use std::sync::OnceLock;

static SANS_REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static SANS_BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");
static SANS_OBLIQUE: &[u8] = include_bytes!("../assets/DejaVuSans-Oblique.ttf");
static SANS_BOLD_OBLIQUE: &[u8] = include_bytes!("../assets/DejaVuSans-BoldOblique.ttf");

// Used only if the embedded fonts fail to parse, as multiples of the size.
const FALLBACK_ADVANCE: f64 = 0.6;
const FALLBACK_ASCENT: f64 = 0.8;
const FALLBACK_DESCENT: f64 = 0.2;

struct FontSet {
    regular: Font,
    bold: Font,
    oblique: Font,
    bold_oblique: Font,
}

impl FontSet {
    fn load() -> Result<Self, &'static str> {
        Ok(Self {
            regular: Font::from_bytes(SANS_REGULAR, FontSettings::default())?,
            bold: Font::from_bytes(SANS_BOLD, FontSettings::default())?,
            oblique: Font::from_bytes(SANS_OBLIQUE, FontSettings::default())?,
            bold_oblique: Font::from_bytes(SANS_BOLD_OBLIQUE, FontSettings::default())?,
        })
    }

    fn face(&self, face: FontFace) -> &Font {
        match (face.bold, face.italic) {
            (false, false) => &self.regular,
            (true, false) => &self.bold,
            (false, true) => &self.oblique,
            (true, true) => &self.bold_oblique,
        }
    }
}

fn fonts() -> Option<&'static FontSet> {
    static FONTS: OnceLock<Option<FontSet>> = OnceLock::new();
    FONTS
        .get_or_init(|| match FontSet::load() {
            Ok(set) => {
                log::debug!("Loaded embedded fonts");
                Some(set)
            }
            Err(e) => {
                log::error!("Failed to load embedded fonts: {e}");
                None
            }
        })
        .as_ref()
}

/// Font used to draw `face`.
pub fn font_for(face: FontFace) -> Option<&'static Font> {
    fonts().map(|set| set.face(face))
}

/// Vertical extent of one line. Both values are positive distances from
/// the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f64,
    pub descent: f64,
}

pub fn line_metrics(size: f64, face: FontFace) -> LineMetrics {
    font_for(face)
        .and_then(|font| font.horizontal_line_metrics(size as f32))
        .map(|m| LineMetrics {
            ascent: m.ascent as f64,
            descent: -m.descent as f64,
        })
        .unwrap_or(LineMetrics {
            ascent: size * FALLBACK_ASCENT,
            descent: size * FALLBACK_DESCENT,
        })
}

/// Advance width of `line` at `size`, kerning included.
pub fn advance_width(line: &str, size: f64, face: FontFace) -> f64 {
    let Some(font) = font_for(face) else {
        return line.chars().count() as f64 * size * FALLBACK_ADVANCE;
    };
    let px = size as f32;
    let mut width = 0.0_f32;
    let mut prev = None;
    for ch in line.chars() {
        if let Some(prev) = prev {
            width += font.horizontal_kern(prev, ch, px).unwrap_or(0.0);
        }
        width += font.metrics(ch, px).advance_width;
        prev = Some(ch);
    }
    width as f64
}

/// Coverage mask of one glyph. `left` and `top` place its top-left corner
/// relative to the start of the baseline, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMask {
    pub left: f64,
    pub top: f64,
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// Rasterize `line` at `px` pixels per em. Blank glyphs are skipped.
pub fn rasterize_line(line: &str, px: f64, face: FontFace) -> Vec<GlyphMask> {
    let Some(font) = font_for(face) else {
        return Vec::new();
    };
    let px = px as f32;
    let mut pen = 0.0_f32;
    let mut prev = None;
    let mut glyphs = Vec::with_capacity(line.len());
    for ch in line.chars() {
        if let Some(prev) = prev {
            pen += font.horizontal_kern(prev, ch, px).unwrap_or(0.0);
        }
        let (metrics, coverage) = font.rasterize(ch, px);
        if metrics.width > 0 && metrics.height > 0 {
            glyphs.push(GlyphMask {
                left: (pen + metrics.xmin as f32) as f64,
                top: -(metrics.ymin + metrics.height as i32) as f64,
                width: metrics.width,
                height: metrics.height,
                coverage,
            });
        }
        pen += metrics.advance_width;
        prev = Some(ch);
    }
    glyphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_fonts_load() {
        assert!(font_for(FontFace::NORMAL).is_some());
        assert!(font_for(FontFace { bold: true, italic: true }).is_some());
    }

    #[test]
    fn test_advance_width_follows_glyphs() {
        let narrow = advance_width("iiii", 20.0, FontFace::NORMAL);
        let wide = advance_width("WWWW", 20.0, FontFace::NORMAL);
        assert!(narrow > 0.0);
        assert!(wide > narrow * 2.0);
        let doubled = advance_width("WWWW", 40.0, FontFace::NORMAL);
        assert!((doubled - wide * 2.0).abs() < 1.0);
        assert!(advance_width("abc", 20.0, FontFace::BOLD) > advance_width("abc", 20.0, FontFace::NORMAL));
        assert_eq!(advance_width("", 20.0, FontFace::NORMAL), 0.0);
    }

    #[test]
    fn test_line_metrics() {
        let m = line_metrics(10.0, FontFace::NORMAL);
        assert!(m.ascent > 5.0 && m.ascent < 12.0);
        assert!(m.descent > 0.0 && m.descent < m.ascent);
    }

    #[test]
    fn test_rasterize_sits_on_baseline() {
        let glyphs = rasterize_line("W W", 24.0, FontFace::NORMAL);
        assert_eq!(glyphs.len(), 2);
        let first = &glyphs[0];
        assert!(first.top < -10.0);
        assert!(first.top + first.height as f64 <= 1.0);
        assert_eq!(first.coverage.len(), first.width * first.height);
        assert!(first.coverage.iter().any(|c| *c > 200));
        assert!(glyphs[1].left > first.left + first.width as f64);
    }
}

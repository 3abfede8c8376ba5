//! # Font Metrics
//!
//! Text measurement for the layout engine. Wrapping and justification only
//! need advance widths, so this module carries AFM width tables for the
//! built-in fonts (thousandths of an em, printable ASCII) and real metrics
//! parsed with ttf-parser for registered custom fonts.
//!
//! Fonts are addressed by their surface names ("Helvetica",
//! "Helvetica-Bold", "Courier", "Times-Roman"). Unknown names fall back to
//! Helvetica so measurement never fails.

use std::collections::HashMap;

/// Helvetica advance widths for chars 32..=126.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for chars 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Times-Roman advance widths for chars 32..=126.
#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333,
    250, 278, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278,
    564, 564, 564, 444, 921, 722, 667, 667, 722, 611, 556, 722, 722, 333,
    389, 722, 611, 889, 722, 722, 556, 722, 667, 556, 611, 722, 722, 944,
    722, 722, 611, 333, 278, 333, 469, 500, 333, 444, 500, 444, 500, 444,
    333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333, 389,
    278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Every Courier glyph has the same advance.
const COURIER_ADVANCE: u16 = 600;

enum Metrics<'a> {
    Table(&'static [u16; 95]),
    Fixed(u16),
    Custom(&'a CustomFontMetrics),
}

impl Metrics<'_> {
    fn advance(&self, ch: char, font_size: f64) -> f64 {
        match self {
            Metrics::Table(table) => {
                let units = match u32::from(ch) {
                    code @ 32..=126 => table[(code - 32) as usize],
                    // Reasonable stand-in for glyphs outside the table.
                    _ => table[('n' as usize) - 32],
                };
                units as f64 * font_size / 1000.0
            }
            Metrics::Fixed(units) => *units as f64 * font_size / 1000.0,
            Metrics::Custom(m) => m.char_width(ch, font_size),
        }
    }
}

/// Metrics parsed from a TrueType/OpenType file via ttf-parser.
pub struct CustomFontMetrics {
    units_per_em: u16,
    advance_widths: HashMap<char, u16>,
    default_advance: u16,
}

impl CustomFontMetrics {
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        units as f64 / self.units_per_em as f64 * font_size
    }
}

/// The measuring capability handed to the layout engines.
pub struct FontContext {
    custom: HashMap<String, CustomFontMetrics>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
        }
    }

    /// Register a custom font under a surface name. Returns false (and
    /// registers nothing) when the data does not parse as a font face.
    pub fn register(&mut self, name: &str, data: &[u8]) -> bool {
        match CustomFontMetrics::from_font_data(data) {
            Some(metrics) => {
                self.custom.insert(name.to_string(), metrics);
                true
            }
            None => false,
        }
    }

    fn metrics_for(&self, font: &str) -> Metrics<'_> {
        if let Some(m) = self.custom.get(font) {
            return Metrics::Custom(m);
        }
        let lower = font.to_ascii_lowercase();
        if lower.starts_with("courier") {
            Metrics::Fixed(COURIER_ADVANCE)
        } else if lower.starts_with("times") {
            Metrics::Table(&TIMES_ROMAN)
        } else if lower.contains("bold") {
            Metrics::Table(&HELVETICA_BOLD)
        } else {
            Metrics::Table(&HELVETICA)
        }
    }

    /// Advance width of a string in points.
    pub fn measure(&self, text: &str, font: &str, font_size: f64) -> f64 {
        let metrics = self.metrics_for(font);
        text.chars().map(|ch| metrics.advance(ch, font_size)).sum()
    }

    /// Advance width of a single space, the unit justification stretches.
    pub fn space_width(&self, font: &str, font_size: f64) -> f64 {
        self.measure(" ", font, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space() {
        let ctx = FontContext::new();
        let w = ctx.space_width("Helvetica", 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure("interval", "Helvetica", 12.0);
        let bold = ctx.measure("interval", "Helvetica-Bold", 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let ctx = FontContext::new();
        let a = ctx.measure("iiii", "Courier", 10.0);
        let b = ctx.measure("MMMM", "Courier", 10.0);
        assert!((a - b).abs() < 1e-9);
        assert!((a - 4.0 * 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_font_falls_back() {
        let ctx = FontContext::new();
        let a = ctx.measure("Hello", "Helvetica", 12.0);
        let b = ctx.measure("Hello", "Humanist-Sans", 12.0);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut ctx = FontContext::new();
        assert!(!ctx.register("Broken", b"not a font"));
        // Fallback measurement still works for the unknown name.
        assert!(ctx.measure("x", "Broken", 12.0) > 0.0);
    }

    #[test]
    fn test_measure_scales_linearly() {
        let ctx = FontContext::new();
        let w12 = ctx.measure("word", "Helvetica", 12.0);
        let w24 = ctx.measure("word", "Helvetica", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-9);
    }
}

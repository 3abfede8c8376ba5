//! # Style System
//!
//! Typed style properties for content nodes. Every recognized property is an
//! explicit optional field; there is no property bag. Each field carries three
//! states in document JSON:
//!
//! - missing — inherit from the outer cascade layer
//! - `null` — unset: remove the property even if an outer layer (or the
//!   document defaults) sets it, falling back to the built-in hard default
//! - a value — set it for this layer
//!
//! Cascades fold outer to inner and never mutate their inputs. Document-wide
//! defaults are just the outermost layer, carried by the render session
//! rather than any global state.

use crate::geom::Dim;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserializer hook distinguishing an explicit `null` (unset) from a value.
/// Combined with `#[serde(default)]`, a missing field stays `None`.
fn de_unset<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(d)?))
}

macro_rules! style_fields {
    ($($(#[$doc:meta])* $name:ident : $ty:ty),* $(,)?) => {
        /// One cascade layer of style properties.
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct Style {
            $(
                $(#[$doc])*
                #[serde(default, deserialize_with = "de_unset", skip_serializing_if = "Option::is_none")]
                pub $name: Option<Option<$ty>>,
            )*
        }

        impl Style {
            /// Fold an inner layer over this one. Inner values win; an inner
            /// unset (`Some(None)`) removes the property outright.
            pub fn over(&self, inner: &Style) -> Style {
                Style {
                    $($name: inner.$name.clone().or_else(|| self.$name.clone()),)*
                }
            }
        }
    };
}

style_fields! {
    /// Font name in the drawing surface's namespace (e.g. "Helvetica").
    font: String,
    font_size: f64,
    /// Text/stroke color as a CSS-ish string ("#000", "#aabbcc").
    color: String,
    background_color: String,
    align: Align,
    /// Vertical alignment of table cell content within its row.
    valign: VAlign,
    display: Display,
    /// Fixed content width for text nodes; absolute points or "NN%".
    width: Dim,
    /// Uniform padding; wins over the per-side values when present.
    padding: f64,
    padding_top: f64,
    padding_right: f64,
    padding_bottom: f64,
    padding_left: f64,
    /// Enable the border on all four sides.
    border: bool,
    border_top: bool,
    border_right: bool,
    border_bottom: bool,
    border_left: bool,
    border_width: f64,
    border_color: String,
    /// Stroke thickness for hline/vline nodes.
    line_width: f64,
    line_height: f64,
    /// Re-query free space per text line so text flows around obstacles.
    smart_wrap: bool,
    /// Start below every obstacle at the region's left edge.
    clear: bool,
    /// Allow content to run past the region bottom instead of requesting a
    /// page break. Forced on for margin regions.
    overflow: bool,
    /// Table cells only: keep just the first wrapped line.
    clip: bool,
}

/// Horizontal alignment of text within its line rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Vertical alignment of a table cell within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Whether an outline claims the full free span (block) or only its
/// intrinsic width (inline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Block,
    Inline,
}

/// Per-side thickness values (padding or border).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Fully resolved style: every value concrete, hard defaults applied.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub font: String,
    pub font_size: f64,
    pub color: String,
    pub background_color: Option<String>,
    pub align: Align,
    pub valign: VAlign,
    pub display: Display,
    pub width: Option<Dim>,
    pub padding: Sides,
    pub border: Sides,
    pub border_color: String,
    pub line_width: f64,
    pub line_height: f64,
    pub smart_wrap: bool,
    pub clear: bool,
    pub overflow: bool,
    pub clip: bool,
}

impl Resolved {
    /// Combined horizontal inset of padding and border, the text engine's
    /// per-line width offset.
    pub fn x_offset(&self) -> f64 {
        self.padding.horizontal() + self.border.horizontal()
    }

    pub fn has_border(&self) -> bool {
        self.border.top > 0.0
            || self.border.right > 0.0
            || self.border.bottom > 0.0
            || self.border.left > 0.0
    }
}

fn flat<T: Clone>(field: &Option<Option<T>>) -> Option<T> {
    field.clone().flatten()
}

impl Style {
    /// Resolve this (already cascaded) layer into concrete values.
    /// `default_display` is the node kind's display default: block for
    /// text/hline/table, inline for images and vlines.
    pub fn resolve(&self, default_display: Display) -> Resolved {
        let font_size = flat(&self.font_size).unwrap_or(12.0);

        let pad_uniform = flat(&self.padding);
        let padding = Sides {
            top: pad_uniform.or(flat(&self.padding_top)).unwrap_or(0.0),
            right: pad_uniform.or(flat(&self.padding_right)).unwrap_or(0.0),
            bottom: pad_uniform.or(flat(&self.padding_bottom)).unwrap_or(0.0),
            left: pad_uniform.or(flat(&self.padding_left)).unwrap_or(0.0),
        };

        let all_sides = flat(&self.border).unwrap_or(false);
        let bw = flat(&self.border_width).unwrap_or(1.0);
        let side = |enabled: Option<bool>| {
            if all_sides || enabled.unwrap_or(false) {
                bw
            } else {
                0.0
            }
        };
        let border = Sides {
            top: side(flat(&self.border_top)),
            right: side(flat(&self.border_right)),
            bottom: side(flat(&self.border_bottom)),
            left: side(flat(&self.border_left)),
        };

        Resolved {
            font: flat(&self.font).unwrap_or_else(|| "Helvetica".to_string()),
            font_size,
            color: flat(&self.color).unwrap_or_else(|| "#000".to_string()),
            background_color: flat(&self.background_color),
            align: flat(&self.align).unwrap_or_default(),
            valign: flat(&self.valign).unwrap_or_default(),
            display: flat(&self.display).unwrap_or(default_display),
            width: flat(&self.width),
            padding,
            border,
            border_color: flat(&self.border_color).unwrap_or_else(|| "#000".to_string()),
            line_width: flat(&self.line_width).unwrap_or(1.0),
            line_height: flat(&self.line_height).unwrap_or(font_size),
            smart_wrap: flat(&self.smart_wrap).unwrap_or(false),
            clear: flat(&self.clear).unwrap_or(false),
            overflow: flat(&self.overflow).unwrap_or(false),
            clip: flat(&self.clip).unwrap_or(false),
        }
    }
}

/// Fold a stack of layers, outermost first.
pub fn cascade(layers: &[&Style]) -> Style {
    let mut result = Style::default();
    for layer in layers {
        result = result.over(layer);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_layer_wins() {
        let outer: Style =
            serde_json::from_str(r##"{"font_size": 10, "color": "#333"}"##).unwrap();
        let inner: Style = serde_json::from_str(r#"{"font_size": 14}"#).unwrap();
        let merged = outer.over(&inner);
        let rs = merged.resolve(Display::Block);
        assert_eq!(rs.font_size, 14.0);
        assert_eq!(rs.color, "#333");
    }

    #[test]
    fn test_unset_removes_outer_value() {
        let outer: Style = serde_json::from_str(r##"{"color": "#f00"}"##).unwrap();
        let inner: Style = serde_json::from_str(r#"{"color": null}"#).unwrap();
        let merged = outer.over(&inner);
        let rs = merged.resolve(Display::Block);
        // Falls through to the hard default, not the outer layer.
        assert_eq!(rs.color, "#000");
    }

    #[test]
    fn test_unset_survives_further_cascade() {
        let a: Style = serde_json::from_str(r##"{"background_color": "#eee"}"##).unwrap();
        let b: Style = serde_json::from_str(r#"{"background_color": null}"#).unwrap();
        let c = Style::default();
        let merged = cascade(&[&a, &b, &c]);
        let rs = merged.resolve(Display::Block);
        assert_eq!(rs.background_color, None);
    }

    #[test]
    fn test_uniform_padding_wins() {
        let s: Style = serde_json::from_str(r#"{"padding": 6, "padding_left": 20}"#).unwrap();
        let rs = s.resolve(Display::Block);
        assert_eq!(rs.padding.left, 6.0);
        assert_eq!(rs.padding.top, 6.0);
    }

    #[test]
    fn test_per_side_padding() {
        let s: Style = serde_json::from_str(r#"{"padding_left": 20, "padding_top": 4}"#).unwrap();
        let rs = s.resolve(Display::Block);
        assert_eq!(rs.padding.left, 20.0);
        assert_eq!(rs.padding.top, 4.0);
        assert_eq!(rs.padding.right, 0.0);
    }

    #[test]
    fn test_border_sides() {
        let s: Style =
            serde_json::from_str(r#"{"border_left": true, "border_width": 2}"#).unwrap();
        let rs = s.resolve(Display::Block);
        assert_eq!(rs.border.left, 2.0);
        assert_eq!(rs.border.right, 0.0);
        assert!(rs.has_border());
    }

    #[test]
    fn test_border_true_defaults_to_one_point() {
        let s: Style = serde_json::from_str(r#"{"border": true}"#).unwrap();
        let rs = s.resolve(Display::Block);
        assert_eq!(rs.border.top, 1.0);
        assert_eq!(rs.x_offset(), 2.0);
    }

    #[test]
    fn test_line_height_defaults_to_font_size() {
        let s: Style = serde_json::from_str(r#"{"font_size": 18}"#).unwrap();
        let rs = s.resolve(Display::Block);
        assert_eq!(rs.line_height, 18.0);
    }

    #[test]
    fn test_display_default_per_kind() {
        let s = Style::default();
        assert_eq!(s.resolve(Display::Block).display, Display::Block);
        assert_eq!(s.resolve(Display::Inline).display, Display::Inline);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let r: Result<Style, _> = serde_json::from_str(r#"{"fnot_size": 12}"#);
        assert!(r.is_err());
    }
}

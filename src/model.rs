//! # Document Model
//!
//! The deserialized shape of a document description. Everything here is
//! plain data produced by serde; interpretation (cascading, placement,
//! pagination) happens in the layout modules.
//!
//! Content nodes are a tagged union on `object_type`. An unrecognized tag
//! deserializes to [`ItemKind::Unknown`] so a single bad node degrades to a
//! logged skip instead of failing the whole document.

use crate::geom::Dim;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A full document description as parsed from input JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    /// Document-wide style defaults, the outermost cascade layer.
    #[serde(default, rename = "default")]
    pub defaults: Style,

    pub page: Option<PageSetup>,

    pub header: Option<RegionDecl>,
    pub footer: Option<RegionDecl>,
    pub left_sidebar: Option<RegionDecl>,
    pub right_sidebar: Option<RegionDecl>,

    /// Body content, laid out in order into the body region.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Physical page parameters. `size` is the portrait-orientation
/// `[width, height]`; landscape swaps the two at layout time.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSetup {
    pub size: [f64; 2],
    #[serde(default)]
    pub layout: PageLayout,
    #[serde(default = "default_margin")]
    pub margin_top: f64,
    #[serde(default = "default_margin")]
    pub margin_right: f64,
    #[serde(default = "default_margin")]
    pub margin_bottom: f64,
    #[serde(default = "default_margin")]
    pub margin_left: f64,
}

fn default_margin() -> f64 {
    72.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    #[default]
    Portrait,
    Landscape,
}

impl PageSetup {
    /// Oriented page width and height.
    pub fn dimensions(&self) -> (f64, f64) {
        let (a, b) = (self.size[0], self.size[1]);
        match self.layout {
            PageLayout::Portrait => (a.min(b), a.max(b)),
            PageLayout::Landscape => (a.max(b), a.min(b)),
        }
    }
}

/// A margin region declaration: extent, page filter, own style layer, and
/// the items drawn inside it on every page it appears on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionDecl {
    /// Extent for header/footer regions.
    pub height: Option<Dim>,
    /// Extent for sidebar regions.
    pub width: Option<Dim>,
    /// When present, the region only appears on matching pages.
    pub pages: Option<Vec<PageFilter>>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl RegionDecl {
    pub fn applies_to(&self, page_number: u32) -> bool {
        match &self.pages {
            None => true,
            Some(filters) => filters.iter().any(|f| f.matches(page_number)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFilter {
    First,
}

impl PageFilter {
    pub fn matches(&self, page_number: u32) -> bool {
        match self {
            PageFilter::First => page_number == 1,
        }
    }
}

/// One content node: a style layer plus the kind-specific payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub style: Style,
    #[serde(flatten)]
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum ItemKind {
    Text {
        content: String,
    },
    Hline {
        line_length: Option<Dim>,
    },
    Vline {
        line_length: Option<Dim>,
    },
    Svg {
        #[serde(flatten)]
        source: AssetRef,
        width: Option<Dim>,
        height: Option<Dim>,
    },
    Png {
        #[serde(flatten)]
        source: AssetRef,
        width: Option<Dim>,
        height: Option<Dim>,
    },
    Table {
        content: TableSpec,
    },
    Pagebreak,
    #[serde(other)]
    Unknown,
}

/// Where an asset's bytes come from. `path` may be a filesystem path, a
/// `data:` URI, or raw base64; `url` is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRef {
    pub path: Option<String>,
    pub url: Option<String>,
}

impl AssetRef {
    /// The single source string, preferring `path`. Doubles as the asset
    /// cache key.
    pub fn locator(&self) -> Option<&str> {
        self.path.as_deref().or(self.url.as_deref())
    }
}

/// Declarative table description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableSpec {
    pub title: Option<String>,
    /// Overall table width; defaults to the containing region's width
    /// when absent.
    pub width: Option<Dim>,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Style layer for header cells.
    pub thead: Option<SectionStyle>,
    /// Style layer for data cells.
    pub tbody: Option<SectionStyle>,
    #[serde(default = "default_true")]
    pub show_header: bool,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub data: Vec<RowData>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    /// Key into each row's cell map.
    pub key: String,
    /// Header label; falls back to the key.
    pub name: Option<String>,
    pub width: Option<Dim>,
    #[serde(default)]
    pub style: Style,
}

impl Column {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionStyle {
    #[serde(default)]
    pub style: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// One rendered row per record; columns run across.
    #[default]
    Vertical,
    /// Transposed: one rendered row per column; records run across.
    Horizontal,
}

/// One record of table data plus its optional style layers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub cells: BTreeMap<String, String>,
    #[serde(default)]
    pub style: Style,
    /// Per-cell style layers keyed by column key, innermost in the fold.
    #[serde(default)]
    pub cell_styles: BTreeMap<String, Style>,
}

impl RowData {
    pub fn cell(&self, key: &str) -> &str {
        self.cells.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A serializable record of which pages were produced; used by callers
/// that want page-count metadata without inspecting surface output.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let doc: Document = serde_json::from_str(
            r#"{
                "page": {"size": [612, 792]},
                "items": [{"object_type": "text", "content": "hello"}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.items.len(), 1);
        let page = doc.page.unwrap();
        assert_eq!(page.margin_left, 72.0);
        assert_eq!(page.dimensions(), (612.0, 792.0));
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let page: PageSetup =
            serde_json::from_str(r#"{"size": [612, 792], "layout": "landscape"}"#).unwrap();
        assert_eq!(page.dimensions(), (792.0, 612.0));
    }

    #[test]
    fn test_unknown_object_type_degrades() {
        let item: Item =
            serde_json::from_str(r#"{"object_type": "hologram", "content": "x"}"#).unwrap();
        assert!(matches!(item.kind, ItemKind::Unknown));
    }

    #[test]
    fn test_image_source_locator() {
        let item: Item = serde_json::from_str(
            r#"{"object_type": "png", "path": "logo.png", "width": 100}"#,
        )
        .unwrap();
        match item.kind {
            ItemKind::Png { source, width, .. } => {
                assert_eq!(source.locator(), Some("logo.png"));
                assert_eq!(width, Some(crate::geom::Dim::Abs(100.0)));
            }
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn test_region_page_filter() {
        let decl: RegionDecl = serde_json::from_str(r#"{"height": 40, "pages": ["first"]}"#).unwrap();
        assert!(decl.applies_to(1));
        assert!(!decl.applies_to(2));
        assert!(RegionDecl::default().applies_to(7));
    }

    #[test]
    fn test_table_defaults() {
        let spec: TableSpec = serde_json::from_str(
            r#"{
                "columns": [{"key": "a"}, {"key": "b", "name": "Beta"}],
                "data": [{"cells": {"a": "1", "b": "2"}}]
            }"#,
        )
        .unwrap();
        assert!(spec.show_header);
        assert_eq!(spec.orientation, Orientation::Vertical);
        assert_eq!(spec.columns[0].label(), "a");
        assert_eq!(spec.columns[1].label(), "Beta");
        assert_eq!(spec.data[0].cell("a"), "1");
        assert_eq!(spec.data[0].cell("missing"), "");
    }

    #[test]
    fn test_item_style_layer() {
        let item: Item = serde_json::from_str(
            r#"{"object_type": "text", "content": "x", "style": {"font_size": 9}}"#,
        )
        .unwrap();
        let rs = item.style.resolve(crate::style::Display::Block);
        assert_eq!(rs.font_size, 9.0);
    }
}

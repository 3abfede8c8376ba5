//! # Quire
//!
//! A flow-layout and pagination engine.
//!
//! Most document renderers lay content out on an unbounded vertical canvas
//! and slice it into pages afterwards. Quire flows content *into* pages
//! instead: every placement is made against a live 2-D map of the free
//! space remaining on the current page, so wrapped text can pour around
//! earlier content, tables continue cleanly across page boundaries, and
//! margin regions are composed fresh on every page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Document tree: page setup, regions, content items
//!       ↓
//!   [style]    — Three-state cascade, inheritance, defaults
//!       ↓
//!   [layout]   — Free-space tracking, wrapping, tables, pagination
//!       ↓
//!   [surface]  — Recorded drawing commands
//! ```

pub mod assets;
pub mod error;
pub mod font;
pub mod geom;
pub mod layout;
pub mod model;
pub mod style;
pub mod surface;
pub mod svg;

pub use error::RenderError;
pub use layout::Layouter;
pub use model::{Document, RenderSummary};

use assets::{AssetSource, FsAssetSource};
use font::FontContext;
use surface::{RecordingSurface, Surface};

/// State that outlives a single render: registered fonts and the absolute
/// page counter, which keeps increasing when several documents are rendered
/// through the same session.
pub struct RenderSession {
    pub fonts: FontContext,
    pub absolute_page: u32,
}

impl RenderSession {
    pub fn new() -> Self {
        RenderSession {
            fonts: FontContext::new(),
            absolute_page: 0,
        }
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one document through an existing session, surface, and asset
/// source. This is the primary entry point; the convenience wrappers below
/// build the parts for you.
pub fn render_document(
    document: &Document,
    session: &mut RenderSession,
    surface: &mut dyn Surface,
    assets: &mut dyn AssetSource,
) -> Result<RenderSummary, RenderError> {
    let start = session.absolute_page;
    Layouter::new(document, session, surface, assets)?.run()?;
    Ok(RenderSummary {
        pages: session.absolute_page - start,
    })
}

/// Render a document to the recorded command stream as JSON bytes.
pub fn render(document: &Document) -> Result<Vec<u8>, RenderError> {
    let mut session = RenderSession::new();
    let mut surface = RecordingSurface::new();
    let mut assets = FsAssetSource::new();
    render_document(document, &mut session, &mut surface, &mut assets)?;
    Ok(surface.finish())
}

/// Render a document described as JSON.
pub fn render_json(json: &str) -> Result<Vec<u8>, RenderError> {
    let document: Document = serde_json::from_str(json)?;
    render(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_happy_path() {
        let out = render_json(
            r#"{
                "page": {"size": [612, 792]},
                "items": [{"object_type": "text", "content": "hello"}]
            }"#,
        )
        .unwrap();
        let pages: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(pages.as_array().unwrap().len(), 1);
        assert_eq!(pages[0]["commands"][0]["text"], "hello");
    }

    #[test]
    fn test_render_json_parse_error() {
        let err = render_json("{").unwrap_err();
        assert!(matches!(err, RenderError::Parse { .. }));
    }

    #[test]
    fn test_render_document_reports_page_count() {
        let doc: Document = serde_json::from_str(
            r#"{
                "page": {"size": [612, 792]},
                "items": [{"object_type": "pagebreak"}]
            }"#,
        )
        .unwrap();
        let mut session = RenderSession::new();
        let mut surface = RecordingSurface::new();
        let mut assets = FsAssetSource::new();
        let summary =
            render_document(&doc, &mut session, &mut surface, &mut assets).unwrap();
        assert_eq!(summary.pages, 2);
    }
}

//! # Layout Engine
//!
//! [`Layouter`] drives a whole document render: per page it draws the
//! margin regions, then flows body items through the free-space tracker
//! until they run out or request a new page. Placement arithmetic lives in
//! `placer`, text wrapping in `text`, tables in `table`; all of them are
//! `impl Layouter` blocks sharing this module's state.
//!
//! Page breaks are ordinary synchronous calls: whoever detects overflow
//! calls [`Layouter::break_page`], which finalizes nothing (the surface
//! owns page lifecycle), starts the next page, redraws the margin regions,
//! and swaps in a fresh body tracker. The caller then re-reads the flow
//! container and continues.

pub mod free_space;
pub mod region;

mod placer;
mod table;
mod text;

pub use placer::Placement;
pub use text::LineRecord;

use crate::assets::AssetSource;
use crate::error::RenderError;
use crate::model::{Document, Item, ItemKind, PageSetup, RegionDecl};
use crate::style::{Display, Style};
use crate::surface::Surface;
use crate::RenderSession;
use free_space::FreeSpaceTracker;
use region::RegionLayout;

/// Flow state for the region currently receiving content.
pub(crate) struct RegionFlow {
    pub tracker: FreeSpaceTracker,
    /// Lowest y below which cleared content must start.
    pub clear_y: f64,
    /// Margin regions never paginate; only the body may.
    pub can_break: bool,
}

impl RegionFlow {
    fn new(container: crate::geom::Rect, can_break: bool) -> Self {
        RegionFlow {
            clear_y: container.y,
            tracker: FreeSpaceTracker::new(container),
            can_break,
        }
    }
}

pub struct Layouter<'a> {
    doc: &'a Document,
    page: &'a PageSetup,
    session: &'a mut RenderSession,
    surface: &'a mut dyn Surface,
    assets: &'a mut dyn AssetSource,
    flow: RegionFlow,
    /// Cascade base for the current region: document defaults, plus the
    /// region's own style layer inside margin regions.
    base: Style,
    page_number: u32,
}

impl<'a> Layouter<'a> {
    pub fn new(
        doc: &'a Document,
        session: &'a mut RenderSession,
        surface: &'a mut dyn Surface,
        assets: &'a mut dyn AssetSource,
    ) -> Result<Self, RenderError> {
        let page = doc.page.as_ref().ok_or(RenderError::MissingPageSetup)?;
        Ok(Layouter {
            doc,
            page,
            session,
            surface,
            assets,
            flow: RegionFlow::new(crate::geom::Rect::default(), false),
            base: doc.defaults.clone(),
            page_number: 0,
        })
    }

    /// Render the whole document.
    pub fn run(mut self) -> Result<(), RenderError> {
        self.break_page();
        let doc = self.doc;
        for item in &doc.items {
            self.layout_item(item);
        }
        Ok(())
    }

    /// Start the next page: margin regions first, then a fresh body flow.
    /// Content engines call this mid-placement when they run out of room
    /// and resume against the new flow state.
    pub(crate) fn break_page(&mut self) {
        self.page_number += 1;
        self.session.absolute_page += 1;
        let (page_w, page_h) = self.page.dimensions();
        self.surface.begin_page(page_w, page_h);

        let doc = self.doc;
        let regions = RegionLayout::compute(
            self.page,
            doc.header.as_ref(),
            doc.footer.as_ref(),
            doc.left_sidebar.as_ref(),
            doc.right_sidebar.as_ref(),
            self.page_number,
        );

        let margin_regions = [
            (doc.header.as_ref(), regions.header),
            (doc.footer.as_ref(), regions.footer),
            (doc.left_sidebar.as_ref(), regions.left_sidebar),
            (doc.right_sidebar.as_ref(), regions.right_sidebar),
        ];
        for (decl, rect) in margin_regions {
            if let (Some(decl), Some(rect)) = (decl, rect) {
                self.layout_region(decl, rect);
            }
        }

        self.base = doc.defaults.clone();
        self.flow = RegionFlow::new(regions.body, true);
    }

    fn layout_region(&mut self, decl: &'a RegionDecl, rect: crate::geom::Rect) {
        self.base = self.doc.defaults.over(&decl.style);
        self.flow = RegionFlow::new(rect, false);
        for item in &decl.items {
            self.layout_item(item);
        }
    }

    fn layout_item(&mut self, item: &Item) {
        let style = self.base.over(&item.style);
        match &item.kind {
            ItemKind::Text { content } => {
                let rs = style.resolve(Display::Block);
                self.draw_text(content, &rs);
            }
            ItemKind::Hline { line_length } => {
                let rs = style.resolve(Display::Block);
                self.draw_hline(*line_length, &rs);
            }
            ItemKind::Vline { line_length } => {
                let rs = style.resolve(Display::Inline);
                self.draw_vline(*line_length, &rs);
            }
            ItemKind::Png {
                source,
                width,
                height,
            } => {
                let rs = style.resolve(Display::Inline);
                self.draw_png(source, *width, *height, &rs);
            }
            ItemKind::Svg {
                source,
                width,
                height,
            } => {
                let rs = style.resolve(Display::Inline);
                self.draw_svg(source, *width, *height, &rs);
            }
            ItemKind::Table { content } => {
                self.draw_table(content, &style);
            }
            ItemKind::Pagebreak => {
                if self.flow.can_break {
                    self.break_page();
                } else {
                    log::warn!("ignoring pagebreak inside a margin region");
                }
            }
            ItemKind::Unknown => {
                log::warn!("skipping content node with unknown object_type");
            }
        }
    }
}

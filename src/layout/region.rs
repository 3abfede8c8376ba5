//! # Margin Regions
//!
//! Splits the page's content area (inside the margins) into up to five
//! rects: header, footer, two sidebars, and the body. Regions that are
//! absent, filtered off the current page, or resolve to a degenerate
//! extent claim no space; their neighbors expand over it, so the body
//! reclaims every point a region gives up.
//!
//! Header and footer take the full content width; sidebars occupy the
//! strip between them. The body is what remains in the middle.

use crate::geom::{Dim, Rect};
use crate::model::{PageSetup, RegionDecl};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLayout {
    pub header: Option<Rect>,
    pub footer: Option<Rect>,
    pub left_sidebar: Option<Rect>,
    pub right_sidebar: Option<Rect>,
    pub body: Rect,
}

/// Resolved extent of one declared region on one page. Zero when the
/// region does not apply.
fn extent(decl: Option<&RegionDecl>, dim_of: fn(&RegionDecl) -> Option<Dim>, parent: f64, page_number: u32) -> f64 {
    match decl {
        Some(d) if d.applies_to(page_number) => dim_of(d)
            .map(|dim| dim.resolve(parent))
            .unwrap_or(0.0)
            .max(0.0),
        _ => 0.0,
    }
}

impl RegionLayout {
    pub fn compute(
        page: &PageSetup,
        header: Option<&RegionDecl>,
        footer: Option<&RegionDecl>,
        left_sidebar: Option<&RegionDecl>,
        right_sidebar: Option<&RegionDecl>,
        page_number: u32,
    ) -> RegionLayout {
        let (page_w, page_h) = page.dimensions();
        let content = Rect::new(
            page.margin_left,
            page.margin_top,
            (page_w - page.margin_left - page.margin_right).max(0.0),
            (page_h - page.margin_top - page.margin_bottom).max(0.0),
        );

        let header_h = extent(header, |d| d.height, content.height, page_number);
        let footer_h = extent(footer, |d| d.height, content.height, page_number);
        let left_w = extent(left_sidebar, |d| d.width, content.width, page_number);
        let right_w = extent(right_sidebar, |d| d.width, content.width, page_number);

        let mid_y = content.y + header_h;
        let mid_h = (content.height - header_h - footer_h).max(0.0);

        let nonzero = |r: Rect| (r.width > 0.0 && r.height > 0.0).then_some(r);

        RegionLayout {
            header: nonzero(Rect::new(content.x, content.y, content.width, header_h)),
            footer: nonzero(Rect::new(
                content.x,
                content.bottom() - footer_h,
                content.width,
                footer_h,
            )),
            left_sidebar: nonzero(Rect::new(content.x, mid_y, left_w, mid_h)),
            right_sidebar: nonzero(Rect::new(
                content.right() - right_w,
                mid_y,
                right_w,
                mid_h,
            )),
            body: Rect::new(
                content.x + left_w,
                mid_y,
                (content.width - left_w - right_w).max(0.0),
                mid_h,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> PageSetup {
        serde_json::from_str(r#"{"size": [612, 792]}"#).unwrap()
    }

    fn region(json: &str) -> RegionDecl {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_no_regions_body_fills_content_area() {
        let page = letter();
        let layout = RegionLayout::compute(&page, None, None, None, None, 1);
        assert_eq!(layout.body, Rect::new(72.0, 72.0, 468.0, 648.0));
        assert!(layout.header.is_none());
        assert!(layout.footer.is_none());
    }

    #[test]
    fn test_header_and_footer_shrink_body() {
        let page = letter();
        let header = region(r#"{"height": 40}"#);
        let footer = region(r#"{"height": 30}"#);
        let layout = RegionLayout::compute(&page, Some(&header), Some(&footer), None, None, 1);
        assert_eq!(layout.header, Some(Rect::new(72.0, 72.0, 468.0, 40.0)));
        assert_eq!(layout.footer, Some(Rect::new(72.0, 690.0, 468.0, 30.0)));
        assert_eq!(layout.body, Rect::new(72.0, 112.0, 468.0, 578.0));
    }

    #[test]
    fn test_sidebars_sit_between_header_and_footer() {
        let page = letter();
        let header = region(r#"{"height": 40}"#);
        let left = region(r#"{"width": 100}"#);
        let layout = RegionLayout::compute(&page, Some(&header), None, Some(&left), None, 1);
        let sidebar = layout.left_sidebar.unwrap();
        assert_eq!(sidebar, Rect::new(72.0, 112.0, 100.0, 608.0));
        assert_eq!(layout.body.x, 172.0);
        assert_eq!(layout.body.width, 368.0);
    }

    #[test]
    fn test_fractional_extent_resolves_against_content() {
        let page = letter();
        let right = region(r#"{"width": "25%"}"#);
        let layout = RegionLayout::compute(&page, None, None, None, Some(&right), 1);
        let sidebar = layout.right_sidebar.unwrap();
        assert_eq!(sidebar.width, 117.0);
        assert_eq!(sidebar.x, 540.0 - 117.0);
    }

    #[test]
    fn test_zero_extent_region_reclaimed_by_body() {
        let page = letter();
        let header = region(r#"{"height": 0}"#);
        let layout = RegionLayout::compute(&page, Some(&header), None, None, None, 1);
        assert!(layout.header.is_none());
        assert_eq!(layout.body.y, 72.0);
        assert_eq!(layout.body.height, 648.0);
    }

    #[test]
    fn test_page_filter_releases_space_on_later_pages() {
        let page = letter();
        let header = region(r#"{"height": 40, "pages": ["first"]}"#);
        let first = RegionLayout::compute(&page, Some(&header), None, None, None, 1);
        let second = RegionLayout::compute(&page, Some(&header), None, None, None, 2);
        assert!(first.header.is_some());
        assert!(second.header.is_none());
        assert_eq!(second.body.height, first.body.height + 40.0);
    }
}

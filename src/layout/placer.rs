//! Placement arithmetic: turning a content size plus resolved style into
//! an outline rect (the tracker footprint) and a draw rect (where content
//! actually renders), with page-break handling when the outline cannot fit
//! the current region. Also home to the simple nodes that are nothing but
//! one placement and one draw call: rules and images.

use super::Layouter;
use crate::assets::probe_raster;
use crate::geom::{Dim, Rect};
use crate::model::AssetRef;
use crate::style::{Align, Display, Resolved};
use crate::svg;

/// The result of one placement decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Full footprint including padding and border; what gets registered
    /// as an obstacle.
    pub outline: Rect,
    /// Inner rect where the content itself renders.
    pub draw: Rect,
}

impl Layouter<'_> {
    /// Decide where a `content_w` x `content_h` block goes under the
    /// current flow state. May call `break_page` once when the block
    /// overflows the region bottom; a block too tall even for a fresh
    /// page is placed at the top anyway and overflows visually.
    ///
    /// The caller draws first and registers `outline` as an obstacle
    /// afterwards.
    pub(crate) fn place(&mut self, content_w: f64, content_h: f64, rs: &Resolved) -> Placement {
        let ow = content_w + rs.x_offset();
        let oh = content_h + rs.padding.vertical() + rs.border.vertical();

        let (mut x, mut y, mut avail_w) = self.find_spot(ow, oh, rs);

        let container = self.flow.tracker.container();
        if y + oh > container.bottom() && self.flow.can_break && !rs.overflow {
            let at_fresh_top = self.flow.tracker.is_empty() && (y - container.y).abs() < 1e-9;
            if !at_fresh_top {
                self.break_page();
                let c = self.flow.tracker.container();
                x = c.x;
                y = c.y;
                avail_w = c.width;
            }
        }

        let outline_w = match rs.display {
            Display::Block => avail_w.max(ow),
            Display::Inline => ow,
        };
        let outline = Rect::new(x, y, outline_w, oh);

        let mut draw_x = x + rs.border.left + rs.padding.left;
        if outline_w > ow {
            match rs.align {
                Align::Center => draw_x += (outline_w - ow) / 2.0,
                Align::Right => draw_x += outline_w - ow,
                Align::Left | Align::Justify => {}
            }
        }
        let draw = Rect::new(
            draw_x,
            y + rs.border.top + rs.padding.top,
            content_w,
            content_h,
        );

        Placement { outline, draw }
    }

    /// Position for the outline: below everything for `clear`, otherwise
    /// the tracker's choice. Returns (x, y, available width at x).
    fn find_spot(&mut self, ow: f64, oh: f64, rs: &Resolved) -> (f64, f64, f64) {
        let container = self.flow.tracker.container();
        if rs.clear {
            let y = self
                .flow
                .tracker
                .lowest_edge_below(0.0)
                .max(self.flow.clear_y);
            self.flow.clear_y = y;
            (container.x, y, container.width)
        } else {
            let pos = self.flow.tracker.next_free_position(ow, oh, self.flow.clear_y);
            (pos.x, pos.y, pos.span.right() - pos.x)
        }
    }

    /// Paint an outline's background fill and border edges. Borders render
    /// as filled strips so each side can differ.
    pub(crate) fn paint_box(&mut self, outline: Rect, rs: &Resolved) {
        if let Some(bg) = &rs.background_color {
            self.surface.fill_rect(outline, bg);
        }
        let b = rs.border;
        if b.top > 0.0 {
            self.surface
                .fill_rect(Rect::new(outline.x, outline.y, outline.width, b.top), &rs.border_color);
        }
        if b.bottom > 0.0 {
            self.surface.fill_rect(
                Rect::new(outline.x, outline.bottom() - b.bottom, outline.width, b.bottom),
                &rs.border_color,
            );
        }
        if b.left > 0.0 {
            self.surface.fill_rect(
                Rect::new(outline.x, outline.y, b.left, outline.height),
                &rs.border_color,
            );
        }
        if b.right > 0.0 {
            self.surface.fill_rect(
                Rect::new(outline.right() - b.right, outline.y, b.right, outline.height),
                &rs.border_color,
            );
        }
    }

    pub(crate) fn draw_hline(&mut self, line_length: Option<Dim>, rs: &Resolved) {
        let container = self.flow.tracker.container();
        let length = line_length
            .map(|d| d.resolve(container.width))
            .unwrap_or(container.width - rs.x_offset())
            .max(0.0);
        let p = self.place(length, rs.line_width, rs);
        self.paint_box(p.outline, rs);
        self.surface.fill_rect(p.draw, &rs.color);
        self.flow.tracker.add_obstacle(p.outline);
    }

    pub(crate) fn draw_vline(&mut self, line_length: Option<Dim>, rs: &Resolved) {
        let container = self.flow.tracker.container();
        let length = line_length
            .map(|d| d.resolve(container.height))
            .unwrap_or(DEFAULT_VLINE_LENGTH)
            .max(0.0);
        let p = self.place(rs.line_width, length, rs);
        self.paint_box(p.outline, rs);
        self.surface.fill_rect(p.draw, &rs.color);
        self.flow.tracker.add_obstacle(p.outline);
    }

    pub(crate) fn draw_png(
        &mut self,
        source: &AssetRef,
        width: Option<Dim>,
        height: Option<Dim>,
        rs: &Resolved,
    ) {
        let Some(locator) = source.locator() else {
            log::warn!("png node without path or url, skipping");
            return;
        };
        let bytes = match self.assets.load(locator) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("failed to load image {locator}: {e}");
                return;
            }
        };
        let Some(info) = probe_raster(&bytes) else {
            log::warn!("undecodable image data in {locator}, skipping");
            return;
        };

        let container = self.flow.tracker.container();
        let (w, h) = sized(width, height, info.width as f64, info.height as f64, container);
        let p = self.place(w, h, rs);
        self.paint_box(p.outline, rs);
        self.surface
            .draw_image(&bytes, p.draw.x, p.draw.y, p.draw.width, p.draw.height);
        self.flow.tracker.add_obstacle(p.outline);
    }

    pub(crate) fn draw_svg(
        &mut self,
        source: &AssetRef,
        width: Option<Dim>,
        height: Option<Dim>,
        rs: &Resolved,
    ) {
        let Some(locator) = source.locator() else {
            log::warn!("svg node without path or url, skipping");
            return;
        };
        let bytes = match self.assets.load(locator) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("failed to load vector asset {locator}: {e}");
                return;
            }
        };
        let markup = String::from_utf8_lossy(&bytes);
        let Some(norm) = svg::normalize(&markup) else {
            log::warn!("unusable vector markup in {locator}, skipping");
            return;
        };

        let container = self.flow.tracker.container();
        let (w, h) = sized(width, height, norm.width, norm.height, container);
        let p = self.place(w, h, rs);
        self.paint_box(p.outline, rs);

        self.surface.save_state();
        self.surface.translate(p.draw.x, p.draw.y);
        self.surface.scale(w / norm.width, h / norm.height);
        self.surface.translate(-norm.min_x, -norm.min_y);
        for prim in &norm.primitives {
            self.surface.draw_path(
                &prim.data,
                prim.fill.as_deref(),
                prim.stroke.as_deref(),
                prim.stroke_width,
                prim.opacity,
            );
        }
        self.surface.restore_state();

        self.flow.tracker.add_obstacle(p.outline);
    }
}

/// Fallback vertical rule length when the node declares none.
const DEFAULT_VLINE_LENGTH: f64 = 100.0;

/// Target size for an asset: declared dims resolve against the container,
/// a single declared dim preserves the intrinsic aspect ratio, and with
/// neither the intrinsic size is used as points.
fn sized(
    width: Option<Dim>,
    height: Option<Dim>,
    intrinsic_w: f64,
    intrinsic_h: f64,
    container: Rect,
) -> (f64, f64) {
    let aspect = if intrinsic_w > 0.0 && intrinsic_h > 0.0 {
        intrinsic_h / intrinsic_w
    } else {
        1.0
    };
    match (width, height) {
        (Some(w), Some(h)) => (w.resolve(container.width), h.resolve(container.height)),
        (Some(w), None) => {
            let w = w.resolve(container.width);
            (w, w * aspect)
        }
        (None, Some(h)) => {
            let h = h.resolve(container.height);
            (h / aspect, h)
        }
        (None, None) => (intrinsic_w, intrinsic_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsAssetSource;
    use crate::model::Document;
    use crate::surface::{Command, RecordingSurface};
    use crate::RenderSession;

    fn render(json: &str) -> RecordingSurface {
        let doc: Document = serde_json::from_str(json).unwrap();
        let mut session = RenderSession::new();
        let mut surface = RecordingSurface::new();
        let mut assets = FsAssetSource::new();
        Layouter::new(&doc, &mut session, &mut surface, &mut assets)
            .unwrap()
            .run()
            .unwrap();
        surface
    }

    fn fill_rects(surface: &RecordingSurface, page: usize) -> Vec<Rect> {
        surface.pages()[page]
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_hline_defaults_to_full_width() {
        let surface = render(
            r#"{
                "page": {"size": [400, 400], "margin_top": 50, "margin_right": 50,
                         "margin_bottom": 50, "margin_left": 50},
                "items": [{"object_type": "hline"}]
            }"#,
        );
        let rects = fill_rects(&surface, 0);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0], Rect::new(50.0, 50.0, 300.0, 1.0));
    }

    #[test]
    fn test_vlines_flow_side_by_side() {
        let surface = render(
            r#"{
                "page": {"size": [400, 400], "margin_top": 0, "margin_right": 0,
                         "margin_bottom": 0, "margin_left": 0},
                "items": [
                    {"object_type": "vline", "line_length": 50, "style": {"line_width": 10}},
                    {"object_type": "vline", "line_length": 50, "style": {"line_width": 10}}
                ]
            }"#,
        );
        let rects = fill_rects(&surface, 0);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].y, rects[1].y);
        assert_eq!(rects[1].x, rects[0].x + 10.0);
    }

    #[test]
    fn test_clear_starts_below_tallest_obstacle() {
        let surface = render(
            r#"{
                "page": {"size": [300, 400], "margin_top": 0, "margin_right": 0,
                         "margin_bottom": 0, "margin_left": 0},
                "items": [
                    {"object_type": "vline", "line_length": 50, "style": {"line_width": 100}},
                    {"object_type": "vline", "line_length": 80, "style": {"line_width": 100}},
                    {"object_type": "hline", "style": {"clear": true}}
                ]
            }"#,
        );
        let rects = fill_rects(&surface, 0);
        assert_eq!(rects[2].y, 80.0);
        assert_eq!(rects[2].x, 0.0);
    }

    #[test]
    fn test_overflow_requests_one_page_then_places_at_top() {
        let surface = render(
            r#"{
                "page": {"size": [200, 100], "margin_top": 10, "margin_right": 10,
                         "margin_bottom": 10, "margin_left": 10},
                "items": [
                    {"object_type": "hline"},
                    {"object_type": "vline", "line_length": 300}
                ]
            }"#,
        );
        // The oversized vline breaks once and overflows the second page.
        assert_eq!(surface.page_count(), 2);
        let rects = fill_rects(&surface, 1);
        assert_eq!(rects[0].y, 10.0);
    }

    #[test]
    fn test_padding_insets_draw_rect() {
        let surface = render(
            r#"{
                "page": {"size": [400, 400], "margin_top": 0, "margin_right": 0,
                         "margin_bottom": 0, "margin_left": 0},
                "items": [{"object_type": "hline", "line_length": 100, "style": {"padding": 8}}]
            }"#,
        );
        let rects = fill_rects(&surface, 0);
        assert_eq!(rects[0], Rect::new(8.0, 8.0, 100.0, 1.0));
    }

    #[test]
    fn test_background_painted_over_outline() {
        let surface = render(
            r##"{
                "page": {"size": [400, 400], "margin_top": 0, "margin_right": 0,
                         "margin_bottom": 0, "margin_left": 0},
                "items": [{"object_type": "hline", "line_length": 50,
                           "style": {"padding": 5, "background_color": "#eee", "display": "inline"}}]
            }"##,
        );
        let rects = fill_rects(&surface, 0);
        // Background first, then the rule.
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 60.0, 11.0));
        assert_eq!(rects[1], Rect::new(5.0, 5.0, 50.0, 1.0));
    }

    #[test]
    fn test_sized_preserves_aspect() {
        let container = Rect::new(0.0, 0.0, 300.0, 400.0);
        assert_eq!(
            sized(Some(Dim::Abs(100.0)), None, 50.0, 25.0, container),
            (100.0, 50.0)
        );
        assert_eq!(
            sized(None, Some(Dim::Abs(50.0)), 50.0, 25.0, container),
            (100.0, 50.0)
        );
        assert_eq!(sized(None, None, 50.0, 25.0, container), (50.0, 25.0));
        assert_eq!(
            sized(Some(Dim::Fraction(0.5)), Some(Dim::Abs(40.0)), 50.0, 25.0, container),
            (150.0, 40.0)
        );
    }
}

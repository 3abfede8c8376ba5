//! Text flow: wraps a node's content into a queue of positioned line
//! records, then flushes the queue to the surface. Wrapping consults the
//! free-space tracker per line in smart-wrap mode, so text can flow around
//! obstacles and widen when they end. A forced page break mid-paragraph
//! flushes the queue early; flushing is idempotent (drawn records are
//! skipped) because the end-of-node flush traverses the same queue again.

use super::Layouter;
use crate::geom::Rect;
use crate::style::{Align, Resolved};
use crate::surface::TextOptions;

/// One wrapped line, positioned and ready to draw.
#[derive(Debug, Clone)]
pub struct LineRecord {
    /// Line footprint; registered as an obstacle when flushed.
    pub rect: Rect,
    pub text: String,
    pub align: Align,
    /// Extra inter-word spacing from justification.
    pub word_spacing: f64,
    /// Width the surface aligns the run against.
    pub render_width: f64,
    /// Vertical inset before the glyphs; nonzero on a node's first line,
    /// which absorbs the top padding and border.
    pub top_pad: f64,
    pub drawn: bool,
}

/// Build the record for one finished line. Justification spreads the slack
/// over the gaps of non-final lines with at least two words; the final
/// line of a paragraph always renders at natural spacing.
fn make_record(
    col: Rect,
    words: &[&str],
    widths: &[f64],
    rs: &Resolved,
    space_w: f64,
    is_final: bool,
    first: bool,
) -> LineRecord {
    let top_pad = if first {
        rs.padding.top + rs.border.top
    } else {
        0.0
    };
    let avail = col.width - rs.x_offset();
    let text = words.join(" ");

    let (align, word_spacing) = if rs.align == Align::Justify && !is_final && words.len() >= 2 {
        let total: f64 = widths.iter().sum();
        let gap = (avail - total) / (words.len() - 1) as f64;
        (Align::Left, (gap - space_w).max(0.0))
    } else {
        let align = if rs.align == Align::Justify {
            Align::Left
        } else {
            rs.align
        };
        (align, 0.0)
    };

    LineRecord {
        rect: Rect::new(col.x, col.y, col.width, rs.line_height + top_pad),
        text,
        align,
        word_spacing,
        render_width: avail,
        top_pad,
        drawn: false,
    }
}

impl Layouter<'_> {
    /// Lay out and draw one text node under the current flow state.
    pub(crate) fn draw_text(&mut self, content: &str, rs: &Resolved) {
        let line_h = rs.line_height;
        let x_offset = rs.x_offset();
        let space_w = self.session.fonts.space_width(&rs.font, rs.font_size);

        let container = self.flow.tracker.container();
        let fixed_w = rs.width.map(|d| d.resolve(container.width) + x_offset);

        let mut col = self.first_line_rect(rs, fixed_w, line_h);

        // A node starting past the region bottom breaks immediately,
        // unless the region is already fresh (then it just overflows).
        if col.y + line_h > container.bottom() && self.flow.can_break && !rs.overflow {
            let at_fresh_top =
                self.flow.tracker.is_empty() && (col.y - container.y).abs() < 1e-9;
            if !at_fresh_top {
                self.break_page();
                let c = self.flow.tracker.container();
                col = Rect::new(c.x, c.y, fixed_w.unwrap_or(c.width), line_h);
            }
        }

        let mut queue: Vec<LineRecord> = Vec::new();
        let mut first = true;

        let paragraphs: Vec<&str> = content.split('\n').collect();
        for (pi, para) in paragraphs.iter().enumerate() {
            let mut line: Vec<&str> = Vec::new();
            let mut widths: Vec<f64> = Vec::new();
            let mut used = 0.0;

            for word in para.split_whitespace() {
                let ww = self.session.fonts.measure(word, &rs.font, rs.font_size);
                if !line.is_empty() && used + ww + space_w > col.width - x_offset {
                    queue.push(make_record(col, &line, &widths, rs, space_w, false, first));
                    first = false;
                    self.advance_line(&mut queue, &mut col, rs, fixed_w, Some(ww + x_offset));
                    line.clear();
                    widths.clear();
                    used = 0.0;
                }
                used += if line.is_empty() { ww } else { ww + space_w };
                line.push(word);
                widths.push(ww);
            }

            queue.push(make_record(col, &line, &widths, rs, space_w, true, first));
            first = false;
            if pi + 1 < paragraphs.len() {
                self.advance_line(&mut queue, &mut col, rs, fixed_w, None);
            }
        }

        // The last line absorbs the bottom padding and border.
        if let Some(last) = queue.last_mut() {
            last.rect.height += rs.padding.bottom + rs.border.bottom;
        }
        self.flush_lines(&mut queue, rs);
    }

    /// Column rect for a node's first line: fixed width when declared,
    /// otherwise the leftmost free span wide enough to start.
    fn first_line_rect(&mut self, rs: &Resolved, fixed_w: Option<f64>, line_h: f64) -> Rect {
        let container = self.flow.tracker.container();
        if rs.clear {
            let y = self
                .flow
                .tracker
                .lowest_edge_below(0.0)
                .max(self.flow.clear_y);
            self.flow.clear_y = y;
            Rect::new(container.x, y, fixed_w.unwrap_or(container.width), line_h)
        } else {
            let want = fixed_w
                .unwrap_or(rs.x_offset() + 1.0)
                .min(container.width);
            let pos = self
                .flow
                .tracker
                .next_free_position(want, line_h, self.flow.clear_y);
            let width = fixed_w.unwrap_or(pos.span.right() - pos.x);
            Rect::new(pos.x, pos.y, width, line_h)
        }
    }

    /// Move the column to the next line, flushing and breaking the page
    /// when the region runs out. In smart-wrap mode the column re-derives
    /// its horizontal extent from the free spans at the new y, descending
    /// past bands too narrow for the next word.
    fn advance_line(
        &mut self,
        queue: &mut Vec<LineRecord>,
        col: &mut Rect,
        rs: &Resolved,
        fixed_w: Option<f64>,
        needed_w: Option<f64>,
    ) {
        let line_h = rs.line_height;
        let last_h = queue.last().map(|r| r.rect.height).unwrap_or(line_h);
        let next_y = col.y + last_h;
        let container = self.flow.tracker.container();

        if next_y + line_h > container.bottom() && self.flow.can_break && !rs.overflow {
            self.flush_lines(queue, rs);
            self.break_page();
            let c = self.flow.tracker.container();
            *col = Rect::new(c.x, c.y, fixed_w.unwrap_or(c.width), line_h);
        } else {
            col.y = next_y;
        }

        if rs.smart_wrap && fixed_w.is_none() {
            self.requery_column(queue, col, rs, needed_w);
        }
    }

    fn requery_column(
        &mut self,
        queue: &mut Vec<LineRecord>,
        col: &mut Rect,
        rs: &Resolved,
        needed_w: Option<f64>,
    ) {
        let line_h = rs.line_height;
        loop {
            let container = self.flow.tracker.container();
            let need = needed_w
                .unwrap_or(rs.x_offset() + 1.0)
                .min(container.width);
            if let Some(span) = self
                .flow
                .tracker
                .leftmost_fitting_span(col.y, line_h, need, &[])
            {
                col.x = span.x;
                col.width = span.width;
                return;
            }
            let next_y = col.y + line_h;
            if next_y + line_h > container.bottom() {
                if self.flow.can_break && !rs.overflow {
                    self.flush_lines(queue, rs);
                    self.break_page();
                    let c = self.flow.tracker.container();
                    *col = Rect::new(c.x, c.y, c.width, line_h);
                } else {
                    col.y = next_y;
                    col.x = container.x;
                    col.width = container.width;
                    return;
                }
            } else {
                col.y = next_y;
            }
        }
    }

    /// Draw every undrawn record and register its rect as an obstacle.
    /// Safe to call repeatedly over the same queue.
    pub(crate) fn flush_lines(&mut self, queue: &mut [LineRecord], rs: &Resolved) {
        let mut extent: Option<Rect> = None;
        for rec in queue.iter().filter(|r| !r.drawn) {
            extent = Some(match extent {
                Some(u) => u.union(&rec.rect),
                None => rec.rect,
            });
        }
        let Some(extent) = extent else { return };

        // Fixed-column text paints its box over the whole flushed block;
        // smart-wrapped lines have no single box to paint.
        if !rs.smart_wrap && (rs.background_color.is_some() || rs.has_border()) {
            self.paint_box(extent, rs);
        }

        self.render_lines(queue, rs, true);
    }

    /// Draw records without box painting. Table cells use this directly
    /// since the table strokes its own grid and registers one cumulative
    /// obstacle.
    pub(crate) fn render_lines(
        &mut self,
        queue: &mut [LineRecord],
        rs: &Resolved,
        register: bool,
    ) {
        for rec in queue.iter_mut().filter(|r| !r.drawn) {
            let opts = TextOptions {
                width: rec.render_width,
                align: rec.align,
                word_spacing: rec.word_spacing,
                font: &rs.font,
                size: rs.font_size,
                color: &rs.color,
            };
            self.surface.draw_text(
                &rec.text,
                rec.rect.x + rs.border.left + rs.padding.left,
                rec.rect.y + rec.top_pad,
                &opts,
            );
            if register {
                self.flow.tracker.add_obstacle(rec.rect);
            }
            rec.drawn = true;
        }
    }

    /// Wrap text into line records inside a fixed rect, without consulting
    /// the tracker or drawing anything. Used for table cells, which are
    /// measured at a provisional position and shifted before rendering.
    pub(crate) fn queue_cell_lines(&self, text: &str, rect: Rect, rs: &Resolved) -> Vec<LineRecord> {
        let space_w = self.session.fonts.space_width(&rs.font, rs.font_size);
        let x_offset = rs.x_offset();
        let mut col = Rect::new(rect.x, rect.y, rect.width, rs.line_height);
        let mut records = Vec::new();
        let mut first = true;

        for para in text.split('\n') {
            let mut line: Vec<&str> = Vec::new();
            let mut widths: Vec<f64> = Vec::new();
            let mut used = 0.0;

            for word in para.split_whitespace() {
                let ww = self.session.fonts.measure(word, &rs.font, rs.font_size);
                if !line.is_empty() && used + ww + space_w > col.width - x_offset {
                    let rec = make_record(col, &line, &widths, rs, space_w, false, first);
                    col.y += rec.rect.height;
                    records.push(rec);
                    first = false;
                    line.clear();
                    widths.clear();
                    used = 0.0;
                }
                used += if line.is_empty() { ww } else { ww + space_w };
                line.push(word);
                widths.push(ww);
            }

            let rec = make_record(col, &line, &widths, rs, space_w, true, first);
            col.y += rec.rect.height;
            records.push(rec);
            first = false;
        }

        if let Some(last) = records.last_mut() {
            last.rect.height += rs.padding.bottom + rs.border.bottom;
        }
        records
    }
}

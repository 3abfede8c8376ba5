//! Table layout: a declarative column/row description becomes a grid of
//! measured text cells. Each row is laid out in two passes (measure every
//! cell's wrapped height, then vertically align cells to the row's max
//! height), rows paginate at row boundaries only, and continuation pages
//! re-draw the title ("cont.") and the header row. The parent tracker
//! sees one cumulative obstacle per page slab, not per cell.

use super::text::LineRecord;
use super::Layouter;
use crate::geom::Rect;
use crate::model::{Orientation, TableSpec};
use crate::style::{Display, Resolved, Style, VAlign};

const GRID_STROKE_WIDTH: f64 = 0.5;
const PLACEMENT_PROBE_HEIGHT: f64 = 10.0;

struct CellSpec {
    text: String,
    width: f64,
    style: Resolved,
}

struct RowSpec {
    cells: Vec<CellSpec>,
    header: bool,
}

impl RowSpec {
    fn x_of(&self, x0: f64, cell_index: usize) -> f64 {
        x0 + self.cells[..cell_index].iter().map(|c| c.width).sum::<f64>()
    }
}

/// Per-column widths for the vertical orientation. Declared widths
/// resolve against the table width and are floored; undeclared columns
/// split the remainder evenly; the last column absorbs the rounding
/// difference so the grid always spans the full table width.
fn column_widths(spec: &TableSpec, total: f64) -> Vec<f64> {
    let declared: Vec<Option<f64>> = spec
        .columns
        .iter()
        .map(|c| c.width.map(|d| d.resolve(total).floor()))
        .collect();
    let used: f64 = declared.iter().flatten().sum();
    let open = declared.iter().filter(|w| w.is_none()).count();
    let even = if open > 0 {
        (total - used).max(0.0) / open as f64
    } else {
        0.0
    };
    let mut widths: Vec<f64> = declared.iter().map(|w| w.unwrap_or(even)).collect();
    let sum: f64 = widths.iter().sum();
    if let Some(last) = widths.last_mut() {
        *last += total - sum;
    }
    widths
}

impl Layouter<'_> {
    pub(crate) fn draw_table(&mut self, spec: &TableSpec, style: &Style) {
        if spec.columns.is_empty() {
            log::warn!("skipping table without columns");
            return;
        }

        let rs = style.resolve(Display::Block);
        let container = self.flow.tracker.container();
        let twidth = spec
            .width
            .map(|d| d.resolve(container.width))
            .unwrap_or(container.width - rs.x_offset());

        let p = self.place(twidth, PLACEMENT_PROBE_HEIGHT, &rs);
        let x0 = p.draw.x;
        let slab_x = p.outline.x;
        let slab_w = p.outline.width;

        let rows = self.build_rows(spec, style, twidth);
        let repeat_header = spec.orientation == Orientation::Vertical && spec.show_header;

        let mut table_top = p.outline.y;
        let mut y = p.draw.y;
        if let Some(title) = &spec.title {
            y = self.draw_table_title(title, x0, y, twidth, &rs);
        }

        for row in &rows {
            let (lines, row_h) = self.measure_row(row, x0, y);
            let container = self.flow.tracker.container();
            let overflows = y + row_h > container.bottom();
            if overflows && self.flow.can_break && !rs.overflow && y > container.y {
                if y - table_top > 0.0 {
                    self.flow
                        .tracker
                        .add_obstacle(Rect::new(slab_x, table_top, slab_w, y - table_top));
                }
                self.break_page();
                let c = self.flow.tracker.container();
                y = c.y;
                table_top = y;
                if let Some(title) = &spec.title {
                    y = self.draw_table_title(&format!("{title} cont."), x0, y, twidth, &rs);
                }
                if repeat_header && !row.header {
                    if let Some(header_row) = rows.iter().find(|r| r.header) {
                        let (hl, hh) = self.measure_row(header_row, x0, y);
                        self.draw_row(header_row, hl, x0, y, hh);
                        y += hh;
                    }
                }
                let (lines, row_h) = self.measure_row(row, x0, y);
                self.draw_row(row, lines, x0, y, row_h);
                y += row_h;
            } else {
                self.draw_row(row, lines, x0, y, row_h);
                y += row_h;
            }
        }

        if y - table_top > 0.0 {
            self.flow
                .tracker
                .add_obstacle(Rect::new(slab_x, table_top, slab_w, y - table_top));
        }
    }

    /// Expand the declarative spec into rendered rows. Vertical
    /// orientation yields an optional header row plus one row per record;
    /// horizontal transposes, one row per column with the label leading.
    fn build_rows(&self, spec: &TableSpec, style: &Style, twidth: f64) -> Vec<RowSpec> {
        let empty = Style::default();
        let thead = spec.thead.as_ref().map(|s| &s.style).unwrap_or(&empty);
        let tbody = spec.tbody.as_ref().map(|s| &s.style).unwrap_or(&empty);

        match spec.orientation {
            Orientation::Vertical => {
                let widths = column_widths(spec, twidth);
                let mut rows = Vec::new();
                if spec.show_header {
                    rows.push(RowSpec {
                        header: true,
                        cells: spec
                            .columns
                            .iter()
                            .zip(&widths)
                            .map(|(col, &w)| CellSpec {
                                text: col.label().to_string(),
                                width: w,
                                style: crate::style::cascade(&[style, &col.style, thead])
                                    .resolve(Display::Inline),
                            })
                            .collect(),
                    });
                }
                for record in &spec.data {
                    rows.push(RowSpec {
                        header: false,
                        cells: spec
                            .columns
                            .iter()
                            .zip(&widths)
                            .map(|(col, &w)| {
                                let cell_override =
                                    record.cell_styles.get(&col.key).unwrap_or(&empty);
                                CellSpec {
                                    text: record.cell(&col.key).to_string(),
                                    width: w,
                                    style: crate::style::cascade(&[
                                        style,
                                        &col.style,
                                        tbody,
                                        &record.style,
                                        cell_override,
                                    ])
                                    .resolve(Display::Inline),
                                }
                            })
                            .collect(),
                    });
                }
                rows
            }
            Orientation::Horizontal => {
                let records = spec.data.len().max(1) as f64;
                spec.columns
                    .iter()
                    .map(|col| {
                        let label_w = col
                            .width
                            .map(|d| d.resolve(twidth))
                            .unwrap_or(twidth / (spec.data.len() + 1) as f64);
                        let data_w = (twidth - label_w).max(0.0) / records;
                        let mut cells = vec![CellSpec {
                            text: col.label().to_string(),
                            width: label_w,
                            style: crate::style::cascade(&[style, &col.style, thead])
                                .resolve(Display::Inline),
                        }];
                        for record in &spec.data {
                            let cell_override =
                                record.cell_styles.get(&col.key).unwrap_or(&empty);
                            cells.push(CellSpec {
                                text: record.cell(&col.key).to_string(),
                                width: data_w,
                                style: crate::style::cascade(&[
                                    style,
                                    &col.style,
                                    tbody,
                                    &record.style,
                                    cell_override,
                                ])
                                .resolve(Display::Inline),
                            });
                        }
                        RowSpec {
                            header: false,
                            cells,
                        }
                    })
                    .collect()
            }
        }
    }

    /// Pass 1: wrap every cell at the candidate position and take the
    /// row's height from its tallest cell. Clipped cells keep only their
    /// first line.
    fn measure_row(&self, row: &RowSpec, x0: f64, y: f64) -> (Vec<Vec<LineRecord>>, f64) {
        let mut all_lines = Vec::with_capacity(row.cells.len());
        let mut row_h: f64 = 0.0;
        for (i, cell) in row.cells.iter().enumerate() {
            let rect = Rect::new(row.x_of(x0, i), y, cell.width, 0.0);
            let mut lines = self.queue_cell_lines(&cell.text, rect, &cell.style);
            if cell.style.clip {
                lines.truncate(1);
            }
            let h = lines.last().map(|r| r.rect.bottom() - y).unwrap_or(0.0);
            row_h = row_h.max(h);
            all_lines.push(lines);
        }
        (all_lines, row_h)
    }

    /// Pass 2: shift each cell's lines for its vertical alignment, draw
    /// them, and stroke the cell boxes at the row's shared height.
    fn draw_row(
        &mut self,
        row: &RowSpec,
        mut all_lines: Vec<Vec<LineRecord>>,
        x0: f64,
        y: f64,
        row_h: f64,
    ) {
        for (i, (cell, lines)) in row.cells.iter().zip(all_lines.iter_mut()).enumerate() {
            let cell_h = lines.last().map(|r| r.rect.bottom() - y).unwrap_or(0.0);
            let dy = match cell.style.valign {
                VAlign::Top => 0.0,
                VAlign::Center => (row_h - cell_h).max(0.0) / 2.0,
                VAlign::Bottom => (row_h - cell_h).max(0.0),
            };
            for rec in lines.iter_mut() {
                rec.rect.y += dy;
            }

            let cell_rect = Rect::new(row.x_of(x0, i), y, cell.width, row_h);
            if let Some(bg) = &cell.style.background_color {
                self.surface.fill_rect(cell_rect, bg);
            }
            self.render_lines(lines, &cell.style, false);
            self.surface
                .stroke_rect(cell_rect, &cell.style.border_color, GRID_STROKE_WIDTH);
        }
    }

    fn draw_table_title(&mut self, text: &str, x0: f64, y: f64, width: f64, rs: &Resolved) -> f64 {
        let mut lines = self.queue_cell_lines(text, Rect::new(x0, y, width, 0.0), rs);
        self.render_lines(&mut lines, rs, false);
        lines.last().map(|r| r.rect.bottom()).unwrap_or(y)
    }
}

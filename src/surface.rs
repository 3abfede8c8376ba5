//! # Drawing Surface
//!
//! The layout engine computes positions; it never touches an output format
//! directly. Everything it draws goes through the [`Surface`] trait, a small
//! imperative command set (pages, text runs, rects, images, paths, transform
//! state).
//!
//! [`RecordingSurface`] is the built-in backend: it captures the command
//! stream as serializable data, which is what the CLI emits and what the
//! integration tests assert against.

use crate::geom::Rect;
use crate::style::Align;
use serde::Serialize;

/// Per-run text parameters. `width` is the horizontal extent alignment is
/// computed against; justified runs stretch inter-word gaps by
/// `word_spacing` points.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions<'a> {
    pub width: f64,
    pub align: Align,
    pub word_spacing: f64,
    pub font: &'a str,
    pub size: f64,
    pub color: &'a str,
}

/// The capability the layout engine draws through.
pub trait Surface {
    /// Start a new page of the given size. All subsequent commands land on
    /// this page until the next call.
    fn begin_page(&mut self, width: f64, height: f64);

    /// Draw one line of text with its top-left corner at (x, y).
    fn draw_text(&mut self, text: &str, x: f64, y: f64, opts: &TextOptions);

    fn fill_rect(&mut self, rect: Rect, color: &str);

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);

    /// Draw a decoded raster image scaled into the given box.
    fn draw_image(&mut self, bytes: &[u8], x: f64, y: f64, width: f64, height: f64);

    /// Draw a vector path from SVG path data.
    fn draw_path(
        &mut self,
        data: &str,
        fill: Option<&str>,
        stroke: Option<&str>,
        stroke_width: f64,
        opacity: f64,
    );

    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    /// Finalize the output and return its bytes.
    fn finish(&mut self) -> Vec<u8>;
}

/// One recorded drawing command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Text {
        text: String,
        x: f64,
        y: f64,
        width: f64,
        align: Align,
        word_spacing: f64,
        font: String,
        size: f64,
        color: String,
    },
    FillRect {
        rect: Rect,
        color: String,
    },
    StrokeRect {
        rect: Rect,
        color: String,
        line_width: f64,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        byte_len: usize,
    },
    Path {
        data: String,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f64,
        opacity: f64,
    },
    Save,
    Restore,
    Translate {
        dx: f64,
        dy: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<Command>,
}

/// Surface backend that records the command stream.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pages: Vec<RecordedPage>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn push(&mut self, cmd: Command) {
        debug_assert!(!self.pages.is_empty(), "draw command before begin_page");
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(cmd);
        }
    }

    /// All text runs on a page, in draw order. Test helper.
    pub fn texts_on(&self, page: usize) -> Vec<&Command> {
        self.pages
            .get(page)
            .map(|p| {
                p.commands
                    .iter()
                    .filter(|c| matches!(c, Command::Text { .. }))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Surface for RecordingSurface {
    fn begin_page(&mut self, width: f64, height: f64) {
        self.pages.push(RecordedPage {
            width,
            height,
            commands: Vec::new(),
        });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, opts: &TextOptions) {
        self.push(Command::Text {
            text: text.to_string(),
            x,
            y,
            width: opts.width,
            align: opts.align,
            word_spacing: opts.word_spacing,
            font: opts.font.to_string(),
            size: opts.size,
            color: opts.color.to_string(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.push(Command::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.push(Command::StrokeRect {
            rect,
            color: color.to_string(),
            line_width,
        });
    }

    fn draw_image(&mut self, bytes: &[u8], x: f64, y: f64, width: f64, height: f64) {
        self.push(Command::Image {
            x,
            y,
            width,
            height,
            byte_len: bytes.len(),
        });
    }

    fn draw_path(
        &mut self,
        data: &str,
        fill: Option<&str>,
        stroke: Option<&str>,
        stroke_width: f64,
        opacity: f64,
    ) {
        self.push(Command::Path {
            data: data.to_string(),
            fill: fill.map(str::to_string),
            stroke: stroke.map(str::to_string),
            stroke_width,
            opacity,
        });
    }

    fn save_state(&mut self) {
        self.push(Command::Save);
    }

    fn restore_state(&mut self) {
        self.push(Command::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.push(Command::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(Command::Scale { sx, sy });
    }

    fn finish(&mut self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.pages).unwrap_or_default()
    }
}

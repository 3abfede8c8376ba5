//! # Vector Markup Normalizer
//!
//! Reduces a practical subset of SVG (rect, circle, ellipse, line, polyline,
//! polygon, path, g) to an intrinsic size plus a flat list of styled path
//! primitives. The layout engine places and scales the normalized form; the
//! drawing surface consumes the path data directly.
//!
//! Unknown elements are skipped. Group (`g`) styling inherits through a
//! stack; there are no nested primitives in the output.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A normalized vector asset.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Intrinsic size in user units, from width/height or the viewBox.
    pub width: f64,
    pub height: f64,
    /// viewBox origin; the renderer translates by its negation.
    pub min_x: f64,
    pub min_y: f64,
    pub primitives: Vec<Primitive>,
}

/// One drawable unit: path data plus its resolved paint.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub data: String,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
struct Paint {
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: f64,
    opacity: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Paint {
            fill: Some("#000".to_string()),
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl Paint {
    fn apply(&self, e: &BytesStart) -> Paint {
        let fill = match get_attr(e, "fill") {
            Some(v) if v == "none" => None,
            Some(v) => Some(v),
            None => self.fill.clone(),
        };
        let stroke = match get_attr(e, "stroke") {
            Some(v) if v == "none" => None,
            Some(v) => Some(v),
            None => self.stroke.clone(),
        };
        Paint {
            fill,
            stroke,
            stroke_width: get_attr_f64(e, "stroke-width").unwrap_or(self.stroke_width),
            opacity: self.opacity * get_attr_f64(e, "opacity").unwrap_or(1.0),
        }
    }
}

/// Parse a viewBox string like "0 0 100 100".
fn parse_view_box(s: &str) -> Option<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    match parts[..] {
        [min_x, min_y, w, h] => Some((min_x, min_y, w, h)),
        _ => None,
    }
}

/// Normalize markup. Returns `None` when the input has no `<svg>` root or
/// no usable size.
pub fn normalize(markup: &str) -> Option<Normalized> {
    let mut reader = Reader::from_str(markup);
    let mut out: Option<Normalized> = None;
    let mut paint_stack = vec![Paint::default()];
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        let (e, is_container) = match &event {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"g" && paint_stack.len() > 1 {
                    paint_stack.pop();
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("vector markup parse error: {e}");
                break;
            }
            _ => {
                buf.clear();
                continue;
            }
        };

        let tag = e.name().as_ref().to_vec();
        let paint = paint_stack
            .last()
            .cloned()
            .unwrap_or_default()
            .apply(e);

        match tag.as_slice() {
            b"svg" => {
                let vb = get_attr(e, "viewBox").and_then(|s| parse_view_box(&s));
                let width = get_attr_f64(e, "width").or(vb.map(|v| v.2));
                let height = get_attr_f64(e, "height").or(vb.map(|v| v.3));
                let (width, height) = match (width, height) {
                    (Some(w), Some(h)) if w > 0.0 && h > 0.0 => (w, h),
                    _ => {
                        log::warn!("vector markup has no usable size");
                        return None;
                    }
                };
                let (min_x, min_y) = vb.map(|v| (v.0, v.1)).unwrap_or((0.0, 0.0));
                out = Some(Normalized {
                    width,
                    height,
                    min_x,
                    min_y,
                    primitives: Vec::new(),
                });
            }
            b"g" if is_container => {
                paint_stack.push(paint);
            }
            _ => {
                if let Some(norm) = out.as_mut() {
                    if let Some(data) = shape_path_data(&tag, e) {
                        if paint.fill.is_some() || paint.stroke.is_some() {
                            norm.primitives.push(Primitive {
                                data,
                                fill: paint.fill,
                                stroke: paint.stroke,
                                stroke_width: paint.stroke_width,
                                opacity: paint.opacity,
                            });
                        }
                    }
                }
            }
        }
        buf.clear();
    }

    out
}

/// Convert one shape element into path data. Returns `None` for elements
/// this normalizer does not handle.
fn shape_path_data(tag: &[u8], e: &BytesStart) -> Option<String> {
    match tag {
        b"path" => {
            let d = get_attr(e, "d")?;
            (!d.trim().is_empty()).then_some(d)
        }
        b"rect" => {
            let x = get_attr_f64(e, "x").unwrap_or(0.0);
            let y = get_attr_f64(e, "y").unwrap_or(0.0);
            let w = get_attr_f64(e, "width").unwrap_or(0.0);
            let h = get_attr_f64(e, "height").unwrap_or(0.0);
            if w <= 0.0 || h <= 0.0 {
                return None;
            }
            Some(format!(
                "M {x} {y} L {} {y} L {} {} L {x} {} Z",
                x + w,
                x + w,
                y + h,
                y + h
            ))
        }
        b"circle" => {
            let cx = get_attr_f64(e, "cx").unwrap_or(0.0);
            let cy = get_attr_f64(e, "cy").unwrap_or(0.0);
            let r = get_attr_f64(e, "r").unwrap_or(0.0);
            (r > 0.0).then(|| ellipse_path(cx, cy, r, r))
        }
        b"ellipse" => {
            let cx = get_attr_f64(e, "cx").unwrap_or(0.0);
            let cy = get_attr_f64(e, "cy").unwrap_or(0.0);
            let rx = get_attr_f64(e, "rx").unwrap_or(0.0);
            let ry = get_attr_f64(e, "ry").unwrap_or(0.0);
            (rx > 0.0 && ry > 0.0).then(|| ellipse_path(cx, cy, rx, ry))
        }
        b"line" => {
            let x1 = get_attr_f64(e, "x1").unwrap_or(0.0);
            let y1 = get_attr_f64(e, "y1").unwrap_or(0.0);
            let x2 = get_attr_f64(e, "x2").unwrap_or(0.0);
            let y2 = get_attr_f64(e, "y2").unwrap_or(0.0);
            Some(format!("M {x1} {y1} L {x2} {y2}"))
        }
        b"polyline" | b"polygon" => {
            let points = parse_points(&get_attr(e, "points").unwrap_or_default());
            let (first, rest) = points.split_first()?;
            let mut d = format!("M {} {}", first.0, first.1);
            for (px, py) in rest {
                d.push_str(&format!(" L {px} {py}"));
            }
            if tag == b"polygon" {
                d.push_str(" Z");
            }
            Some(d)
        }
        _ => None,
    }
}

/// Cubic bezier approximation of an axis-aligned ellipse.
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> String {
    let k: f64 = 0.5522847498;
    let kx = rx * k;
    let ky = ry * k;
    format!(
        "M {} {cy} \
         C {} {} {} {} {cx} {} \
         C {} {} {} {} {} {cy} \
         C {} {} {} {} {cx} {} \
         C {} {} {} {} {} {cy} Z",
        cx + rx,
        cx + rx,
        cy + ky,
        cx + kx,
        cy + ry,
        cy + ry,
        cx - kx,
        cy + ry,
        cx - rx,
        cy + ky,
        cx - rx,
        cx - rx,
        cy - ky,
        cx - kx,
        cy - ry,
        cy - ry,
        cx + kx,
        cy - ry,
        cx + rx,
        cy - ky,
        cx + rx,
    )
}

/// Parse an SVG points attribute (e.g. "10,20 30,40").
fn parse_points(s: &str) -> Vec<(f64, f64)> {
    let nums: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    nums.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return String::from_utf8(attr.value.to_vec()).ok();
        }
    }
    None
}

fn get_attr_f64(e: &BytesStart, name: &str) -> Option<f64> {
    get_attr(e, name).and_then(|s| s.trim().parse().ok())
}

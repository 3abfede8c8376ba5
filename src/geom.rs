//! # Geometry Primitives
//!
//! `Rect` is the value type everything above it shares: regions, obstacles,
//! outlines, line rects. Rects are never mutated in place; adjustments make
//! copies. `Dim` is the tagged size used wherever the document may give a
//! dimension either in points or as a fraction of its parent.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// An axis-aligned box. Origin is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The overlapping region of two rects. Width and height are clamped at
    /// zero, so a miss on either axis produces a degenerate rect.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }

    /// The smallest rect covering both inputs.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// A size that is either absolute points or a fraction of the parent's
/// corresponding dimension. Fractions are clamped to 1.0.
///
/// In document JSON an absolute size is a plain number and a fraction is a
/// percentage string: `120` or `"45%"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dim {
    Abs(f64),
    Fraction(f64),
}

impl Dim {
    pub fn resolve(&self, parent: f64) -> f64 {
        match self {
            Dim::Abs(v) => *v,
            Dim::Fraction(f) => f.min(1.0).max(0.0) * parent,
        }
    }
}

impl Serialize for Dim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dim::Abs(v) => serializer.serialize_f64(*v),
            Dim::Fraction(f) => serializer.serialize_str(&format!("{}%", f * 100.0)),
        }
    }
}

struct DimVisitor;

impl<'de> Visitor<'de> for DimVisitor {
    type Value = Dim;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number of points or a percentage string like \"45%\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Dim, E> {
        Ok(Dim::Abs(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Dim, E> {
        Ok(Dim::Abs(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dim, E> {
        Ok(Dim::Abs(v as f64))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Dim, E> {
        let trimmed = s.trim();
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f64 = pct
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid percentage: {s:?}")))?;
            Ok(Dim::Fraction(value / 100.0))
        } else {
            trimmed
                .parse()
                .map(Dim::Abs)
                .map_err(|_| E::custom(format!("invalid dimension: {s:?}")))
        }
    }
}

impl<'de> Deserialize<'de> for Dim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Dim, D::Error> {
        deserializer.deserialize_any(DimVisitor)
    }
}

//! # Free-Space Tracking
//!
//! A 2-D occupancy model over one container rect. Placed content registers
//! an obstacle; queries answer where content can still go. Obstacles are
//! kept as a flat list — documents place tens of nodes per page, so the
//! simple scan beats maintaining any spatial structure.

use crate::geom::Rect;

/// A position found for new content: the top-left corner plus the free
/// span it was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreePosition {
    pub x: f64,
    pub y: f64,
    pub span: Rect,
}

#[derive(Debug, Clone)]
pub struct FreeSpaceTracker {
    container: Rect,
    obstacles: Vec<Rect>,
}

impl FreeSpaceTracker {
    pub fn new(container: Rect) -> Self {
        Self {
            container,
            obstacles: Vec::new(),
        }
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Register placed content. Degenerate rects claim no space and are
    /// dropped.
    pub fn add_obstacle(&mut self, rect: Rect) {
        if rect.width > 0.0 && rect.height > 0.0 {
            self.obstacles.push(rect);
        }
    }

    /// The free horizontal spans across the band `[y, y + height)`,
    /// spanning the container's width. `extra` rects act as additional
    /// obstacles for the duration of the query.
    ///
    /// Each obstacle overlapping the band splits every span it touches
    /// into the remainders to its left and right; zero-width remainders
    /// are dropped. After any split the scan restarts from the front of
    /// the span list, so every obstacle is applied against every span it
    /// could affect.
    pub fn free_spans_for_band(&self, y: f64, height: f64, extra: &[Rect]) -> Vec<Rect> {
        let band = Rect::new(self.container.x, y, self.container.width, height);
        let mut spans = vec![band];

        for obs in self.obstacles.iter().chain(extra) {
            let sect = obs.intersection(&band);
            if sect.height <= 0.0 || sect.width <= 0.0 {
                continue;
            }
            let mut j = 0;
            while j < spans.len() {
                let cur = spans[j];
                let lo = cur.x.max(obs.x);
                let hi = cur.right().min(obs.right());
                if hi - lo <= 0.0 {
                    j += 1;
                    continue;
                }
                spans.remove(j);
                let mut split = false;
                if lo - cur.x > 0.0 {
                    spans.push(Rect::new(cur.x, band.y, lo - cur.x, band.height));
                    split = true;
                }
                if cur.right() - hi > 0.0 {
                    spans.push(Rect::new(hi, band.y, cur.right() - hi, band.height));
                    split = true;
                }
                if split {
                    j = 0;
                }
            }
        }

        spans
    }

    /// The leftmost free span in the band that is at least `width` wide.
    pub fn leftmost_fitting_span(
        &self,
        y: f64,
        height: f64,
        width: f64,
        extra: &[Rect],
    ) -> Option<Rect> {
        self.free_spans_for_band(y, height, extra)
            .into_iter()
            .filter(|s| s.width >= width)
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }

    /// The y coordinate just below every obstacle whose horizontal span
    /// reaches `x_rel` (measured from the container's left edge) or beyond.
    /// With no such obstacle this is the container top.
    pub fn lowest_edge_below(&self, x_rel: f64) -> f64 {
        self.obstacles
            .iter()
            .filter(|obs| obs.x - self.container.x + obs.width > x_rel)
            .map(|obs| obs.bottom())
            .fold(self.container.y, f64::max)
    }

    /// The topmost, then leftmost position where a `width` x `height` box
    /// fits, at or below `min_y`. Candidate rows are the container top
    /// followed by obstacle bottom edges in ascending order; the first row
    /// whose band holds a wide-enough span wins. When no row fits the box
    /// lands below every obstacle, where the full container width is free.
    pub fn next_free_position(&self, width: f64, height: f64, min_y: f64) -> FreePosition {
        let start = self.container.y.max(min_y);

        let mut edges: Vec<f64> = self
            .obstacles
            .iter()
            .map(|obs| obs.bottom())
            .filter(|&b| b > start)
            .collect();
        edges.sort_by(f64::total_cmp);
        edges.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        for y in std::iter::once(start).chain(edges.iter().copied()) {
            if let Some(span) = self.leftmost_fitting_span(y, height, width, &[]) {
                return FreePosition { x: span.x, y, span };
            }
        }

        // Nothing fits beside the obstacles; go below all of them.
        let y = self.lowest_edge_below(0.0).max(start);
        FreePosition {
            x: self.container.x,
            y,
            span: Rect::new(self.container.x, y, self.container.width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_300x400() -> FreeSpaceTracker {
        FreeSpaceTracker::new(Rect::new(0.0, 0.0, 300.0, 400.0))
    }

    #[test]
    fn test_empty_tracker_full_band() {
        let t = tracker_300x400();
        let spans = t.free_spans_for_band(0.0, 10.0, &[]);
        assert_eq!(spans, vec![Rect::new(0.0, 0.0, 300.0, 10.0)]);
    }

    #[test]
    fn test_middle_obstacle_splits_band() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(100.0, 0.0, 50.0, 100.0));
        let mut spans = t.free_spans_for_band(0.0, 10.0, &[]);
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].x, spans[0].width), (0.0, 100.0));
        assert_eq!((spans[1].x, spans[1].width), (150.0, 150.0));
    }

    #[test]
    fn test_obstacle_below_band_ignored() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 50.0, 300.0, 10.0));
        let spans = t.free_spans_for_band(0.0, 50.0, &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].width, 300.0);
    }

    #[test]
    fn test_band_fully_covered() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 300.0, 20.0));
        assert!(t.free_spans_for_band(5.0, 10.0, &[]).is_empty());
    }

    #[test]
    fn test_overlapping_obstacles_partition() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 120.0, 30.0));
        t.add_obstacle(Rect::new(100.0, 0.0, 80.0, 30.0));
        let spans = t.free_spans_for_band(0.0, 10.0, &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].x, spans[0].width), (180.0, 120.0));
    }

    #[test]
    fn test_extra_rects_act_as_obstacles() {
        let t = tracker_300x400();
        let extra = [Rect::new(0.0, 0.0, 200.0, 10.0)];
        let spans = t.free_spans_for_band(0.0, 10.0, &extra);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].x, spans[0].width), (200.0, 100.0));
    }

    #[test]
    fn test_next_position_beside_obstacle() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 100.0, 50.0));
        let pos = t.next_free_position(100.0, 50.0, 0.0);
        assert_eq!((pos.x, pos.y), (100.0, 0.0));
        assert_eq!(pos.span.width, 200.0);
    }

    #[test]
    fn test_next_position_drops_below_when_row_is_full() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 100.0, 50.0));
        t.add_obstacle(Rect::new(100.0, 0.0, 200.0, 80.0));
        // The top row is fully occupied; the first open row is below the
        // shorter obstacle, where 100 points are free before the taller one.
        let pos = t.next_free_position(100.0, 20.0, 0.0);
        assert_eq!((pos.x, pos.y), (0.0, 50.0));
        assert_eq!(pos.span.width, 100.0);
    }

    #[test]
    fn test_next_position_wider_than_free_row() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 100.0, 50.0));
        t.add_obstacle(Rect::new(100.0, 0.0, 200.0, 80.0));
        let pos = t.next_free_position(250.0, 20.0, 0.0);
        // Below everything.
        assert_eq!((pos.x, pos.y), (0.0, 80.0));
    }

    #[test]
    fn test_next_position_honors_min_y() {
        let t = tracker_300x400();
        let pos = t.next_free_position(100.0, 20.0, 120.0);
        assert_eq!((pos.x, pos.y), (0.0, 120.0));
    }

    #[test]
    fn test_lowest_edge_below() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 100.0, 50.0));
        t.add_obstacle(Rect::new(100.0, 0.0, 100.0, 80.0));
        assert_eq!(t.lowest_edge_below(0.0), 80.0);
        // Past both obstacles' spans nothing blocks.
        assert_eq!(t.lowest_edge_below(250.0), 0.0);
        // At 150 only the second obstacle reaches.
        assert_eq!(t.lowest_edge_below(150.0), 80.0);
    }

    #[test]
    fn test_degenerate_obstacle_ignored() {
        let mut t = tracker_300x400();
        t.add_obstacle(Rect::new(0.0, 0.0, 0.0, 50.0));
        assert!(t.is_empty());
    }
}

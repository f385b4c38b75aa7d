use serde::{Deserialize, Serialize};

use crate::error::{DissectError, Result};

/// Axis-aligned rectangle in page pixels. `x,y` is top-left; `width,height` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
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
    /// Exclusive right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
    /// Exclusive bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Strict overlap test: touching edges or corners do not intersect, and a
    /// zero-area rectangle intersects nothing.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true if `r` is fully inside `self` (edges may coincide).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Point test with inclusive edges on all four sides.
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        self.x <= px && px <= self.right() && self.y <= py && py <= self.bottom()
    }

    /// Overlapping part of `self` and `other`, or `None` when they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Rejects non-finite values and negative sizes. `role` names the rectangle in the error.
    pub fn validate(&self, role: &str) -> Result<()> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(DissectError::InvalidRect {
                    role: role.to_string(),
                    reason: format!("{} is not finite ({})", name, v),
                });
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(DissectError::InvalidRect {
                role: role.to_string(),
                reason: format!("negative size {}x{}", self.width, self.height),
            });
        }
        Ok(())
    }
}

/// Rectangle on the discrete dissection grid. One unit equals `granularity` pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl GridRect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x + self.w
    }
    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }
    pub fn area(&self) -> i64 {
        self.w.max(0) * self.h.max(0)
    }
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn intersects(&self, other: &GridRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, r: &GridRect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Part of `self` inside `bounds`; `None` if nothing with area remains.
    pub fn clip(&self, bounds: &GridRect) -> Option<GridRect> {
        let x1 = self.x.max(bounds.x);
        let y1 = self.y.max(bounds.y);
        let x2 = self.right().min(bounds.right());
        let y2 = self.bottom().min(bounds.bottom());
        if x2 > x1 && y2 > y1 {
            Some(GridRect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Maps grid units back to pixels.
    pub fn to_rect(&self, granularity: f64) -> Rect {
        Rect::new(
            self.x as f64 * granularity,
            self.y as f64 * granularity,
            self.w as f64 * granularity,
            self.h as f64 * granularity,
        )
    }
}

/// Summary of a dissection result relative to its inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DissectStats {
    /// Number of rectangles in the dissection.
    pub num_rects: usize,
    /// Number of holes with area inside the source.
    pub num_holes: usize,
    /// Area of the source rectangle.
    pub source_area: f64,
    /// Sum of dissection rectangle areas.
    pub covered_area: f64,
    /// Sum of hole areas clipped to the source. Overlapping holes are counted twice.
    pub hole_area: f64,
    /// covered_area / source_area (0.0 to 1.0).
    pub coverage: f64,
}

impl DissectStats {
    pub fn compute(source: &Rect, holes: &[Rect], rects: &[Rect]) -> Self {
        let source_area = source.area().max(0.0);
        let covered_area: f64 = rects.iter().map(Rect::area).sum();
        let clipped: Vec<Rect> = holes.iter().filter_map(|h| h.intersection(source)).collect();
        let hole_area: f64 = clipped.iter().map(Rect::area).sum();
        let coverage = if source_area > 0.0 {
            covered_area / source_area
        } else {
            0.0
        };
        Self {
            num_rects: rects.len(),
            num_holes: clipped.len(),
            source_area,
            covered_area,
            hole_area,
            coverage,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Rects: {}, Holes: {}, Coverage: {:.2}%, Source Area: {} px², Covered Area: {} px², Hole Area: {} px²",
            self.num_rects,
            self.num_holes,
            self.coverage * 100.0,
            self.source_area,
            self.covered_area,
            self.hole_area,
        )
    }

    /// Source area covered by neither the dissection nor the holes.
    /// Zero for a valid dissection of non-overlapping integral holes.
    pub fn uncovered_area(&self) -> f64 {
        (self.source_area - self.covered_area - self.hole_area).max(0.0)
    }
}

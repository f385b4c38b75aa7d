use tracing::trace;

use super::{ObstacleList, ObstacleSet};
use crate::model::GridRect;

/// Reference sweep: a cursor walks the source row-major; every free cell it lands on
/// anchors a new rect grown to its maximal width, then its maximal height.
pub struct GridMarker<S: ObstacleSet = ObstacleList> {
    source: GridRect,
    obstacles: S,
    placed: Vec<GridRect>,
}

impl GridMarker<ObstacleList> {
    pub fn with_holes(source: GridRect, holes: &[GridRect]) -> Self {
        Self::new(source, ObstacleList::from_rects(holes))
    }
}

impl<S: ObstacleSet> GridMarker<S> {
    /// `obstacles` is seeded with the holes; placed rects are added to it as the sweep runs.
    pub fn new(source: GridRect, obstacles: S) -> Self {
        Self {
            source,
            obstacles,
            placed: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<GridRect> {
        if self.source.is_empty() {
            return self.placed;
        }
        let right = self.source.right();
        let bottom = self.source.bottom();
        let (mut cx, mut cy) = (self.source.x, self.source.y);
        let mut placed_in_row = false;

        while cy < bottom {
            let probe = GridRect::new(cx, cy, 1, 1);
            // Any hit spans the probe, so its right edge is strictly past cx.
            cx = match self.obstacles.first_hit(&probe) {
                Some(hit) => hit.right(),
                None => {
                    let placed = self.grow(cx, cy);
                    trace!(x = placed.x, y = placed.y, w = placed.w, h = placed.h, "placed");
                    self.obstacles.insert(placed);
                    self.placed.push(placed);
                    placed_in_row = true;
                    placed.right()
                }
            };
            if cx >= right {
                cx = self.source.x;
                // A fully blocked row stays blocked until some obstacle starts or ends.
                cy = if placed_in_row { cy + 1 } else { self.next_row_change(cy) };
                placed_in_row = false;
            }
        }
        self.placed
    }

    /// First row below `cy` whose set of crossing obstacles differs from row `cy`'s.
    fn next_row_change(&self, cy: i64) -> i64 {
        let (x, w) = (self.source.x, self.source.w);
        let bottom = self.source.bottom();
        let mut next = bottom;
        self.obstacles
            .for_each_hit(&GridRect::new(x, cy, w, 1), |o| next = next.min(o.bottom()));
        let below = GridRect::new(x, cy + 1, w, bottom - cy - 1);
        self.obstacles.for_each_hit(&below, |o| {
            if o.y > cy {
                next = next.min(o.y);
            }
        });
        next
    }

    /// Grows a rect anchored at the free cell `(cx, cy)`: widest free run on row `cy`,
    /// then as many full-width rows as stay free.
    fn grow(&self, cx: i64, cy: i64) -> GridRect {
        let row = GridRect::new(cx, cy, self.source.right() - cx, 1);
        let mut end_x = self.source.right();
        self.obstacles.for_each_hit(&row, |o| end_x = end_x.min(o.x));
        let w = end_x - cx;

        let below = GridRect::new(cx, cy + 1, w, self.source.bottom() - cy - 1);
        let mut end_y = self.source.bottom();
        self.obstacles.for_each_hit(&below, |o| end_y = end_y.min(o.y));
        GridRect::new(cx, cy, w, end_y - cy)
    }
}

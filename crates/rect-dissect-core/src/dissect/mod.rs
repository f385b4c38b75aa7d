use crate::model::GridRect;

pub mod bands;
pub mod grid_marker;

/// Obstacles the grid-marker sweep tests its probes against.
///
/// Implementations must drop zero-area rectangles on insert and answer queries
/// with the strict intersection predicate of [`GridRect::intersects`].
pub trait ObstacleSet {
    fn insert(&mut self, rect: GridRect);
    /// First obstacle, in insertion order, that intersects `probe`.
    fn first_hit(&self, probe: &GridRect) -> Option<GridRect>;
    /// Calls `f` for every obstacle intersecting `probe`.
    fn for_each_hit<F: FnMut(&GridRect)>(&self, probe: &GridRect, f: F);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plain list of obstacles queried by linear scan.
#[derive(Debug, Clone, Default)]
pub struct ObstacleList {
    rects: Vec<GridRect>,
}

impl ObstacleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rects<'a, I: IntoIterator<Item = &'a GridRect>>(rects: I) -> Self {
        let mut list = Self::new();
        for r in rects {
            list.insert(*r);
        }
        list
    }
}

impl ObstacleSet for ObstacleList {
    fn insert(&mut self, rect: GridRect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    fn first_hit(&self, probe: &GridRect) -> Option<GridRect> {
        self.rects.iter().find(|r| r.intersects(probe)).copied()
    }

    fn for_each_hit<F: FnMut(&GridRect)>(&self, probe: &GridRect, mut f: F) {
        for r in self.rects.iter().filter(|r| r.intersects(probe)) {
            f(r);
        }
    }

    fn len(&self) -> usize {
        self.rects.len()
    }
}

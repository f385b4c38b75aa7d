//! Checks that a rect list is a valid dissection.
//!
//! Coverage is evaluated on grid cells: with granularity `g`, cell `(x, y)` is the square
//! `[x*g, (x+1)*g) x [y*g, (y+1)*g)` for every grid point inside the source snapped
//! inward. Holes are snapped outward exactly as `dissect_with` snaps them, so a cell is a
//! hole cell when any hole touches it. A cell belongs to a rect when the rect covers it.

use thiserror::Error;

use crate::config::DissectConfig;
use crate::model::{GridRect, Rect};
use crate::pipeline::prepare;

/// Relative tolerance for a pixel coordinate to count as lying on a grid line.
const GRID_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("({x}, {y}) is covered by neither a hole nor the dissection")]
    Uncovered { x: i64, y: i64 },
    #[error("({x}, {y}) is covered by both a hole and the dissection")]
    CoversHole { x: i64, y: i64 },
    #[error("dissected rectangles overlap: {a:?} and {b:?}")]
    Overlap { a: Rect, b: Rect },
    #[error("{rect:?} extends outside the source")]
    OutOfBounds { rect: Rect },
    #[error("{rect:?} does not lie on the grid")]
    OffGrid { rect: Rect },
    #[error("input cannot be placed on the grid: {0}")]
    Grid(String),
}

/// True if any rect in `rects` covers the unit cell at `(x, y)`.
pub fn contains_point(rects: &[Rect], x: f64, y: f64) -> bool {
    let probe = Rect::new(x, y, 1.0, 1.0);
    rects.iter().any(|r| r.intersects(&probe))
}

/// Checks `dissection` on the unit grid. See [`check_dissection_with`].
pub fn check_dissection(
    source: &Rect,
    holes: &[Rect],
    dissection: &[Rect],
) -> Result<(), Violation> {
    check_dissection_with(source, holes, dissection, &DissectConfig::default())
}

/// Returns the first violation found: grid alignment, containment, pairwise overlap, then
/// per-cell coverage in row-major order. Every check runs in grid units of
/// `cfg.granularity`, which is also the unit of the cell coordinates in
/// `Uncovered`/`CoversHole`.
pub fn check_dissection_with(
    source: &Rect,
    holes: &[Rect],
    dissection: &[Rect],
    cfg: &DissectConfig,
) -> Result<(), Violation> {
    let prepared = prepare(source, holes, cfg).map_err(|e| Violation::Grid(e.to_string()))?;
    let area = prepared.source;

    let mut placed: Vec<(GridRect, Rect)> = Vec::with_capacity(dissection.len());
    for r in dissection.iter().filter(|r| !r.is_empty()) {
        let cell = grid_rect(r, cfg.granularity).ok_or(Violation::OffGrid { rect: *r })?;
        if !area.contains(&cell) {
            return Err(Violation::OutOfBounds { rect: *r });
        }
        placed.push((cell, *r));
    }

    for (i, (a, ra)) in placed.iter().enumerate() {
        for (b, rb) in &placed[i + 1..] {
            if a.intersects(b) {
                return Err(Violation::Overlap { a: *ra, b: *rb });
            }
        }
    }

    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let cell = GridRect::new(x, y, 1, 1);
            let in_hole = prepared.holes.iter().any(|h| h.intersects(&cell));
            let in_dissection = placed.iter().any(|(r, _)| r.intersects(&cell));
            match (in_hole, in_dissection) {
                (false, false) => return Err(Violation::Uncovered { x, y }),
                (true, true) => return Err(Violation::CoversHole { x, y }),
                _ => {}
            }
        }
    }
    Ok(())
}

fn grid_rect(r: &Rect, g: f64) -> Option<GridRect> {
    let x0 = on_grid(r.x, g)?;
    let y0 = on_grid(r.y, g)?;
    let x1 = on_grid(r.right(), g)?;
    let y1 = on_grid(r.bottom(), g)?;
    Some(GridRect::new(x0, y0, x1 - x0, y1 - y0))
}

fn on_grid(v: f64, g: f64) -> Option<i64> {
    let scaled = v / g;
    let nearest = scaled.round();
    ((scaled - nearest).abs() <= GRID_TOLERANCE * nearest.abs().max(1.0)).then_some(nearest as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::pipeline::dissect_with;

    #[test]
    fn detects_gap() {
        let source = Rect::new(0.0, 0.0, 4.0, 4.0);
        let d = [Rect::new(0.0, 0.0, 4.0, 3.0)];
        assert_eq!(
            check_dissection(&source, &[], &d),
            Err(Violation::Uncovered { x: 0, y: 3 })
        );
    }

    #[test]
    fn detects_overlap() {
        let source = Rect::new(0.0, 0.0, 4.0, 4.0);
        let d = [Rect::new(0.0, 0.0, 4.0, 3.0), Rect::new(0.0, 2.0, 4.0, 2.0)];
        assert!(matches!(
            check_dissection(&source, &[], &d),
            Err(Violation::Overlap { .. })
        ));
    }

    #[test]
    fn detects_rect_over_hole() {
        let source = Rect::new(0.0, 0.0, 4.0, 4.0);
        let hole = [Rect::new(1.0, 1.0, 1.0, 1.0)];
        let d = [source];
        assert_eq!(
            check_dissection(&source, &hole, &d),
            Err(Violation::CoversHole { x: 1, y: 1 })
        );
    }

    #[test]
    fn sub_pixel_dissections_check_on_their_own_grid() {
        let source = Rect::new(0.0, 0.0, 10.0, 10.0);
        let holes = [Rect::new(1.75, 1.75, 1.0, 1.0)];
        for strategy in [Strategy::GridMarker, Strategy::Bands] {
            let cfg = DissectConfig::builder()
                .strategy(strategy)
                .granularity(0.5)
                .build();
            let d = dissect_with(source, &holes, &cfg).unwrap();
            assert_eq!(check_dissection_with(&source, &holes, &d, &cfg), Ok(()));
        }
    }

    #[test]
    fn sub_pixel_gap_is_reported_in_grid_units() {
        let source = Rect::new(0.0, 0.0, 2.0, 2.0);
        let cfg = DissectConfig::builder().granularity(0.5).build();
        let d = [Rect::new(0.0, 0.0, 2.0, 1.5)];
        assert_eq!(
            check_dissection_with(&source, &[], &d, &cfg),
            Err(Violation::Uncovered { x: 0, y: 3 })
        );
    }

    #[test]
    fn detects_rect_outside_source() {
        let source = Rect::new(0.0, 0.0, 4.0, 4.0);
        let d = [Rect::new(0.0, 0.0, 4.0, 4.0), Rect::new(4.0, 0.0, 1.0, 4.0)];
        assert_eq!(
            check_dissection(&source, &[], &d),
            Err(Violation::OutOfBounds { rect: d[1] })
        );
    }

    #[test]
    fn rects_off_the_grid_are_rejected() {
        let source = Rect::new(0.0, 0.0, 4.0, 4.0);
        let d = [Rect::new(0.0, 0.0, 4.0, 2.5), Rect::new(0.0, 2.5, 4.0, 1.5)];
        assert!(matches!(
            check_dissection(&source, &[], &d),
            Err(Violation::OffGrid { .. })
        ));
    }
}

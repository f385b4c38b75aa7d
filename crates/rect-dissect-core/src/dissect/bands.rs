use crate::model::GridRect;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Band sweep-line dissection.
///
/// The source is cut into horizontal bands at every (clipped) hole edge. Inside a band
/// each hole spans the full band height, so the free area is a list of x-spans. A rect
/// stays open while the next band has the exact same span; otherwise it is closed.
/// Output is ordered by `(y, x)`.
pub fn dissect(source: &GridRect, holes: &[GridRect], parallel: bool) -> Vec<GridRect> {
    if source.is_empty() {
        return Vec::new();
    }
    let clipped: Vec<GridRect> = holes.iter().filter_map(|h| h.clip(source)).collect();

    let mut edges: Vec<i64> = Vec::with_capacity(clipped.len() * 2 + 2);
    edges.push(source.y);
    edges.push(source.bottom());
    for h in &clipped {
        edges.push(h.y);
        edges.push(h.bottom());
    }
    edges.sort_unstable();
    edges.dedup();
    let bands: Vec<(i64, i64)> = edges.windows(2).map(|w| (w[0], w[1])).collect();

    let spans = band_spans(source, &clipped, &bands, parallel);

    let mut out: Vec<GridRect> = Vec::new();
    let mut open: Vec<GridRect> = Vec::new();
    for (&(y0, y1), row) in bands.iter().zip(spans) {
        let mut next_open = Vec::with_capacity(row.len());
        for (x0, x1) in row {
            let pos = open.iter().position(|r| r.x == x0 && r.right() == x1);
            match pos {
                Some(i) => {
                    let mut r = open.swap_remove(i);
                    r.h += y1 - y0;
                    next_open.push(r);
                }
                None => next_open.push(GridRect::new(x0, y0, x1 - x0, y1 - y0)),
            }
        }
        out.append(&mut open);
        open = next_open;
    }
    out.append(&mut open);
    out.sort_by_key(|r| (r.y, r.x));
    out
}

fn band_spans(
    source: &GridRect,
    holes: &[GridRect],
    bands: &[(i64, i64)],
    parallel: bool,
) -> Vec<Vec<(i64, i64)>> {
    // Parallel path (optional)
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return bands
                .par_iter()
                .map(|&(y0, y1)| free_spans(source, holes, y0, y1))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    bands
        .iter()
        .map(|&(y0, y1)| free_spans(source, holes, y0, y1))
        .collect()
}

/// Free x-spans `[x0, x1)` of the band `[y0, y1)`, left to right.
fn free_spans(source: &GridRect, holes: &[GridRect], y0: i64, y1: i64) -> Vec<(i64, i64)> {
    let band = GridRect::new(source.x, y0, source.w, y1 - y0);
    let mut blocked: Vec<(i64, i64)> = holes
        .iter()
        .filter(|h| h.intersects(&band))
        .map(|h| (h.x, h.right()))
        .collect();
    blocked.sort_unstable();

    let mut spans = Vec::new();
    let mut cursor = source.x;
    for (bx0, bx1) in blocked {
        if bx0 > cursor {
            spans.push((cursor, bx0));
        }
        cursor = cursor.max(bx1);
    }
    if cursor < source.right() {
        spans.push((cursor, source.right()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hole_four_rects() {
        let src = GridRect::new(0, 0, 30, 30);
        let out = dissect(&src, &[GridRect::new(10, 10, 10, 10)], false);
        assert_eq!(
            out,
            vec![
                GridRect::new(0, 0, 30, 10),
                GridRect::new(0, 10, 10, 10),
                GridRect::new(20, 10, 10, 10),
                GridRect::new(0, 20, 30, 10),
            ]
        );
    }

    #[test]
    fn identical_spans_merge_across_bands() {
        // Two stacked holes at the same x produce bands whose side spans merge.
        let src = GridRect::new(0, 0, 10, 10);
        let holes = [GridRect::new(4, 2, 2, 3), GridRect::new(4, 5, 2, 3)];
        let out = dissect(&src, &holes, false);
        assert_eq!(
            out,
            vec![
                GridRect::new(0, 0, 10, 2),
                GridRect::new(0, 2, 4, 6),
                GridRect::new(6, 2, 4, 6),
                GridRect::new(0, 8, 10, 2),
            ]
        );
    }

    #[test]
    fn overlapping_holes_are_merged_into_one_blocked_span() {
        let spans = free_spans(
            &GridRect::new(0, 0, 20, 4),
            &[GridRect::new(2, 0, 6, 4), GridRect::new(5, 0, 6, 4)],
            0,
            4,
        );
        assert_eq!(spans, vec![(0, 2), (11, 20)]);
    }
}

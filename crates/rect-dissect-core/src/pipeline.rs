use crate::config::{DissectConfig, Strategy};
use crate::dissect::{bands, grid_marker::GridMarker};
use crate::error::{DissectError, Result};
use crate::model::{GridRect, Rect};
use tracing::{debug, instrument};

/// Largest magnitude a grid coordinate may reach; every integer up to here is exact in f64.
const MAX_GRID_COORD: f64 = 9_007_199_254_740_992.0;

/// Tolerance for treating a scaled coordinate as integral, so that e.g. `3.0 / 0.1`
/// snaps to 30 rather than 29.
const SNAP_EPSILON: f64 = 1e-9;

/// Source and holes mapped onto the dissection grid.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub source: GridRect,
    pub holes: Vec<GridRect>,
}

/// Dissects `source` minus `holes` with the default configuration.
///
/// Returns disjoint rectangles that, together with the holes, cover every grid cell
/// of `source`. See [`dissect_with`].
pub fn dissect(source: Rect, holes: &[Rect]) -> Result<Vec<Rect>> {
    dissect_with(source, holes, &DissectConfig::default())
}

/// Dissects `source` minus `holes` using `cfg`.
///
/// Notes:
/// - All rectangles are validated first; a non-finite value or negative size fails with
///   `InvalidRect` before any geometry runs.
/// - Coordinates are snapped to multiples of `granularity`: the source inward, holes
///   outward. Zero-area holes are ignored. Holes never fail: their edges are clamped to
///   one grid step outside the source, however far away they lie.
/// - Only a source whose coordinates cannot be placed on the grid fails, with `GridOverflow`.
/// - The output order is deterministic for a given input and configuration.
#[instrument(skip_all, fields(strategy = ?cfg.strategy, holes = holes.len()))]
pub fn dissect_with(source: Rect, holes: &[Rect], cfg: &DissectConfig) -> Result<Vec<Rect>> {
    cfg.validate()?;
    validate_inputs(&source, holes)?;

    let prepared = prepare(&source, holes, cfg)?;
    let cells = dissect_grid(&prepared, cfg);
    debug!(
        rects = cells.len(),
        grid_holes = prepared.holes.len(),
        "dissection complete"
    );
    Ok(cells
        .iter()
        .map(|c| c.to_rect(cfg.granularity))
        .collect())
}

/// Runs the configured strategy directly on grid input.
pub fn dissect_grid(prepared: &PreparedInput, cfg: &DissectConfig) -> Vec<GridRect> {
    if prepared.source.is_empty() {
        return Vec::new();
    }
    match cfg.strategy {
        Strategy::GridMarker => GridMarker::with_holes(prepared.source, &prepared.holes).run(),
        Strategy::Bands => bands::dissect(&prepared.source, &prepared.holes, cfg.parallel),
    }
}

/// Checks every input rectangle, naming the offender in the error.
pub fn validate_inputs(source: &Rect, holes: &[Rect]) -> Result<()> {
    source.validate("source")?;
    for (i, h) in holes.iter().enumerate() {
        h.validate(&format!("hole #{}", i))?;
    }
    Ok(())
}

/// Maps `source` and `holes` onto the grid defined by `cfg.granularity`.
///
/// Hole edges are clamped to one grid step around the source, so a hole of any finite
/// size or distance maps to a representable grid rect and obstructs the same cells.
pub fn prepare(source: &Rect, holes: &[Rect], cfg: &DissectConfig) -> Result<PreparedInput> {
    let g = cfg.granularity;
    let sx0 = to_grid(source.x, g, f64::ceil)?;
    let sy0 = to_grid(source.y, g, f64::ceil)?;
    let sx1 = to_grid(source.right(), g, f64::floor)?.max(sx0);
    let sy1 = to_grid(source.bottom(), g, f64::floor)?.max(sy0);
    let grid_source = GridRect::new(sx0, sy0, sx1 - sx0, sy1 - sy0);

    let (lo_x, hi_x) = ((sx0 - 1) as f64, (sx1 + 1) as f64);
    let (lo_y, hi_y) = ((sy0 - 1) as f64, (sy1 + 1) as f64);
    let mut grid_holes = Vec::with_capacity(holes.len());
    for h in holes.iter().filter(|h| !h.is_empty()) {
        let hx0 = snap(h.x, g, f64::floor).clamp(lo_x, hi_x) as i64;
        let hy0 = snap(h.y, g, f64::floor).clamp(lo_y, hi_y) as i64;
        let hx1 = snap(h.right(), g, f64::ceil).clamp(lo_x, hi_x) as i64;
        let hy1 = snap(h.bottom(), g, f64::ceil).clamp(lo_y, hi_y) as i64;
        let hole = GridRect::new(hx0, hy0, hx1 - hx0, hy1 - hy0);
        if hole.is_empty() {
            continue;
        }
        if cfg.clip_holes {
            if let Some(c) = hole.clip(&grid_source) {
                grid_holes.push(c);
            }
        } else {
            grid_holes.push(hole);
        }
    }

    Ok(PreparedInput {
        source: grid_source,
        holes: grid_holes,
    })
}

/// Scales `v` to grid units and rounds with `round`, unless it already sits on a grid line.
fn snap(v: f64, granularity: f64, round: fn(f64) -> f64) -> f64 {
    let scaled = v / granularity;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        round(scaled)
    }
}

fn to_grid(v: f64, granularity: f64, round: fn(f64) -> f64) -> Result<i64> {
    let snapped = snap(v, granularity, round);
    if !snapped.is_finite() || snapped.abs() > MAX_GRID_COORD {
        return Err(DissectError::GridOverflow { value: v });
    }
    Ok(snapped as i64)
}

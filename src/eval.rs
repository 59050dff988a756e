//! Scoring: volume/floor utilization and loaded length, computed over a
//! trial's final (postprocessed) solution (spec.md §4.6).
//!
//! Grounded on `original_source/src/evaluation_module/evaluation.py`
//! (`volume_and_floor_utilization`, `maximum_x`). Weight-distribution
//! scoring from that same file is a stated Non-goal (spec.md §1) and is
//! deliberately not implemented.

use crate::geometry::Cm;
use crate::model::{Placement, Score};

/// `(pctg_volume, pctg_floor, x_axis)` for one trial's final solution
/// (spec.md §4.6). `x_axis` is `0` for an empty solution.
pub fn score(solution: &[Placement], container: (Cm, Cm, Cm)) -> Score {
    let (cl, cw, ch) = container;
    let container_volume = cl as f64 * cw as f64 * ch as f64;
    let container_floor = cl as f64 * cw as f64;

    let mut used_volume: f64 = 0.0;
    let mut used_floor: f64 = 0.0;
    let mut x_axis: Cm = 0;

    for p in solution {
        let e = &p.extent;
        let w_abs = e.w.unsigned_abs() as i64;
        used_volume += (e.l as i64 * w_abs * e.h as i64) as f64;
        if e.z == 0 {
            used_floor += (e.l as i64 * w_abs) as f64;
        }
        x_axis = x_axis.max(e.x + e.l);
    }

    Score {
        pctg_volume: used_volume / container_volume * 100.0,
        pctg_floor: used_floor / container_floor * 100.0,
        x_axis,
    }
}

//! Packing stage: places sorted boxes into potential points (PPs),
//! maintaining the PP frontier and a pending set of placements awaiting
//! lateral-support confirmation (spec.md §4.4).
//!
//! Grounded on `original_source/RCH_module/packing.py`
//! (`sort_PPs`, `is_feasible`, `merge`, `lateral_support`, `retry`,
//! `load_boxes`). Where spec.md's prose and the original source disagree
//! on lateral-support's neighbor check, spec.md's formal description
//! (distinct left-face/right-face adjacency with full z-overlap) is
//! implemented rather than the original's coincidentally-identical
//! left/right conditions — see DESIGN.md.

use crate::consts::{
    MERGE_ADJACENCY_TOLERANCE, MERGE_Z_TOLERANCE_X_ADJACENT, MERGE_Z_TOLERANCE_Y_ADJACENT,
    PP_SIDE_WALL_TOLERANCE, RIGHT_CORNER_THRESHOLD,
};
use crate::geometry::{Cm, Direction, Extent, fits, intersects};
use crate::model::{BoxId, Objective, OrientedBox, Placement, PotentialPoint};
use ordered_float::OrderedFloat;
use std::collections::HashMap;

/// Outcome of packing one box sequence into one container: the final
/// placements, the ids that could not be placed, and the surviving PP
/// frontier (needed by the checkpoint codec in resume mode).
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub solutions: Vec<Placement>,
    pub not_loaded: Vec<BoxId>,
    pub pps: Vec<PotentialPoint>,
}

/// The two full-container PPs present at the start of a fresh (non-resume)
/// trial: one anchored on the left wall, one on the right (spec.md §4.4).
pub fn initial_pps(container: (Cm, Cm, Cm)) -> Vec<PotentialPoint> {
    let (cl, cw, ch) = container;
    vec![
        PotentialPoint {
            x: 0,
            y: 0,
            z: 0,
            l: cl,
            w: cw,
            h: ch,
            direction: Direction::Left,
        },
        PotentialPoint {
            x: 0,
            y: cw,
            z: 0,
            l: cl,
            w: -cw,
            h: ch,
            direction: Direction::Right,
        },
    ]
}

/// Fresh packing run: starts from the two full-container PPs and an empty
/// solution set.
pub fn pack(
    boxes: &[(BoxId, OrientedBox)],
    container: (Cm, Cm, Cm),
    objective: Objective,
) -> PackOutcome {
    pack_from(initial_pps(container), Vec::new(), boxes, container, objective)
}

/// Resume packing (`load_type = 4`): continues from a checkpoint's
/// solutions and PP frontier instead of starting fresh (spec.md §4.4
/// "Resume mode").
pub fn pack_resume(
    solutions: Vec<Placement>,
    pps: Vec<PotentialPoint>,
    boxes: &[(BoxId, OrientedBox)],
    container: (Cm, Cm, Cm),
    objective: Objective,
) -> PackOutcome {
    pack_from(pps, solutions, boxes, container, objective)
}

fn pack_from(
    mut pps: Vec<PotentialPoint>,
    mut solutions: Vec<Placement>,
    boxes: &[(BoxId, OrientedBox)],
    container: (Cm, Cm, Cm),
    objective: Objective,
) -> PackOutcome {
    let lookup: HashMap<BoxId, OrientedBox> = boxes.iter().cloned().collect();
    let mut pending: Vec<BoxId> = Vec::new();
    let mut not_loaded: Vec<BoxId> = Vec::new();

    for (id, ob) in boxes {
        let placed = try_place(
            id,
            ob.l,
            ob.w,
            ob.h,
            ob.stackable,
            &mut pps,
            &mut solutions,
            &mut pending,
            container,
            objective,
        );
        if !placed {
            not_loaded.push(id.clone());
        }
    }
    drop_unsupported(&mut solutions, &mut pending, &mut not_loaded);

    // Retry pass: rotated orientation, PP sort mode fixed to MaxFloor,
    // a fresh pending set (spec.md §4.4 "Retry pass").
    let retry_ids = std::mem::take(&mut not_loaded);
    let mut retry_pending: Vec<BoxId> = Vec::new();
    for id in retry_ids {
        let ob = lookup[&id];
        let placed = try_place(
            &id,
            ob.w,
            ob.l,
            ob.h,
            ob.stackable,
            &mut pps,
            &mut solutions,
            &mut retry_pending,
            container,
            Objective::MaxFloor,
        );
        if !placed {
            not_loaded.push(id);
        }
    }
    drop_unsupported(&mut solutions, &mut retry_pending, &mut not_loaded);

    PackOutcome {
        solutions,
        not_loaded,
        pps,
    }
}

/// Drops placements still lacking lateral support at the end of a phase
/// (main pass or retry pass), moving their ids into `not_loaded`
/// (spec.md §4.4).
fn drop_unsupported(
    solutions: &mut Vec<Placement>,
    pending: &mut Vec<BoxId>,
    not_loaded: &mut Vec<BoxId>,
) {
    for id in pending.drain(..) {
        solutions.retain(|p| p.id != id);
        not_loaded.push(id);
    }
}

/// Attempts to place one box (given as `(l, w_mag, h)` with `w_mag`
/// always non-negative — the PP's direction supplies the sign) into the
/// first feasible PP in sorted order. Returns `true` and mutates `pps`,
/// `solutions` and `pending` on success.
#[allow(clippy::too_many_arguments)]
fn try_place(
    id: &BoxId,
    l: Cm,
    w_mag: Cm,
    h: Cm,
    stackable: bool,
    pps: &mut Vec<PotentialPoint>,
    solutions: &mut Vec<Placement>,
    pending: &mut Vec<BoxId>,
    container: (Cm, Cm, Cm),
    objective: Objective,
) -> bool {
    let (cl, cw, _ch) = container;
    let order = sort_pp_indices(l, w_mag, pps, objective, cw);

    for idx in order {
        let pp = pps[idx];
        let w = match pp.direction {
            Direction::Right => -w_mag,
            Direction::Left => w_mag,
        };

        if !fits(pp.l, pp.w, pp.h, l, w, h) {
            continue;
        }
        let extent = Extent::new(pp.x, pp.y, pp.z, l, w, h);
        if solutions.iter().any(|s| intersects(&s.extent, &extent)) {
            continue;
        }

        pps.remove(idx);

        let front = PotentialPoint {
            x: pp.x + l,
            y: pp.y,
            z: pp.z,
            l: pp.l - l,
            w: pp.w,
            h: pp.h,
            direction: pp.direction,
        };
        let side = PotentialPoint {
            x: pp.x,
            y: pp.y + w,
            z: pp.z,
            l,
            w: pp.w - w,
            h: pp.h,
            direction: pp.direction,
        };
        let top = PotentialPoint {
            x: pp.x,
            y: pp.y,
            z: pp.z + h,
            l,
            w,
            h: pp.h - h,
            direction: pp.direction,
        };

        let (top, old_idx) = merge_top_pp(top, pps);
        if let Some(old_idx) = old_idx {
            pps.remove(old_idx);
        }

        pps.push(front);
        pps.push(side);
        if stackable {
            pps.push(top);
        }

        if cw - (pp.y + w) < RIGHT_CORNER_THRESHOLD && pp.z == 0 {
            pps.push(PotentialPoint {
                x: pp.x + l,
                y: cw,
                z: pp.z,
                l: cl - (pp.x + l),
                w: -cw,
                h: pp.h,
                direction: Direction::Right,
            });
        }
        if pp.y + w < RIGHT_CORNER_THRESHOLD && pp.z == 0 && pp.direction == Direction::Right {
            pps.push(PotentialPoint {
                x: pp.x + l,
                y: 0,
                z: pp.z,
                l: cl - (pp.x + l),
                w: cw,
                h: pp.h,
                direction: Direction::Left,
            });
        }

        solutions.push(Placement {
            id: id.clone(),
            extent,
        });

        if pp.z > 0 && l > w.abs() && h > w.abs() {
            pending.push(id.clone());
        }

        lateral_support(solutions, pending, cw);

        return true;
    }

    false
}

/// Sorts PP indices per spec.md §4.4 `sort_PPs`: `pp_type` (side-wall
/// hugging) descending always comes first; the secondary key depends on
/// the objective. Ties keep their original relative order (stable sort).
fn sort_pp_indices(
    l: Cm,
    w_mag: Cm,
    pps: &[PotentialPoint],
    objective: Objective,
    container_width: Cm,
) -> Vec<usize> {
    let box_area = l as i64 * w_mag as i64;

    struct Keyed {
        idx: usize,
        pp_type: u8,
        coverage: f64,
        pp_l: Cm,
        z: Cm,
    }

    let mut keyed: Vec<Keyed> = pps
        .iter()
        .enumerate()
        .map(|(idx, pp)| {
            let pp_area = (pp.l as i64 * pp.w as i64).unsigned_abs() as i64;
            let coverage = if pp_area > 0 {
                box_area as f64 / pp_area as f64 * 100.0
            } else {
                0.0
            };
            let pp_type = if pp.y == 0
                || pp.y == container_width
                || container_width - (pp.y + w_mag) < PP_SIDE_WALL_TOLERANCE
            {
                1
            } else {
                0
            };
            Keyed {
                idx,
                pp_type,
                coverage,
                pp_l: pp.l,
                z: pp.z,
            }
        })
        .collect();

    match objective {
        Objective::MaxFloor => {
            keyed.sort_by(|a, b| b.pp_type.cmp(&a.pp_type).then_with(|| a.z.cmp(&b.z)));
        }
        _ => {
            keyed.sort_by(|a, b| {
                b.pp_type.cmp(&a.pp_type).then_with(|| {
                    let score_a = a.coverage - a.pp_l as f64;
                    let score_b = b.coverage - b.pp_l as f64;
                    OrderedFloat(score_b).cmp(&OrderedFloat(score_a))
                })
            });
        }
    }

    keyed.into_iter().map(|k| k.idx).collect()
}

/// Scans `pps` for the first top-PP merge match, per spec.md §4.4. The
/// y-adjacent rule doubles `w1` rather than summing `w1 + w2` — a literal
/// reference quirk spec.md §9 says to preserve rather than "fix".
fn merge_top_pp(
    top: PotentialPoint,
    pps: &[PotentialPoint],
) -> (PotentialPoint, Option<usize>) {
    for (idx, p1) in pps.iter().enumerate() {
        if p1.x < top.x
            && p1.y == top.y
            && (p1.z - top.z).abs() < MERGE_Z_TOLERANCE_X_ADJACENT
            && top.x - (p1.x + p1.l) < MERGE_ADJACENCY_TOLERANCE
        {
            let w = match p1.direction {
                Direction::Left => p1.w.min(top.w),
                Direction::Right => p1.w.max(top.w),
            };
            let merged = PotentialPoint {
                x: p1.x,
                y: p1.y,
                z: p1.z,
                l: p1.l + top.l,
                w,
                h: p1.h,
                direction: p1.direction,
            };
            return (merged, Some(idx));
        }

        if p1.x == top.x
            && p1.y < top.y
            && (p1.z - top.z).abs() < MERGE_Z_TOLERANCE_Y_ADJACENT
            && top.y - (p1.y + p1.w) < MERGE_ADJACENCY_TOLERANCE
        {
            let merged = PotentialPoint {
                x: p1.x,
                y: p1.y,
                z: p1.z,
                l: p1.l.min(top.l),
                w: p1.w + p1.w,
                h: p1.h,
                direction: p1.direction,
            };
            return (merged, Some(idx));
        }
    }
    (top, None)
}

/// A pending placement is confirmed (removed from `pending`) once it has
/// both left and right lateral support: a container wall on that face, or
/// another placement adjacent on that face with overlapping x/z footprint
/// (spec.md §4.4).
fn lateral_support(solutions: &[Placement], pending: &mut Vec<BoxId>, container_width: Cm) {
    pending.retain(|id| {
        let placement = solutions
            .iter()
            .find(|p| &p.id == id)
            .expect("pending id must reference a live placement");
        let (y_min, y_max) = placement.extent.y_span();
        let (x, z, l, h) = (
            placement.extent.x,
            placement.extent.z,
            placement.extent.l,
            placement.extent.h,
        );

        let left_wall = y_min == 0;
        let right_wall = y_max == container_width;

        let adjacent = |other: &Placement, face: Cm, want_max: bool| -> bool {
            if &other.id == id {
                return false;
            }
            let (oy_min, oy_max) = other.extent.y_span();
            let touches = if want_max { oy_max == face } else { oy_min == face };
            touches
                && other.extent.z < z + h
                && z < other.extent.z + other.extent.h
                && other.extent.x < x + l
                && other.extent.x + other.extent.l > x
        };

        let left_support = left_wall || solutions.iter().any(|o| adjacent(o, y_min, true));
        let right_support = right_wall || solutions.iter().any(|o| adjacent(o, y_max, false));

        !(left_support && right_support)
    });
}

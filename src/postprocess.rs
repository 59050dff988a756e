//! Postprocessing: expands composite-box placements back into
//! per-constituent absolute placements using the decomposition map built
//! during preprocessing (spec.md §4.5).
//!
//! Grounded on `original_source/RCH_module/postprocessing.py::separate_boxes`.
//! The decomposition map forms a DAG in principle (composites of
//! composites), so this walks a work queue rather than recursing
//! (spec.md §9).

use crate::model::{BoxId, DecompositionMap, Placement, RelativePlacement};
use std::collections::{HashSet, VecDeque};

/// Expands every composite placement in `solutions` into its constituent
/// absolute placements, deduplicating by id while preserving first
/// occurrence.
pub fn postprocess(solutions: Vec<Placement>, hmap: &DecompositionMap) -> Vec<Placement> {
    let mut queue: VecDeque<Placement> = solutions.into_iter().collect();
    let mut final_solution: Vec<Placement> = Vec::new();
    let mut seen: HashSet<BoxId> = HashSet::new();

    while let Some(placement) = queue.pop_front() {
        match hmap.get(&placement.id) {
            None => push_unique(&mut final_solution, &mut seen, placement),
            Some(children) => {
                let vertical = placement.id.is_vertical_composite();
                for (child_id, rel) in children {
                    let extent = if vertical {
                        expand_vertical(&placement, rel)
                    } else {
                        expand_horizontal(&placement, rel)
                    };
                    let child_placement = Placement {
                        id: child_id.clone(),
                        extent,
                    };
                    if hmap.contains_key(child_id) {
                        queue.push_back(child_placement);
                    } else {
                        push_unique(&mut final_solution, &mut seen, child_placement);
                    }
                }
            }
        }
    }

    final_solution
}

fn push_unique(out: &mut Vec<Placement>, seen: &mut HashSet<BoxId>, placement: Placement) {
    if seen.insert(placement.id.clone()) {
        out.push(placement);
    }
}

/// `_H` (vertical stack): child shares `(x, y)` with the parent; `z` is
/// offset by the relative `z`; length/width are taken from the relative
/// placement, swapped if the parent rotated the composite, and mirrored
/// if the parent is right-wall-anchored (spec.md §4.5).
fn expand_vertical(parent: &Placement, rel: &RelativePlacement) -> crate::geometry::Extent {
    let p = &parent.extent;
    let rotated = rel.l.abs() > p.l.abs() || rel.w.abs() > p.w.abs();
    let (length, mut width) = if rotated { (rel.w, rel.l) } else { (rel.l, rel.w) };

    if p.w < 0 {
        width = -width;
    }

    crate::geometry::Extent::new(p.x, p.y, p.z + rel.z, length, width, rel.h)
}

/// `_W` (side-by-side): absolute position adds the parent offset to the
/// relative one; if the parent is right-wall-anchored, the child's `y`
/// offset and width are mirrored (spec.md §4.5).
fn expand_horizontal(parent: &Placement, rel: &RelativePlacement) -> crate::geometry::Extent {
    let p = &parent.extent;
    let x = rel.x + p.x;
    let z = rel.z + p.z;

    let (y, w) = if p.w < 0 {
        let y = if rel.y > 0 { p.y - rel.y } else { p.y + rel.y };
        (y, -rel.w)
    } else {
        (p.y + rel.y, rel.w)
    };

    crate::geometry::Extent::new(x, y, z, rel.l, w, rel.h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;

    #[test]
    fn vertical_composite_expands_into_two_stacked_boxes() {
        let composite_id = BoxId::new("A/B_H", "E");
        let lower_id = BoxId::new("A", "E");
        let upper_id = BoxId::new("B", "E");

        let mut hmap = DecompositionMap::new();
        hmap.insert(
            composite_id.clone(),
            vec![
                (
                    lower_id.clone(),
                    RelativePlacement { x: 0, y: 0, z: 0, l: 50, w: 50, h: 40 },
                ),
                (
                    upper_id.clone(),
                    RelativePlacement { x: 0, y: 0, z: 40, l: 50, w: 50, h: 60 },
                ),
            ],
        );

        let solutions = vec![Placement {
            id: composite_id,
            extent: Extent::new(0, 0, 0, 50, 50, 100),
        }];

        let mut expanded = postprocess(solutions, &hmap);
        expanded.sort_by_key(|p| p.extent.z);

        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].id, lower_id);
        assert_eq!(expanded[0].extent, Extent::new(0, 0, 0, 50, 50, 40));
        assert_eq!(expanded[1].id, upper_id);
        assert_eq!(expanded[1].extent, Extent::new(0, 0, 40, 50, 50, 60));
    }

    #[test]
    fn right_anchored_parent_negates_child_width() {
        let composite_id = BoxId::new("A/B_H", "E");
        let lower_id = BoxId::new("A", "E");
        let upper_id = BoxId::new("B", "E");
        let mut hmap = DecompositionMap::new();
        hmap.insert(
            composite_id.clone(),
            vec![
                (lower_id.clone(), RelativePlacement { x: 0, y: 0, z: 0, l: 50, w: 50, h: 40 }),
                (upper_id.clone(), RelativePlacement { x: 0, y: 0, z: 40, l: 50, w: 50, h: 60 }),
            ],
        );
        let solutions = vec![Placement {
            id: composite_id,
            extent: Extent::new(0, 246, 0, 50, -50, 100),
        }];
        let expanded = postprocess(solutions, &hmap);
        assert!(expanded.iter().all(|p| p.extent.w == -50));
    }

    #[test]
    fn non_composite_passes_through_unchanged() {
        let hmap = DecompositionMap::new();
        let id = BoxId::new("A", "E");
        let solutions = vec![Placement {
            id: id.clone(),
            extent: Extent::new(1, 2, 3, 4, 5, 6),
        }];
        let expanded = postprocess(solutions, &hmap);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].id, id);
    }

    #[test]
    fn deduplicates_preserving_first_occurrence() {
        let id = BoxId::new("A", "E");
        let hmap = DecompositionMap::new();
        let solutions = vec![
            Placement { id: id.clone(), extent: Extent::new(0, 0, 0, 1, 1, 1) },
            Placement { id: id.clone(), extent: Extent::new(9, 9, 9, 1, 1, 1) },
        ];
        let expanded = postprocess(solutions, &hmap);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].extent, Extent::new(0, 0, 0, 1, 1, 1));
    }
}

//! Named constants from spec.md §6 — part of the contract, not tuning
//! knobs: changing them changes outputs.

use crate::geometry::Cm;

pub const NUM_SOLUTIONS: usize = 15_000;
pub const SHOWN_SOLUTIONS: usize = 5;

pub const DEFAULT_CONTAINER: (Cm, Cm, Cm) = (1350, 246, 259);

/// Merge / orientation tolerance on length and width comparisons (cm).
pub const LENGTH_TOLERANCE: Cm = 8;
/// Merge tolerance on height comparisons (cm).
pub const HEIGHT_TOLERANCE: Cm = 15;
/// Volumetric/pallet-normalization tolerance (cm).
pub const VOLUMETRIC_TOLERANCE: Cm = 25;

/// Standard pallet footprint boxes are snapped to.
pub const PALLET_DIMS: (Cm, Cm) = (120, 80);

/// A box is given priority 1 when `container_width - width < PRIORITY_WIDTH_GAP`.
pub const PRIORITY_WIDTH_GAP: Cm = 15;

/// Below this container-width gap, a box's width is forced into the length
/// axis (spec.md §3 orientation rule).
pub const ORIENTATION_WIDTH_GAP: Cm = 8;

/// Corner-PP emission threshold: a strip narrower than this next to a wall
/// gets its own corner potential point (spec.md §4.4).
pub const RIGHT_CORNER_THRESHOLD: Cm = 30;

/// Top-PP merge tolerances (spec.md §4.4): x-adjacent z-tolerance and
/// y-adjacent z-tolerance respectively.
pub const MERGE_Z_TOLERANCE_X_ADJACENT: Cm = 6;
pub const MERGE_Z_TOLERANCE_Y_ADJACENT: Cm = 7;
/// Adjacency gap tolerance shared by both merge rules.
pub const MERGE_ADJACENCY_TOLERANCE: Cm = 6;

/// PP is considered "side-wall-hugging" (pp_type 1) within this gap of the
/// far wall (spec.md §4.4).
pub const PP_SIDE_WALL_TOLERANCE: Cm = 6;

/// Sorter: swap adjacent same-priority boxes when their volume ratio falls
/// in this range.
pub const SORT_SWAP_VOLUME_RATIO: (f64, f64) = (0.7, 1.3);
pub const SORT_SWAP_PROBABILITY: f64 = 0.5;

pub const LOG_LEVEL_FILTER_RELEASE: log::LevelFilter = log::LevelFilter::Info;
pub const LOG_LEVEL_FILTER_DEBUG: log::LevelFilter = log::LevelFilter::Debug;

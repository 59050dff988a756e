//! Runtime configuration, grounded on `SparrowConfig`/`DEFAULT_SPARROW_CONFIG`
//! in the teacher's `config.rs`: a single struct the CLI patches fields of
//! before handing it to the driver.

use crate::consts::{DEFAULT_CONTAINER, NUM_SOLUTIONS, SHOWN_SOLUTIONS};
use crate::geometry::Cm;
use crate::model::Objective;

#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    /// Enable `_W` (side-by-side) composite merges. Off by default —
    /// `original_source` carries this merge pass under a disabled comment
    /// block (spec.md §9 Open Questions).
    pub merge_horizontal: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            merge_horizontal: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PackerConfig {
    pub container: (Cm, Cm, Cm),
    pub objective: Objective,
    pub num_trials: usize,
    pub shown_solutions: usize,
    pub rng_seed: Option<u64>,
    pub preprocess: PreprocessConfig,
}

pub const DEFAULT_PACKER_CONFIG: PackerConfig = PackerConfig {
    container: DEFAULT_CONTAINER,
    objective: Objective::MaxVolume,
    num_trials: NUM_SOLUTIONS,
    shown_solutions: SHOWN_SOLUTIONS,
    rng_seed: None,
    preprocess: PreprocessConfig {
        merge_horizontal: false,
    },
};

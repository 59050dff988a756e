//! Trial driver: runs N independent stochastic trials, scores each, and
//! selects the top-K per objective (spec.md §4.6).
//!
//! Grounded on `original_source/RCH_module/RCH.py::{RCH, get_volumes}` for
//! the per-trial pipeline and selection keys, and on the teacher's
//! `rayon`-based per-stage parallelism (spec.md §4.8, §5: "trials are
//! independent and parallelizable... embarrassingly parallel").

use crate::checkpoint;
use crate::config::PackerConfig;
use crate::error::Result;
use crate::model::{
    BoxId, DecompositionMap, InputBox, Objective, OrientedBox, Placement, PotentialPoint, Score,
};
use crate::util::listener::{TrialListener, TrialReport};
use crate::util::terminator::Terminator;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::path::Path;

/// One retained trial's outcome: the postprocessed (leaf-level) solution,
/// the raw packer PP frontier (needed for a resumable checkpoint), the
/// not-loaded ids and the score.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub score: Score,
    pub solution: Vec<Placement>,
    pub not_loaded: Vec<BoxId>,
    pub pps: Vec<PotentialPoint>,
    /// The orientation/priority this trial assigned each input box —
    /// kept so a caller can report the not-loaded table's `Prioridad`
    /// column (spec.md §6) without re-deriving it under a different seed.
    pub oriented: Vec<(BoxId, OrientedBox)>,
}

/// Aggregate result of a multi-trial run (spec.md §4.6, §6's CLI contract
/// `(avg_pctg, best_score_tuple, not_loaded_count)`).
#[derive(Debug, Clone)]
pub struct DriverResult {
    /// Top `shown_solutions` trials, best first, per the objective's sort key.
    pub top: Vec<TrialOutcome>,
    /// Mean `pctg_volume` across every retained (non-empty) trial —
    /// `original_source` names this `avg_pctg` (spec.md §6).
    pub avg_pctg: f64,
    pub trials_run: usize,
    pub trials_dropped_empty: usize,
}

impl DriverResult {
    pub fn best(&self) -> Option<&TrialOutcome> {
        self.top.first()
    }
}

const TRIAL_BATCH_SIZE: usize = 256;

/// Runs `config.num_trials` independent trials (batched so the driver can
/// honor `terminator` between batches — spec.md §5 "cancellation is a
/// policy choice of the driver"), selects the top-K per
/// `config.objective`, and — for `Objective::MinXAxis` — persists the best
/// trial's solution and PP frontier to `checkpoint_path` (spec.md §4.6).
pub fn run_trials(
    boxes: &[InputBox],
    hmap: &DecompositionMap,
    config: &PackerConfig,
    resume_from: Option<(Vec<Placement>, Vec<PotentialPoint>)>,
    terminator: &dyn Terminator,
    listener: &mut dyn TrialListener,
    checkpoint_path: Option<&Path>,
) -> Result<DriverResult> {
    let master_seed = config.rng_seed.unwrap_or_else(rand::random);
    info!("[DRIVER] starting {} trials (seed {master_seed})", config.num_trials);

    let mut master_rng = Xoshiro256PlusPlus::seed_from_u64(master_seed);
    let mut outcomes: Vec<TrialOutcome> = Vec::new();
    let mut trials_run = 0usize;
    let mut trials_dropped_empty = 0usize;

    let mut remaining = config.num_trials;
    while remaining > 0 {
        if terminator.kill() {
            warn!("[DRIVER] terminator signaled, stopping after {trials_run} trials");
            break;
        }
        let batch = remaining.min(TRIAL_BATCH_SIZE);
        let seeds: Vec<u64> = (0..batch).map(|_| master_rng.next_u64()).collect();

        let batch_results: Vec<Option<TrialOutcome>> = seeds
            .into_par_iter()
            .map(|seed| run_one_trial(seed, boxes, hmap, config, &resume_from))
            .collect();

        for (i, result) in batch_results.into_iter().enumerate() {
            let trial_index = trials_run + i;
            match result {
                Some(outcome) => {
                    debug!(
                        "[DRIVER] trial {trial_index}: volume={:.2}% floor={:.2}% x_axis={} not_loaded={}",
                        outcome.score.pctg_volume,
                        outcome.score.pctg_floor,
                        outcome.score.x_axis,
                        outcome.not_loaded.len(),
                    );
                    listener.report(TrialReport {
                        trial_index,
                        score: outcome.score,
                        not_loaded_count: outcome.not_loaded.len(),
                    });
                    outcomes.push(outcome);
                }
                None => {
                    warn!("[DRIVER] trial {trial_index} produced an empty solution, dropped");
                    trials_dropped_empty += 1;
                }
            }
        }

        trials_run += batch;
        remaining -= batch;
    }

    outcomes.sort_by(|a, b| objective_key(config.objective, &b.score).cmp(&objective_key(config.objective, &a.score)));

    let avg_pctg = if outcomes.is_empty() {
        0.0
    } else {
        outcomes.iter().map(|o| o.score.pctg_volume).sum::<f64>() / outcomes.len() as f64
    };

    if let (Objective::MinXAxis, Some(path), Some(best)) =
        (config.objective, checkpoint_path, outcomes.first())
    {
        checkpoint::save(&best.solution, &best.pps, path)?;
    }

    let top = outcomes.into_iter().take(config.shown_solutions).collect();

    info!(
        "[DRIVER] finished: {trials_run} trials run, {trials_dropped_empty} dropped (empty), avg_pctg={avg_pctg:.2}%"
    );

    Ok(DriverResult {
        top,
        avg_pctg,
        trials_run,
        trials_dropped_empty,
    })
}

fn objective_key(objective: Objective, s: &Score) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
    match objective {
        Objective::MaxVolume => (OrderedFloat(s.pctg_volume), OrderedFloat(s.pctg_floor)),
        Objective::MinXAxis | Objective::Resume => {
            (OrderedFloat(-(s.x_axis as f64)), OrderedFloat(s.pctg_floor))
        }
        Objective::MaxFloor => (OrderedFloat(s.pctg_floor), OrderedFloat(s.pctg_volume)),
    }
}

fn run_one_trial(
    seed: u64,
    boxes: &[InputBox],
    hmap: &DecompositionMap,
    config: &PackerConfig,
    resume_from: &Option<(Vec<Placement>, Vec<PotentialPoint>)>,
) -> Option<TrialOutcome> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let oriented = crate::preprocess::orient_boxes(boxes, config.container.1, &mut rng);
    let sorted = crate::sort::sort_boxes(oriented, &mut rng);

    let pack_out = match resume_from {
        Some((solutions, pps)) => crate::pack::pack_resume(
            solutions.clone(),
            pps.clone(),
            &sorted,
            config.container,
            config.objective,
        ),
        None => crate::pack::pack(&sorted, config.container, config.objective),
    };

    let final_solution = crate::postprocess::postprocess(pack_out.solutions, hmap);
    if final_solution.is_empty() {
        return None;
    }

    let score = crate::eval::score(&final_solution, config.container);
    Some(TrialOutcome {
        score,
        solution: final_solution,
        not_loaded: pack_out.not_loaded,
        pps: pack_out.pps,
        oriented: sorted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Objective;
    use crate::util::listener::NullTrialListener;
    use crate::util::terminator::BasicTerminator;

    fn ibox(partida: &str, l: i32, w: i32, h: i32, stackable: bool) -> InputBox {
        InputBox {
            id: BoxId::new(partida, "E1"),
            length: l,
            width: w,
            height: h,
            weight: 10.0,
            volume: (l * w * h) as f64,
            stackable,
            codigo_viaje: "V1".into(),
            fecha_carga_contenedor: "".into(),
            fecha_entrada_almacen: "".into(),
            tipo_partida: "".into(),
        }
    }

    #[test]
    fn more_trials_never_lowers_the_best_score() {
        let boxes = vec![
            ibox("A", 60, 50, 40, true),
            ibox("B", 55, 60, 50, false),
            ibox("C", 70, 40, 30, true),
        ];
        let hmap = DecompositionMap::new();
        let mut small_cfg = crate::config::DEFAULT_PACKER_CONFIG;
        small_cfg.objective = Objective::MaxVolume;
        small_cfg.num_trials = 5;
        small_cfg.rng_seed = Some(7);
        small_cfg.container = (100, 100, 100);

        let mut large_cfg = small_cfg;
        large_cfg.num_trials = 50;

        let terminator = BasicTerminator::new();
        let mut listener = NullTrialListener;

        let small = run_trials(&boxes, &hmap, &small_cfg, None, &terminator, &mut listener, None).unwrap();
        let large = run_trials(&boxes, &hmap, &large_cfg, None, &terminator, &mut listener, None).unwrap();

        let small_best = small.best().unwrap().score.pctg_volume;
        let large_best = large.best().unwrap().score.pctg_volume;
        assert!(large_best >= small_best);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let boxes = vec![ibox("A", 60, 50, 40, true), ibox("B", 55, 60, 50, false)];
        let hmap = DecompositionMap::new();
        let mut cfg = crate::config::DEFAULT_PACKER_CONFIG;
        cfg.num_trials = 10;
        cfg.rng_seed = Some(99);
        cfg.container = (100, 100, 100);

        let terminator = BasicTerminator::new();
        let mut listener = NullTrialListener;
        let r1 = run_trials(&boxes, &hmap, &cfg, None, &terminator, &mut listener, None).unwrap();
        let r2 = run_trials(&boxes, &hmap, &cfg, None, &terminator, &mut listener, None).unwrap();

        assert_eq!(r1.best().unwrap().score.pctg_volume, r2.best().unwrap().score.pctg_volume);
        assert_eq!(r1.best().unwrap().solution, r2.best().unwrap().solution);
    }
}

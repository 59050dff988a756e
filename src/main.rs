use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use stowbox::config::DEFAULT_PACKER_CONFIG;
use stowbox::consts::{LOG_LEVEL_FILTER_DEBUG, LOG_LEVEL_FILTER_RELEASE};
use stowbox::error::PackingError;
use stowbox::model::Objective;
use stowbox::util::ctrlc_terminator::CtrlCTerminator;
use stowbox::util::io::init_logger;
use stowbox::util::listener::NullTrialListener;
use stowbox::{checkpoint, driver, io as tabular, preprocess};

pub const OUTPUT_DIR: &str = "output";

/// CLI entry point (spec.md §6): `(viaje, load_type, file_path) ->
/// (avg_pctg, best_score_tuple, not_loaded_count)`, grounded on the
/// teacher's `MainCli` + `main.rs` shape.
#[derive(Parser)]
#[command(about = "Randomized constructive heuristic for 3D container loading")]
struct Cli {
    /// Trip identifier (viaje)
    viaje: String,

    /// Load type: 1 max volume, 2 min x-axis, 3 max floor, 4 resume
    #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
    load_type: u8,

    /// Path to the input box table (CSV, spec.md §6 schema)
    file_path: PathBuf,

    /// Override the configured number of trials
    #[arg(long)]
    trials: Option<usize>,

    /// Fixed seed for the random number generator
    #[arg(short = 's', long)]
    rng_seed: Option<u64>,

    /// Directory checkpoints are read from / written to
    #[arg(long, default_value = "soluciones")]
    checkpoint_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let log_file_path = format!("{OUTPUT_DIR}/log.txt");
    match cfg!(debug_assertions) {
        true => init_logger(LOG_LEVEL_FILTER_DEBUG, Path::new(&log_file_path))?,
        false => init_logger(LOG_LEVEL_FILTER_RELEASE, Path::new(&log_file_path))?,
    }

    let objective = Objective::from_load_type(args.load_type)
        .ok_or_else(|| anyhow!("invalid load_type {}", args.load_type))?;

    let mut config = DEFAULT_PACKER_CONFIG;
    config.objective = objective;
    if let Some(trials) = args.trials {
        config.num_trials = trials;
    }
    if let Some(seed) = args.rng_seed {
        config.rng_seed = Some(seed);
    }

    let checkpoint_path = args.checkpoint_dir.join(format!("output_{}.json", args.viaje));

    let raw_boxes = tabular::read_boxes(&args.file_path)
        .with_context(|| format!("reading input table {:?}", args.file_path))?;
    info!(
        "[MAIN] loaded {} input box rows for viaje {}",
        raw_boxes.len(),
        args.viaje
    );

    let (boxes, hmap) = preprocess::preprocess(raw_boxes, config.container, &config.preprocess)?;
    info!(
        "[MAIN] preprocessed into {} packer-facing boxes ({} composite entries in hmap)",
        boxes.len(),
        hmap.len()
    );

    let resume_from = if objective == Objective::Resume {
        Some(checkpoint::load(&checkpoint_path)?)
    } else {
        None
    };

    let terminator = CtrlCTerminator::new();
    let mut listener = NullTrialListener;
    let checkpoint_out = (objective == Objective::MinXAxis).then_some(checkpoint_path.as_path());

    let result = driver::run_trials(
        &boxes,
        &hmap,
        &config,
        resume_from,
        &terminator,
        &mut listener,
        checkpoint_out,
    )?;

    let best = result.best().ok_or(PackingError::EmptySolution)?;
    info!(
        "[MAIN] best trial: volume={:.2}% floor={:.2}% x_axis={}",
        best.score.pctg_volume, best.score.pctg_floor, best.score.x_axis
    );

    let not_loaded_ids: HashSet<_> = best.not_loaded.iter().cloned().collect();
    let oriented_by_id: std::collections::HashMap<_, _> =
        best.oriented.iter().cloned().collect();

    let unloaded_rows: Vec<_> = boxes
        .iter()
        .filter(|b| not_loaded_ids.contains(&b.id))
        .map(|b| {
            let ob = oriented_by_id.get(&b.id);
            tabular::UnloadedBoxRow {
                partida: b.id.partida.clone(),
                largo_cm: ob.map(|o| o.l).unwrap_or(b.length),
                ancho_cm: ob.map(|o| o.w).unwrap_or(b.width),
                alto_cm: b.height,
                prioridad: ob.map(|o| o.priority).unwrap_or(2),
                remontable: b.stackable,
            }
        })
        .collect();

    let unloaded_path = PathBuf::from(OUTPUT_DIR).join(format!("not_loaded_{}.csv", args.viaje));
    tabular::write_unloaded(&unloaded_rows, &unloaded_path)?;

    println!(
        "avg_pctg={:.2} best=({:.2}, {:.2}, {}) not_loaded={}",
        result.avg_pctg,
        best.score.pctg_volume,
        best.score.pctg_floor,
        best.score.x_axis,
        unloaded_rows.len()
    );

    Ok(())
}

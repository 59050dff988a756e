//! Checkpoint codec: persists `(solutions, PPs)` so a `MinXAxis` trial's
//! best result can be resumed later as a `Resume` trial (spec.md §4.7).
//!
//! Grounded on the teacher's `util::io::{write_json, read_spp_instance_json}`
//! for the log-on-write pattern, wire-schema fields kept exactly as
//! spec.md §4.7 specifies (a JSON array-of-arrays shape, not a struct
//! shape, and the literal strings `"left"`/`"right"`) so the format stays
//! interoperable with any existing checkpoint produced by the original
//! system.

use crate::error::{PackingError, Result};
use crate::geometry::{Cm, Direction, Extent};
use crate::model::{BoxId, Placement, PotentialPoint};
use log::{Level, log};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct WireId(String, String);

#[derive(Serialize, Deserialize)]
struct WirePlacement(WireId, (Cm, Cm, Cm, Cm, Cm, Cm));

#[derive(Serialize, Deserialize)]
struct WirePp(Cm, Cm, Cm, Cm, Cm, Cm, String);

#[derive(Serialize, Deserialize)]
struct WireCheckpoint {
    solution: Vec<WirePlacement>,
    #[serde(rename = "PPs")]
    pps: Vec<WirePp>,
}

fn direction_to_str(d: Direction) -> String {
    match d {
        Direction::Left => "left".to_string(),
        Direction::Right => "right".to_string(),
    }
}

fn direction_from_str(s: &str) -> Result<Direction> {
    match s {
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        other => Err(PackingError::CheckpointIo(format!(
            "unknown PP direction {other:?}"
        ))),
    }
}

/// Saves the current best solution and PP frontier to `path`
/// (`output_{viaje}.json` in the external contract, spec.md §6).
pub fn save(solutions: &[Placement], pps: &[PotentialPoint], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PackingError::CheckpointIo(e.to_string()))?;
    }

    let wire = WireCheckpoint {
        solution: solutions
            .iter()
            .map(|p| {
                let e = &p.extent;
                WirePlacement(
                    WireId(p.id.partida.clone(), p.id.expedicion.clone()),
                    (e.x, e.y, e.z, e.l, e.w, e.h),
                )
            })
            .collect(),
        pps: pps
            .iter()
            .map(|pp| {
                WirePp(
                    pp.x,
                    pp.y,
                    pp.z,
                    pp.l,
                    pp.w,
                    pp.h,
                    direction_to_str(pp.direction),
                )
            })
            .collect(),
    };

    let file = File::create(path).map_err(|e| PackingError::CheckpointIo(e.to_string()))?;
    serde_json::to_writer_pretty(file, &wire)
        .map_err(|e| PackingError::CheckpointIo(e.to_string()))?;
    log!(
        Level::Info,
        "[CHECKPOINT] saved {} placements, {} PPs to {}",
        wire.solution.len(),
        wire.pps.len(),
        path.display()
    );
    Ok(())
}

/// Loads a previously saved checkpoint, for `Resume`-objective trials.
pub fn load(path: &Path) -> Result<(Vec<Placement>, Vec<PotentialPoint>)> {
    let file = File::open(path).map_err(|e| PackingError::CheckpointIo(e.to_string()))?;
    let wire: WireCheckpoint = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PackingError::CheckpointIo(e.to_string()))?;

    let solutions = wire
        .solution
        .into_iter()
        .map(|WirePlacement(id, (x, y, z, l, w, h))| Placement {
            id: BoxId::new(id.0, id.1),
            extent: Extent::new(x, y, z, l, w, h),
        })
        .collect();

    let pps = wire
        .pps
        .into_iter()
        .map(|WirePp(x, y, z, l, w, h, dir)| {
            Ok(PotentialPoint {
                x,
                y,
                z,
                l,
                w,
                h,
                direction: direction_from_str(&dir)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log!(
        Level::Info,
        "[CHECKPOINT] loaded {} placements, {} PPs from {}",
        solutions.len(),
        pps.len(),
        path.display()
    );
    Ok((solutions, pps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_solutions_and_pps() {
        let dir = std::env::temp_dir().join(format!(
            "stowbox-checkpoint-test-{}.json",
            std::process::id()
        ));

        let solutions = vec![Placement {
            id: BoxId::new("A", "E1"),
            extent: Extent::new(1, 2, 3, 4, 5, 6),
        }];
        let pps = vec![PotentialPoint {
            x: 0,
            y: 246,
            z: 0,
            l: 1350,
            w: -246,
            h: 259,
            direction: Direction::Right,
        }];

        save(&solutions, &pps, &dir).unwrap();
        let (loaded_solutions, loaded_pps) = load(&dir).unwrap();

        assert_eq!(loaded_solutions, solutions);
        assert_eq!(loaded_pps.len(), 1);
        assert_eq!(loaded_pps[0].direction, Direction::Right);
        assert_eq!(loaded_pps[0].w, -246);

        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn malformed_checkpoint_is_checkpoint_io_error() {
        let dir = std::env::temp_dir().join(format!(
            "stowbox-checkpoint-bad-{}.json",
            std::process::id()
        ));
        std::fs::write(&dir, "not json").unwrap();
        let result = load(&dir);
        assert!(matches!(result, Err(PackingError::CheckpointIo(_))));
        let _ = std::fs::remove_file(&dir);
    }
}

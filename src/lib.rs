//! Randomized constructive heuristic (RCH) for three-dimensional container
//! loading: preprocessing, sorting, potential-point packing,
//! postprocessing and a multi-trial driver, plus the ambient stack
//! (config, errors, logging, checkpointing, tabular I/O) that carries it.

use std::sync::LazyLock;
use std::time::Instant;

pub mod checkpoint;
pub mod config;
pub mod consts;
pub mod driver;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod io;
pub mod model;
pub mod pack;
pub mod postprocess;
pub mod preprocess;
pub mod sort;
pub mod util;

/// Process start time, used to format elapsed-time log prefixes the same
/// way the teacher's `EPOCH` does.
pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

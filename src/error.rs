//! Error kinds (spec.md §7). Preprocessing errors abort the run;
//! per-box and per-trial failures are not errors — they are folded into
//! the not-loaded list / dropped trial by the caller instead of bubbling
//! up through this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("checkpoint I/O failed: {0}")]
    CheckpointIo(String),

    #[error("packer produced zero placements")]
    EmptySolution,
}

pub type Result<T> = std::result::Result<T, PackingError>;

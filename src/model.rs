//! Domain types: input boxes, oriented boxes, placements, potential points
//! and the objective enum. Grounded on spec.md §3 and the `[boxid]` keying
//! used throughout `original_source/RCH_module/*.py`.

use crate::geometry::{Cm, Direction, Extent};
use std::collections::HashMap;

/// Composite key `(Partida, Expedicion)` identifying a box or a composite
/// of boxes. Ordered so iteration over a `BTreeMap<BoxId, _>` is
/// deterministic independent of hash order (determinism law, spec.md §8).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct BoxId {
    pub partida: String,
    pub expedicion: String,
}

impl BoxId {
    pub fn new(partida: impl Into<String>, expedicion: impl Into<String>) -> Self {
        Self {
            partida: partida.into(),
            expedicion: expedicion.into(),
        }
    }

    /// `true` for ids minted by the vertical-merge preprocessing step.
    pub fn is_vertical_composite(&self) -> bool {
        self.partida.ends_with("_H")
    }

    /// `true` for ids minted by the horizontal-merge preprocessing step.
    pub fn is_horizontal_composite(&self) -> bool {
        self.partida.ends_with("_W")
    }

    pub fn is_composite(&self) -> bool {
        self.is_vertical_composite() || self.is_horizontal_composite()
    }
}

/// Raw input box, one row of the tabular schema (spec.md §6).
#[derive(Debug, Clone, PartialEq)]
pub struct InputBox {
    pub id: BoxId,
    pub length: Cm,
    pub width: Cm,
    pub height: Cm,
    pub weight: f64,
    pub volume: f64,
    pub stackable: bool,
    pub codigo_viaje: String,
    pub fecha_carga_contenedor: String,
    pub fecha_entrada_almacen: String,
    pub tipo_partida: String,
}

/// A box ready for the packer: orientation has been decided, priority
/// assigned (spec.md §3). `[L, W, H, priority, stackable]` collapsed into a
/// struct rather than an untyped tuple/list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedBox {
    pub l: Cm,
    pub w: Cm,
    pub h: Cm,
    pub priority: u8,
    pub stackable: bool,
}

impl OrientedBox {
    pub fn volume(&self) -> i64 {
        self.l as i64 * self.w as i64 * self.h as i64
    }
}

/// One child of a composite box, at a position relative to the composite's
/// own reference corner (spec.md §3, `hmap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativePlacement {
    pub x: Cm,
    pub y: Cm,
    pub z: Cm,
    pub l: Cm,
    pub w: Cm,
    pub h: Cm,
}

/// Decomposition map: composite id -> ordered list of (child id, relative
/// placement). A DAG in principle (composites of composites); the
/// postprocessor walks it with a work queue (spec.md §4.5, §9).
pub type DecompositionMap = HashMap<BoxId, Vec<(BoxId, RelativePlacement)>>;

/// A box fixed at a corner in container coordinates (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: BoxId,
    pub extent: Extent,
}

/// A free cuboid region a box may be placed into (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PotentialPoint {
    pub x: Cm,
    pub y: Cm,
    pub z: Cm,
    pub l: Cm,
    pub w: Cm,
    pub h: Cm,
    pub direction: Direction,
}

impl PotentialPoint {
    pub fn extent(&self) -> Extent {
        Extent::new(self.x, self.y, self.z, self.l, self.w, self.h)
    }
}

/// Which score the trial driver optimizes for (`load_type` in
/// `original_source`, spec.md §4.6/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// load_type 1: maximize volume utilization, then floor.
    MaxVolume,
    /// load_type 2: minimize the loaded length along the container axis.
    MinXAxis,
    /// load_type 3: maximize floor utilization, then volume.
    MaxFloor,
    /// load_type 4: continue packing from a persisted checkpoint.
    Resume,
}

impl Objective {
    pub fn from_load_type(load_type: u8) -> Option<Self> {
        match load_type {
            1 => Some(Objective::MaxVolume),
            2 => Some(Objective::MinXAxis),
            3 => Some(Objective::MaxFloor),
            4 => Some(Objective::Resume),
            _ => None,
        }
    }
}

/// `(pctg_volume, pctg_floor, x_axis)` as computed in spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub pctg_volume: f64,
    pub pctg_floor: f64,
    pub x_axis: Cm,
}

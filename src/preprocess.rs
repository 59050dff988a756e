//! Preprocessing: pallet normalization, composite-box merges and
//! orientation assignment (spec.md §4.2, §3).
//!
//! Grounded on `original_source/RCH_module/preprocessing.py::join_box` for
//! the merge rules and `original_source/RCH_module/RCH.py::RCH` for the
//! orientation/priority assignment that the caller performs afterwards.

use crate::consts::{
    HEIGHT_TOLERANCE, LENGTH_TOLERANCE, ORIENTATION_WIDTH_GAP, PALLET_DIMS, PRIORITY_WIDTH_GAP,
    VOLUMETRIC_TOLERANCE,
};
use crate::error::{PackingError, Result};
use crate::geometry::Cm;
use crate::model::{BoxId, DecompositionMap, InputBox, OrientedBox, RelativePlacement};
use rand::Rng;

/// Snap pallet-sized boxes (`120±25 x 80±25`) to the canonical `(120, 80)`
/// footprint (spec.md §4.2).
pub fn normalize_pallets(boxes: &mut [InputBox]) {
    let (pallet_l, pallet_w) = PALLET_DIMS;
    for b in boxes.iter_mut() {
        let l_in_range = (pallet_l - VOLUMETRIC_TOLERANCE < b.length)
            && (b.length < pallet_l + VOLUMETRIC_TOLERANCE);
        let w_in_range = (pallet_w - VOLUMETRIC_TOLERANCE < b.width)
            && (b.width < pallet_w + VOLUMETRIC_TOLERANCE);
        if l_in_range && w_in_range {
            b.length = pallet_l;
            b.width = pallet_w;
        }
    }
}

fn validate(boxes: &[InputBox], container_height: Cm) -> Result<()> {
    for b in boxes {
        if b.length <= 0 || b.width <= 0 || b.height <= 0 {
            return Err(PackingError::InvalidInput(format!(
                "box {:?} has non-positive dimensions",
                b.id
            )));
        }
        if b.height > container_height {
            return Err(PackingError::InvalidInput(format!(
                "box {:?} height {} exceeds container height {}",
                b.id, b.height, container_height
            )));
        }
    }
    Ok(())
}

fn vertical_composite_id(lower: &BoxId, upper: &BoxId) -> BoxId {
    BoxId::new(
        format!("{}/{}_H", lower.partida, upper.partida),
        lower.expedicion.clone(),
    )
}

/// Vertical (`_H`) merge: stack two boxes whose footprints are close enough
/// and whose combined height still fits the container. Greedy, at most one
/// merge per source box per pass (spec.md §4.2).
fn merge_vertical(
    boxes: Vec<InputBox>,
    container_height: Cm,
    hmap: &mut DecompositionMap,
) -> Vec<InputBox> {
    let mut combined = vec![false; boxes.len()];
    let mut result = Vec::with_capacity(boxes.len());

    for i in 0..boxes.len() {
        if combined[i] {
            continue;
        }
        let mut merged_with = None;
        for j in (i + 1)..boxes.len() {
            if combined[j] {
                continue;
            }
            let (b1, b2) = (&boxes[i], &boxes[j]);
            let footprint_close = (b1.length - b2.length).abs() < VOLUMETRIC_TOLERANCE
                && (b1.width - b2.width).abs() < VOLUMETRIC_TOLERANCE
                && b1.height + b2.height < container_height;
            if !footprint_close {
                continue;
            }
            // The lower box in the stack must be stackable; try `i` below
            // `j`, then `j` below `i` (original_source tries both orders).
            let (lower, upper) = if b1.stackable {
                (i, j)
            } else if b2.stackable {
                (j, i)
            } else {
                continue;
            };
            merged_with = Some((lower, upper));
            break;
        }

        if let Some((lower_idx, upper_idx)) = merged_with {
            let lower = &boxes[lower_idx];
            let upper = &boxes[upper_idx];
            let id = vertical_composite_id(&lower.id, &upper.id);

            hmap.insert(
                id.clone(),
                vec![
                    (
                        lower.id.clone(),
                        RelativePlacement {
                            x: 0,
                            y: 0,
                            z: 0,
                            l: lower.length,
                            w: lower.width,
                            h: lower.height,
                        },
                    ),
                    (
                        upper.id.clone(),
                        RelativePlacement {
                            x: 0,
                            y: 0,
                            z: lower.height,
                            l: upper.length,
                            w: upper.width,
                            h: upper.height,
                        },
                    ),
                ],
            );

            result.push(InputBox {
                id,
                length: lower.length.max(upper.length),
                width: lower.width.max(upper.width),
                height: lower.height + upper.height,
                weight: lower.weight + upper.weight,
                volume: lower.volume + upper.volume,
                stackable: upper.stackable,
                codigo_viaje: lower.codigo_viaje.clone(),
                fecha_carga_contenedor: lower.fecha_carga_contenedor.clone(),
                fecha_entrada_almacen: lower.fecha_entrada_almacen.clone(),
                tipo_partida: lower.tipo_partida.clone(),
            });
            combined[lower_idx] = true;
            combined[upper_idx] = true;
        } else {
            result.push(boxes[i].clone());
        }
    }

    result
}

/// Side-by-side (`_W`) merge of 2 or 3 boxes whose combined widths
/// approximate the container width. Off by default (spec.md §9); the
/// reference implementation keeps this pass behind a disabled block.
fn merge_horizontal(
    boxes: Vec<InputBox>,
    container_width: Cm,
    hmap: &mut DecompositionMap,
) -> Vec<InputBox> {
    let mut combined = vec![false; boxes.len()];
    let mut result: Vec<InputBox> = Vec::new();
    let mut consumed_any = vec![false; boxes.len()];

    // Triples first, matching `original_source`'s length-grouped
    // greedy pass, checked before pairs so a box isn't claimed twice.
    'triples: for i in 0..boxes.len() {
        if combined[i] {
            continue;
        }
        for j in (i + 1)..boxes.len() {
            if combined[j] {
                continue;
            }
            for k in (j + 1)..boxes.len() {
                if combined[k] {
                    continue;
                }
                let (b1, b2, b3) = (&boxes[i], &boxes[j], &boxes[k]);
                let total_width = b1.width + b2.width + b3.width;
                let heights_close = (b1.height - b2.height).abs() < HEIGHT_TOLERANCE
                    && (b1.height - b3.height).abs() < HEIGHT_TOLERANCE
                    && (b2.height - b3.height).abs() < HEIGHT_TOLERANCE;
                let width_close =
                    container_width - total_width > 0 && container_width - total_width < LENGTH_TOLERANCE;
                if heights_close && width_close {
                    let id = BoxId::new(
                        format!("{}/{}/{}_W", b1.id.partida, b2.id.partida, b3.id.partida),
                        b1.id.expedicion.clone(),
                    );
                    hmap.insert(
                        id.clone(),
                        vec![
                            (
                                b1.id.clone(),
                                RelativePlacement { x: 0, y: 0, z: 0, l: b1.length, w: b1.width, h: b1.height },
                            ),
                            (
                                b2.id.clone(),
                                RelativePlacement { x: 0, y: b1.width, z: 0, l: b2.length, w: b2.width, h: b2.height },
                            ),
                            (
                                b3.id.clone(),
                                RelativePlacement { x: 0, y: b1.width + b2.width, z: 0, l: b3.length, w: b3.width, h: b3.height },
                            ),
                        ],
                    );
                    result.push(InputBox {
                        id,
                        length: b1.length.max(b2.length).max(b3.length),
                        width: total_width,
                        height: b1.height.max(b2.height).max(b3.height),
                        weight: b1.weight + b2.weight + b3.weight,
                        volume: b1.volume + b2.volume + b3.volume,
                        stackable: b1.stackable && b2.stackable && b3.stackable,
                        codigo_viaje: b1.codigo_viaje.clone(),
                        fecha_carga_contenedor: b1.fecha_carga_contenedor.clone(),
                        fecha_entrada_almacen: b1.fecha_entrada_almacen.clone(),
                        tipo_partida: b1.tipo_partida.clone(),
                    });
                    combined[i] = true;
                    combined[j] = true;
                    combined[k] = true;
                    consumed_any[i] = true;
                    consumed_any[j] = true;
                    consumed_any[k] = true;
                    continue 'triples;
                }
            }
        }
    }

    for i in 0..boxes.len() {
        if combined[i] {
            continue;
        }
        let mut merged_with = None;
        for j in (i + 1)..boxes.len() {
            if combined[j] {
                continue;
            }
            let (b1, b2) = (&boxes[i], &boxes[j]);
            let total_width = b1.width + b2.width;
            let gap = container_width - total_width;
            let widths_fit = (0..LENGTH_TOLERANCE).contains(&gap);
            let lengths_close = (b1.length - b2.length).abs() < LENGTH_TOLERANCE;
            let heights_close = (b1.height - b2.height).abs() < HEIGHT_TOLERANCE;
            if widths_fit && lengths_close && heights_close {
                merged_with = Some(j);
                break;
            }
        }
        if let Some(j) = merged_with {
            let (b1, b2) = (&boxes[i], &boxes[j]);
            let id = BoxId::new(
                format!("{}/{}_W", b1.id.partida, b2.id.partida),
                b1.id.expedicion.clone(),
            );
            hmap.insert(
                id.clone(),
                vec![
                    (
                        b1.id.clone(),
                        RelativePlacement { x: 0, y: 0, z: 0, l: b1.length, w: b1.width, h: b1.height },
                    ),
                    (
                        b2.id.clone(),
                        RelativePlacement { x: 0, y: b1.width, z: 0, l: b2.length, w: b2.width, h: b2.height },
                    ),
                ],
            );
            result.push(InputBox {
                id,
                length: b1.length.max(b2.length),
                width: b1.width + b2.width,
                height: b1.height.max(b2.height),
                weight: b1.weight + b2.weight,
                volume: b1.volume + b2.volume,
                stackable: b1.stackable && b2.stackable,
                codigo_viaje: b1.codigo_viaje.clone(),
                fecha_carga_contenedor: b1.fecha_carga_contenedor.clone(),
                fecha_entrada_almacen: b1.fecha_entrada_almacen.clone(),
                tipo_partida: b1.tipo_partida.clone(),
            });
            combined[i] = true;
            combined[j] = true;
        } else if !consumed_any[i] {
            result.push(boxes[i].clone());
        }
    }

    result
}

/// Runs pallet normalization and the merge passes, returning the
/// (possibly smaller, possibly-composite-carrying) box list plus the
/// decomposition map the postprocessor will later walk.
pub fn preprocess(
    mut boxes: Vec<InputBox>,
    container: (Cm, Cm, Cm),
    config: &crate::config::PreprocessConfig,
) -> Result<(Vec<InputBox>, DecompositionMap)> {
    let (_, container_width, container_height) = container;
    validate(&boxes, container_height)?;
    normalize_pallets(&mut boxes);

    let mut hmap = DecompositionMap::new();
    let boxes = merge_vertical(boxes, container_height, &mut hmap);
    let boxes = if config.merge_horizontal {
        merge_horizontal(boxes, container_width, &mut hmap)
    } else {
        boxes
    };

    Ok((boxes, hmap))
}

/// Decides each box's packer-facing orientation and priority (spec.md §3):
/// a dimension that exceeds or nearly matches the container width is
/// forced onto the length axis; otherwise length/width are swapped with
/// probability ½. Boxes that end up filling the width get priority 1.
pub fn orient_boxes(
    boxes: &[InputBox],
    container_width: Cm,
    rng: &mut impl Rng,
) -> Vec<(BoxId, OrientedBox)> {
    boxes
        .iter()
        .map(|b| {
            let gap_if_width_is_l = container_width - b.width;
            let gap_if_length_is_l = container_width - b.length;

            let (l, w) = if b.length > container_width
                || (0..ORIENTATION_WIDTH_GAP).contains(&gap_if_width_is_l)
            {
                (b.length, b.width)
            } else if b.width > container_width
                || (0..ORIENTATION_WIDTH_GAP).contains(&gap_if_length_is_l)
            {
                (b.width, b.length)
            } else if rng.random_bool(0.5) {
                (b.width, b.length)
            } else {
                (b.length, b.width)
            };

            let priority = if container_width - w < PRIORITY_WIDTH_GAP {
                1
            } else {
                2
            };

            (
                b.id.clone(),
                OrientedBox {
                    l,
                    w,
                    h: b.height,
                    priority,
                    stackable: b.stackable,
                },
            )
        })
        .collect()
}

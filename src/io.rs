//! Tabular I/O: reads the input box table and writes the not-loaded
//! table (spec.md §6). Out of scope per spec.md §1 as a *subsystem* to
//! design from scratch, but the ambient stack still needs a concrete,
//! idiomatic reader/writer — `csv` + `serde` is the natural sibling of
//! the `serde_json` checkpoint codec already in the teacher's stack
//! (spec.md §4.8).

use crate::error::{PackingError, Result};
use crate::model::{BoxId, InputBox};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the input schema (spec.md §6). `Remontable` arrives as
/// `SI`/`NO` or `1`/`0` so it is read as a string and parsed explicitly
/// rather than leaning on serde's bool deserializer.
#[derive(Debug, Clone, Deserialize)]
struct InputBoxRow {
    #[serde(rename = "Partida")]
    partida: String,
    #[serde(rename = "Expedicion")]
    expedicion: String,
    #[serde(rename = "LargoCm")]
    largo_cm: i32,
    #[serde(rename = "AnchoCm")]
    ancho_cm: i32,
    #[serde(rename = "AltoCm")]
    alto_cm: i32,
    #[serde(rename = "Remontable")]
    remontable: String,
    #[serde(rename = "PesoKg")]
    peso_kg: f64,
    #[serde(rename = "Volumen")]
    volumen: f64,
    #[serde(rename = "CodigoViaje")]
    codigo_viaje: String,
    #[serde(rename = "FechaCargaContenedor")]
    fecha_carga_contenedor: String,
    #[serde(rename = "FechaEntradaAlmacen")]
    fecha_entrada_almacen: String,
    #[serde(rename = "TipoPartida")]
    tipo_partida: String,
}

fn parse_stackable(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "SI" | "1" => Ok(true),
        "NO" | "0" => Ok(false),
        other => Err(PackingError::InvalidInput(format!(
            "unrecognized Remontable value {other:?}"
        ))),
    }
}

/// Reads the input box table (spec.md §6).
pub fn read_boxes(path: &Path) -> Result<Vec<InputBox>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| PackingError::InvalidInput(format!("could not open {path:?}: {e}")))?;

    let mut boxes = Vec::new();
    for record in reader.deserialize::<InputBoxRow>() {
        let row = record.map_err(|e| PackingError::InvalidInput(e.to_string()))?;
        boxes.push(InputBox {
            id: BoxId::new(row.partida, row.expedicion),
            length: row.largo_cm,
            width: row.ancho_cm,
            height: row.alto_cm,
            weight: row.peso_kg,
            volume: row.volumen,
            stackable: parse_stackable(&row.remontable)?,
            codigo_viaje: row.codigo_viaje,
            fecha_carga_contenedor: row.fecha_carga_contenedor,
            fecha_entrada_almacen: row.fecha_entrada_almacen,
            tipo_partida: row.tipo_partida,
        });
    }
    Ok(boxes)
}

/// One row of the not-loaded output table (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct UnloadedBoxRow {
    #[serde(rename = "Partida")]
    pub partida: String,
    #[serde(rename = "LargoCm")]
    pub largo_cm: i32,
    #[serde(rename = "AnchoCm")]
    pub ancho_cm: i32,
    #[serde(rename = "AltoCm")]
    pub alto_cm: i32,
    #[serde(rename = "Prioridad")]
    pub prioridad: u8,
    #[serde(rename = "Remontable")]
    pub remontable: bool,
}

/// Writes the not-loaded boxes table (spec.md §6). A non-empty table is
/// expected and normal (spec.md §7).
pub fn write_unloaded(rows: &[UnloadedBoxRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PackingError::InvalidInput(e.to_string()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| PackingError::InvalidInput(format!("could not create {path:?}: {e}")))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PackingError::InvalidInput(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PackingError::InvalidInput(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_si_no_and_numeric_stackable_flags() {
        assert!(parse_stackable("SI").unwrap());
        assert!(parse_stackable("si").unwrap());
        assert!(parse_stackable("1").unwrap());
        assert!(!parse_stackable("NO").unwrap());
        assert!(!parse_stackable("0").unwrap());
        assert!(parse_stackable("maybe").is_err());
    }

    #[test]
    fn reads_and_writes_round_trip() {
        let dir = std::env::temp_dir().join(format!("stowbox-io-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input_path = dir.join("boxes.csv");
        std::fs::write(
            &input_path,
            "Partida,Expedicion,LargoCm,AnchoCm,AltoCm,Remontable,PesoKg,Volumen,CodigoViaje,FechaCargaContenedor,FechaEntradaAlmacen,TipoPartida\n\
             P1,E1,100,80,90,SI,50.5,0.72,V1,2026-01-01,2026-01-01,normal\n",
        )
        .unwrap();

        let boxes = read_boxes(&input_path).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].id, BoxId::new("P1", "E1"));
        assert!(boxes[0].stackable);

        let out_path = dir.join("unloaded.csv");
        let rows = vec![UnloadedBoxRow {
            partida: "P1".into(),
            largo_cm: 100,
            ancho_cm: 80,
            alto_cm: 90,
            prioridad: 2,
            remontable: true,
        }];
        write_unloaded(&rows, &out_path).unwrap();
        assert!(out_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

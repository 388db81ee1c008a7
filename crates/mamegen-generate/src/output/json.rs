use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use mamegen_core::CellValue;

use crate::errors::OutputError;

/// Write rows as a pretty-printed JSON array of objects keyed by column
/// name. Empty cells serialise as `null`; numbers stay numeric.
pub fn write_rows_json(
    path: &Path,
    header: &[String],
    rows: &[Vec<CellValue>],
) -> Result<(), OutputError> {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut object = Map::with_capacity(header.len());
            for (name, cell) in header.iter().zip(row) {
                object.insert(name.clone(), cell.to_json());
            }
            Value::Object(object)
        })
        .collect();

    let mut bytes = serde_json::to_vec_pretty(&records)?;
    bytes.push(b'\n');
    fs::write(path, bytes)?;
    Ok(())
}

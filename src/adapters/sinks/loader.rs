//! Artifact loading
//!
//! Reads an exported file back into a [`DataTable`] so a validation-only
//! retry can recompute its aggregate without touching the source. Format
//! is decided by extension; only the re-loadable formats are supported.

use crate::domain::{Cell, DataTable, Result, StrataError};
use std::fs;
use std::path::Path;

/// Load an exported artifact back into a table
pub fn load_artifact(path: &Path) -> Result<DataTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "json" => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        "csv" => load_csv(path),
        other => Err(StrataError::Validation(format!(
            "cannot reload artifact format '{other}': {}",
            path.display()
        ))),
    }
}

fn load_csv(path: &Path) -> Result<DataTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_cell).collect());
    }
    Ok(DataTable::new(columns, rows))
}

/// CSV carries no types; recover the ones the sum cares about
fn parse_cell(field: &str) -> Cell {
    if field.is_empty() {
        Cell::Null
    } else if let Ok(n) = field.parse::<f64>() {
        Cell::Number(n)
    } else if field == "true" {
        Cell::Bool(true)
    } else if field == "false" {
        Cell::Bool(false)
    } else {
        Cell::Text(field.to_string())
    }
}

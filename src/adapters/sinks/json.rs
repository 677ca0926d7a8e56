//! JSON sink
//!
//! Writes the table as a `{columns, rows}` document. This is the artifact
//! format of choice: it round-trips cell types exactly, so a
//! validation-only retry can reload it without loss.

use super::{ExportFormat, ExportSink};
use crate::domain::{DataTable, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonSink;

impl ExportSink for JsonSink {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(&self, table: &DataTable, dir: &Path, stem: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{stem}.json"));
        fs::write(&path, serde_json::to_string(table)?)?;
        Ok(path)
    }
}

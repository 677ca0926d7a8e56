//! Export sinks
//!
//! One sink per output format. Every sink writes the whole table to a file
//! named `<stem>.<ext>` under the output directory and returns the path it
//! wrote. The JSON document doubles as the re-loadable artifact used by
//! validation-only retries; [`loader`] reads artifacts back.

pub mod csv;
pub mod json;
pub mod loader;
pub mod xlsx;

use crate::domain::{DataTable, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::xlsx::XlsxSink;
pub use loader::load_artifact;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Whether an artifact in this format can be loaded back for a
    /// validation-only retry
    pub fn reloadable(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Json)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes a table to one file format
pub trait ExportSink: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Write `table` as `<stem>.<ext>` under `dir`, returning the path
    fn export(&self, table: &DataTable, dir: &Path, stem: &str) -> Result<PathBuf>;
}

/// Build the sink set for the configured formats, in the given order
pub fn build_sinks(formats: &[ExportFormat]) -> Vec<Box<dyn ExportSink>> {
    formats
        .iter()
        .map(|format| -> Box<dyn ExportSink> {
            match format {
                ExportFormat::Csv => Box::new(CsvSink),
                ExportFormat::Json => Box::new(JsonSink),
                ExportFormat::Xlsx => Box::new(XlsxSink),
            }
        })
        .collect()
}

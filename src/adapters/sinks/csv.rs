//! CSV sink

use super::{ExportFormat, ExportSink};
use crate::domain::{DataTable, Result};
use std::path::{Path, PathBuf};

pub struct CsvSink;

impl ExportSink for CsvSink {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn export(&self, table: &DataTable, dir: &Path, stem: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{stem}.csv"));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.render()))?;
        }
        writer.flush()?;
        Ok(path)
    }
}

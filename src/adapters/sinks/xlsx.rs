//! Excel sink

use super::{ExportFormat, ExportSink};
use crate::domain::{Cell, DataTable, Result};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

pub struct XlsxSink;

impl ExportSink for XlsxSink {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn export(&self, table: &DataTable, dir: &Path, stem: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{stem}.xlsx"));
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, name)?;
        }
        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = row_idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Null => {}
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row_num, col, *b)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col, *n)?;
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(row_num, col, s)?;
                    }
                }
            }
        }

        workbook.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_a_workbook_file() {
        let dir = TempDir::new().unwrap();
        let table = DataTable::new(
            vec!["Amount".to_string()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Text("x".to_string())]],
        );

        let path = XlsxSink.export(&table, dir.path(), "slice").unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}

//! In-memory tabular data
//!
//! The analytical source returns an opaque rectangular result set; the
//! processor materializes it into a [`DataTable`] with a row count and an
//! estimated memory footprint. Tables are large (tens of thousands of rows,
//! multi-MB), so they are dropped as soon as an attempt finishes.

use serde::{Deserialize, Serialize};

/// A single typed cell
///
/// Serializes untagged, so a JSON table document reads naturally:
/// numbers as numbers, strings as strings, `null` for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the cell for text formats (CSV); `Null` renders empty.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Rectangular in-memory table: ordered column names and typed rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of an exactly-named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First column whose name contains `keyword`, case-insensitive
    pub fn column_index_containing(&self, keyword: &str) -> Option<usize> {
        let keyword = keyword.to_lowercase();
        self.columns
            .iter()
            .position(|c| c.to_lowercase().contains(&keyword))
    }

    /// Sum of the numeric cells in a column; non-numeric cells contribute
    /// nothing.
    pub fn column_sum(&self, index: usize) -> f64 {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).and_then(Cell::as_f64))
            .sum()
    }

    /// Rough estimate of the table's in-memory footprint in bytes
    pub fn estimated_bytes(&self) -> u64 {
        let header: u64 = self.columns.iter().map(|c| c.len() as u64 + 24).sum();
        let cells: u64 = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|cell| match cell {
                Cell::Null => 8,
                Cell::Bool(_) => 8,
                Cell::Number(_) => 8,
                Cell::Text(s) => s.len() as u64 + 24,
            })
            .sum();
        header + cells + (self.rows.len() as u64 * 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DataTable {
        DataTable::new(
            vec!["CaseId".to_string(), "AmountInEuro".to_string()],
            vec![
                vec![Cell::Text("a".to_string()), Cell::Number(10.5)],
                vec![Cell::Text("b".to_string()), Cell::Number(4.5)],
                vec![Cell::Text("c".to_string()), Cell::Null],
            ],
        )
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert_eq!(table.column_index("AmountInEuro"), Some(1));
        assert_eq!(table.column_index("amountineuro"), None);
        assert_eq!(table.column_index_containing("AMOUNT"), Some(1));
    }

    #[test]
    fn test_column_sum_skips_non_numeric() {
        let table = sample_table();
        assert!((table.column_sum(1) - 15.0).abs() < f64::EPSILON);
        assert_eq!(table.column_sum(0), 0.0);
    }

    #[test]
    fn test_estimated_bytes_grows_with_rows() {
        let table = sample_table();
        let mut bigger = table.clone();
        bigger
            .rows
            .push(vec![Cell::Text("d".to_string()), Cell::Number(1.0)]);
        assert!(bigger.estimated_bytes() > table.estimated_bytes());
    }

    #[test]
    fn test_cell_json_round_trip() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        let back: DataTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        // Null cells serialize as JSON null
        assert!(json.contains("null"));
    }

    #[test]
    fn test_cell_render() {
        assert_eq!(Cell::Null.render(), "");
        assert_eq!(Cell::Bool(true).render(), "true");
        assert_eq!(Cell::Number(3.5).render(), "3.5");
        assert_eq!(Cell::Text("x".to_string()).render(), "x");
    }
}

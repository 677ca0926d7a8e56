//! Aggregate column resolution
//!
//! Extraction and validation queries name their measure column slightly
//! differently depending on how the source renders it, so the sum column
//! is resolved by trying exact names first and a keyword scan second.

use crate::domain::DataTable;

/// Exact column names tried in order before falling back to a keyword scan
const SUM_COLUMN_CANDIDATES: [&str; 6] = [
    "[SumAmountInEuro]",
    "SumAmountInEuro",
    "AmountInEuro",
    "[AmountInEuro]",
    "Amount",
    "amount",
];

const SUM_COLUMN_KEYWORD: &str = "amount";

/// Locate the measure column in `table`
pub fn resolve_sum_column(table: &DataTable) -> Option<usize> {
    for candidate in SUM_COLUMN_CANDIDATES {
        if let Some(index) = table.column_index(candidate) {
            return Some(index);
        }
    }
    table.column_index_containing(SUM_COLUMN_KEYWORD)
}

/// Sum the measure column of `table`
///
/// Returns 0.0 when no measure column can be located, which downstream
/// reconciliation will surface as a mismatch rather than silently pass.
pub fn table_sum(table: &DataTable) -> f64 {
    match resolve_sum_column(table) {
        Some(index) => table.column_sum(index),
        None => {
            tracing::warn!(
                columns = ?table.columns,
                "No measure column found, using 0.0 as the sum"
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> DataTable {
        DataTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn test_exact_candidate_wins_over_keyword() {
        let table = table(
            &["TotalAmountOwed", "SumAmountInEuro"],
            vec![vec![Cell::Number(1.0), Cell::Number(2.0)]],
        );
        assert_eq!(resolve_sum_column(&table), Some(1));
        assert_eq!(table_sum(&table), 2.0);
    }

    #[test]
    fn test_bracketed_name_resolves() {
        let table = table(
            &["[Month]", "[SumAmountInEuro]"],
            vec![vec![Cell::Number(7.0), Cell::Number(150.5)]],
        );
        assert_eq!(table_sum(&table), 150.5);
    }

    #[test]
    fn test_keyword_fallback_is_case_insensitive() {
        let table = table(
            &["InvoiceId", "NetAmountEUR"],
            vec![
                vec![Cell::Number(1.0), Cell::Number(10.0)],
                vec![Cell::Number(2.0), Cell::Number(20.0)],
            ],
        );
        assert_eq!(resolve_sum_column(&table), Some(1));
        assert_eq!(table_sum(&table), 30.0);
    }

    #[test]
    fn test_missing_column_sums_to_zero() {
        let table = table(
            &["InvoiceId", "Quantity"],
            vec![vec![Cell::Number(1.0), Cell::Number(3.0)]],
        );
        assert_eq!(resolve_sum_column(&table), None);
        assert_eq!(table_sum(&table), 0.0);
    }

    #[test]
    fn test_non_numeric_cells_are_skipped() {
        let table = table(
            &["Amount"],
            vec![
                vec![Cell::Number(5.0)],
                vec![Cell::Null],
                vec![Cell::Text("n/a".to_string())],
                vec![Cell::Number(2.5)],
            ],
        );
        assert_eq!(table_sum(&table), 7.5);
    }
}

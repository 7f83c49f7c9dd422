//! Core data types shared across pgsight crates

pub mod format;

pub use format::TableFormat;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully materialized query result.
///
/// Column order is whatever the source reported; every row holds one JSON
/// value per column. Produced fresh per execution and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row; length must match the column count
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_set_accumulates_rows() {
        let mut result = ResultSet::new(vec!["a".to_string(), "b".to_string()]);
        assert!(result.is_empty());

        result.push_row(vec![json!(1), json!("x")]);
        result.push_row(vec![json!(2), json!(null)]);

        assert_eq!(result.row_count(), 2);
        assert!(!result.is_empty());
        assert_eq!(result.rows[1][1], Value::Null);
    }
}

//! Editor defaults

use doc_model::{DEFAULT_TABLE_COLUMNS, DEFAULT_TABLE_ROWS};
use serde::{Deserialize, Serialize};

/// Tunable editor behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Rows in a newly inserted table
    pub table_rows: usize,
    /// Columns in a newly inserted table
    pub table_columns: usize,
    /// Maximum number of undo entries kept
    pub max_undo_entries: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            table_rows: DEFAULT_TABLE_ROWS,
            table_columns: DEFAULT_TABLE_COLUMNS,
            max_undo_entries: 100,
        }
    }
}

//! Table Commands
//!
//! Structural table edits. Row and column commands act on the table that
//! owns a given cell and rebalance that table afterwards.

use crate::command::snapshot;
use crate::{Command, CommandResult, EditError, Result};
use doc_model::{CellLocation, DocumentTree, NodeId, Selection};

/// Table-editing context: the most recently clicked cell and its table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableContext {
    pub table_id: NodeId,
    pub cell_id: NodeId,
}

impl TableContext {
    /// Context for a cell, if the cell is in a table
    pub fn for_cell(tree: &DocumentTree, cell_id: NodeId) -> Option<Self> {
        tree.locate_cell(cell_id).map(|location| Self {
            table_id: location.table_id,
            cell_id,
        })
    }

    /// The cell still exists in the same table
    pub fn is_live(&self, tree: &DocumentTree) -> bool {
        tree.locate_cell(self.cell_id).map(|l| l.table_id) == Some(self.table_id)
    }
}

/// Resolve a cell or fail with a precondition error
fn current_cell(tree: &DocumentTree, cell_id: NodeId) -> Result<CellLocation> {
    tree.locate_cell(cell_id)
        .ok_or_else(|| EditError::Precondition("current cell no longer exists".into()))
}

/// Reject tables without rows
fn require_rows(tree: &DocumentTree, table_id: NodeId) -> Result<()> {
    if tree.row_cell_counts(table_id).is_empty() {
        return Err(EditError::Precondition("table has no rows".into()));
    }
    Ok(())
}

// =============================================================================
// Insert Table Command
// =============================================================================

/// Insert an empty table at the selection
#[derive(Debug, Clone)]
pub struct InsertTable {
    pub rows: usize,
    pub columns: usize,
}

impl InsertTable {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

impl Command for InsertTable {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let selection =
            selection.ok_or_else(|| EditError::Precondition("no selection".into()))?;
        if self.rows == 0 || self.columns == 0 {
            return Err(EditError::InvalidCommand(format!(
                "cannot insert a {}x{} table",
                self.rows, self.columns
            )));
        }

        let mut new_tree = tree.clone();
        let index = selection.index();
        new_tree.insert_table_at(index, self.rows, self.columns)?;

        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::collapsed(index)),
            inverse: snapshot(tree, Some(selection)),
        })
    }

    fn display_name(&self) -> &str {
        "Insert Table"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Row and Column Commands
// =============================================================================

/// Append a row at the bottom of the cell's table
#[derive(Debug, Clone)]
pub struct InsertRow {
    pub cell_id: NodeId,
}

impl Command for InsertRow {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let location = current_cell(tree, self.cell_id)?;
        require_rows(tree, location.table_id)?;
        let row_width = tree
            .get_table_row(location.row_id)
            .map(|row| row.cell_count())
            .unwrap_or(0);

        let mut new_tree = tree.clone();
        new_tree.append_table_row(location.table_id)?;
        new_tree.balance_table(location.table_id)?;

        Ok(CommandResult {
            tree: new_tree,
            selection: selection.map(|sel| sel.shifted(row_width as isize)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Insert Row"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Append a column on the right of the cell's table
#[derive(Debug, Clone)]
pub struct InsertColumn {
    pub cell_id: NodeId,
}

impl Command for InsertColumn {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let location = current_cell(tree, self.cell_id)?;
        require_rows(tree, location.table_id)?;

        let mut new_tree = tree.clone();
        new_tree.append_table_column(location.table_id)?;
        new_tree.balance_table(location.table_id)?;

        Ok(CommandResult {
            tree: new_tree,
            selection: selection.map(|sel| sel.shifted(location.row_index as isize)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Insert Column"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Remove the row containing the cell
#[derive(Debug, Clone)]
pub struct DeleteRow {
    pub cell_id: NodeId,
}

impl Command for DeleteRow {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let location = current_cell(tree, self.cell_id)?;

        let mut new_tree = tree.clone();
        new_tree.remove_table_row(location.row_id)?;
        new_tree.balance_table(location.table_id)?;

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Delete Row"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Remove the cell's column from every row that has it
#[derive(Debug, Clone)]
pub struct DeleteColumn {
    pub cell_id: NodeId,
}

impl Command for DeleteColumn {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let location = current_cell(tree, self.cell_id)?;

        let mut new_tree = tree.clone();
        new_tree.remove_table_column(location.table_id, location.column_index)?;
        new_tree.balance_table(location.table_id)?;

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Delete Column"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Cell Content and Balancing
// =============================================================================

/// Replace the text of a cell
#[derive(Debug, Clone)]
pub struct EditCell {
    pub cell_id: NodeId,
    pub content: String,
}

impl Command for EditCell {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        current_cell(tree, self.cell_id)?;

        let mut new_tree = tree.clone();
        if let Some(cell) = new_tree.get_table_cell_mut(self.cell_id) {
            cell.content = self.content.clone();
        }

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Edit Cell"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Pad short rows; one table or all of them
#[derive(Debug, Clone, Default)]
pub struct BalanceCells {
    pub table_id: Option<NodeId>,
}

impl Command for BalanceCells {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        let added = match self.table_id {
            Some(table_id) => new_tree.balance_table(table_id)?,
            None => new_tree.balance_all_tables(),
        };
        tracing::debug!(added, "balanced table cells");

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Balance Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

//! Table model - Tables, rows and cells
//!
//! Tables are top-level blocks occupying a single document index. Each row
//! carries a row-format tag that every cell of the row repeats; cells added
//! to an existing row inherit the tag of the row's first cell.

use crate::{DocModelError, DocumentTree, Node, NodeId, NodeType, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rows in a freshly inserted table
pub const DEFAULT_TABLE_ROWS: usize = 3;
/// Columns in a freshly inserted table
pub const DEFAULT_TABLE_COLUMNS: usize = 3;

// =============================================================================
// Row format
// =============================================================================

/// Opaque tag grouping the cells of one row, e.g. `row-7c1e...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowFormat(String);

impl RowFormat {
    /// Generate a fresh tag
    pub fn generate() -> Self {
        Self(format!("row-{}", crate::node_id::element_suffix(Uuid::new_v4())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowFormat {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A table cell holding plain text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    id: NodeId,
    parent: Option<NodeId>,
    /// Row-format tag of the row this cell was created for
    pub row_format: RowFormat,
    /// Cell text
    pub content: String,
}

impl TableCell {
    /// Create an empty cell with a row-format tag
    pub fn new(row_format: RowFormat) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            row_format,
            content: String::new(),
        }
    }

    pub fn with_content(row_format: RowFormat, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(row_format)
        }
    }
}

impl Node for TableCell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableCell
    }

    fn children(&self) -> &[NodeId] {
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        false
    }

    fn text_content(&self) -> Option<&str> {
        Some(&self.content)
    }
}

/// A table row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    id: NodeId,
    parent: Option<NodeId>,
    /// Tag used for cells when the row has none to inherit from
    pub row_format: RowFormat,
    children: Vec<NodeId>,
}

impl TableRow {
    pub fn new(row_format: RowFormat) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            row_format,
            children: Vec::new(),
        }
    }

    pub fn add_cell(&mut self, cell_id: NodeId) {
        self.children.push(cell_id);
    }

    pub fn insert_cell(&mut self, index: usize, cell_id: NodeId) {
        let at = index.min(self.children.len());
        self.children.insert(at, cell_id);
    }

    pub fn remove_cell(&mut self, cell_id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|&id| id == cell_id) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn cell_count(&self) -> usize {
        self.children.len()
    }
}

impl Node for TableRow {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableRow
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        true
    }
}

/// A table block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Table {
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row_id: NodeId) {
        self.children.push(row_id);
    }

    pub fn remove_row(&mut self, row_id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|&id| id == row_id) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn row_count(&self) -> usize {
        self.children.len()
    }

    /// Element id used in rendered markup
    pub fn element_id(&self) -> String {
        self.id.element_id("table")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Table {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Table
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        true
    }
}

/// Where a cell sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocation {
    pub table_id: NodeId,
    pub row_id: NodeId,
    pub row_index: usize,
    pub column_index: usize,
}

// =============================================================================
// Tree operations
// =============================================================================

impl DocumentTree {
    /// Get a table by ID
    pub fn get_table(&self, id: NodeId) -> Option<&Table> {
        self.nodes.tables.get(&id)
    }

    /// Get a table row by ID
    pub fn get_table_row(&self, id: NodeId) -> Option<&TableRow> {
        self.nodes.table_rows.get(&id)
    }

    /// Get a table cell by ID
    pub fn get_table_cell(&self, id: NodeId) -> Option<&TableCell> {
        self.nodes.table_cells.get(&id)
    }

    /// Get a mutable table cell by ID
    pub fn get_table_cell_mut(&mut self, id: NodeId) -> Option<&mut TableCell> {
        self.nodes.table_cells.get_mut(&id)
    }

    /// Table ids in body order
    pub fn table_ids(&self) -> Vec<NodeId> {
        self.tables().map(|t| t.id()).collect()
    }

    /// Store a detached `rows` x `cols` table; each row gets its own fresh tag
    pub fn create_table(&mut self, rows: usize, cols: usize) -> NodeId {
        let mut table = Table::new();
        table.set_parent(Some(self.root_id()));
        let table_id = table.id();
        self.nodes.tables.insert(table_id, table);

        for _ in 0..rows {
            let row = TableRow::new(RowFormat::generate());
            // The table was just stored
            if let Ok(row_id) = self.insert_table_row(row, table_id) {
                for _ in 0..cols {
                    let _ = self.append_cell_to_row(row_id);
                }
            }
        }
        table_id
    }

    /// Create a table and place it at a document index
    pub fn insert_table_at(&mut self, index: usize, rows: usize, cols: usize) -> Result<NodeId> {
        // Validate before creating anything
        self.locate(index)?;
        let table_id = self.create_table(rows, cols);
        self.insert_block_at(index, table_id)?;
        Ok(table_id)
    }

    /// Append a row to a table
    pub fn insert_table_row(&mut self, mut row: TableRow, table_id: NodeId) -> Result<NodeId> {
        let row_id = row.id();
        row.set_parent(Some(table_id));
        let table = self
            .nodes
            .tables
            .get_mut(&table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?;
        table.add_row(row_id);
        self.nodes.table_rows.insert(row_id, row);
        Ok(row_id)
    }

    /// Append a cell to a row, tagged like the row's first cell
    pub fn append_cell_to_row(&mut self, row_id: NodeId) -> Result<NodeId> {
        let format = self
            .row_format_of(row_id)
            .ok_or(DocModelError::NodeNotFound(row_id.as_uuid()))?;
        let mut cell = TableCell::new(format);
        cell.set_parent(Some(row_id));
        let cell_id = cell.id();
        if let Some(row) = self.nodes.table_rows.get_mut(&row_id) {
            row.add_cell(cell_id);
        }
        self.nodes.table_cells.insert(cell_id, cell);
        Ok(cell_id)
    }

    /// Tag new cells of a row should carry
    pub fn row_format_of(&self, row_id: NodeId) -> Option<RowFormat> {
        let row = self.nodes.table_rows.get(&row_id)?;
        let first = row
            .children()
            .first()
            .and_then(|id| self.nodes.table_cells.get(id))
            .map(|cell| cell.row_format.clone());
        Some(first.unwrap_or_else(|| row.row_format.clone()))
    }

    /// Find the table, row and column of a cell
    pub fn locate_cell(&self, cell_id: NodeId) -> Option<CellLocation> {
        let row_id = self.nodes.table_cells.get(&cell_id)?.parent()?;
        let row = self.nodes.table_rows.get(&row_id)?;
        let table_id = row.parent()?;
        let table = self.nodes.tables.get(&table_id)?;
        Some(CellLocation {
            table_id,
            row_id,
            row_index: table.children().iter().position(|&id| id == row_id)?,
            column_index: row.children().iter().position(|&id| id == cell_id)?,
        })
    }

    /// Cell count of every row
    pub fn row_cell_counts(&self, table_id: NodeId) -> Vec<usize> {
        self.get_table(table_id)
            .map(|table| {
                table
                    .children()
                    .iter()
                    .filter_map(|id| self.nodes.table_rows.get(id))
                    .map(|row| row.cell_count())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All rows have the same number of cells
    pub fn is_rectangular(&self, table_id: NodeId) -> bool {
        let counts = self.row_cell_counts(table_id);
        counts.windows(2).all(|w| w[0] == w[1])
    }

    /// Cell texts row by row
    pub fn table_contents(&self, table_id: NodeId) -> Vec<Vec<String>> {
        let Some(table) = self.get_table(table_id) else {
            return Vec::new();
        };
        table
            .children()
            .iter()
            .filter_map(|id| self.nodes.table_rows.get(id))
            .map(|row| {
                row.children()
                    .iter()
                    .filter_map(|id| self.nodes.table_cells.get(id))
                    .map(|cell| cell.content.clone())
                    .collect()
            })
            .collect()
    }

    /// Append a row with as many cells as the first row and a fresh tag
    pub fn append_table_row(&mut self, table_id: NodeId) -> Result<NodeId> {
        let width = self
            .row_cell_counts(table_id)
            .first()
            .copied()
            .ok_or_else(|| DocModelError::InvalidOperation("table has no rows".into()))?;
        let row_id = self.insert_table_row(TableRow::new(RowFormat::generate()), table_id)?;
        for _ in 0..width {
            self.append_cell_to_row(row_id)?;
        }
        Ok(row_id)
    }

    /// Append one cell to every row; returns the new cells
    pub fn append_table_column(&mut self, table_id: NodeId) -> Result<Vec<NodeId>> {
        let rows = self
            .get_table(table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?
            .children()
            .to_vec();
        if rows.is_empty() {
            return Err(DocModelError::InvalidOperation("table has no rows".into()));
        }
        rows.into_iter()
            .map(|row_id| self.append_cell_to_row(row_id))
            .collect()
    }

    /// Remove a row and its cells
    pub fn remove_table_row(&mut self, row_id: NodeId) -> Result<TableRow> {
        let row = self
            .nodes
            .table_rows
            .remove(&row_id)
            .ok_or(DocModelError::NodeNotFound(row_id.as_uuid()))?;
        for cell_id in row.children() {
            self.nodes.table_cells.remove(cell_id);
        }
        if let Some(table) = row.parent().and_then(|t| self.nodes.tables.get_mut(&t)) {
            table.remove_row(row_id);
        }
        Ok(row)
    }

    /// Remove the cell at `column` from every row long enough to have one.
    ///
    /// Returns the number of cells removed.
    pub fn remove_table_column(&mut self, table_id: NodeId, column: usize) -> Result<usize> {
        let rows = self
            .get_table(table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?
            .children()
            .to_vec();
        let mut removed = 0;
        for row_id in rows {
            let Some(cell_id) = self
                .nodes
                .table_rows
                .get(&row_id)
                .and_then(|row| row.children().get(column).copied())
            else {
                continue;
            };
            if let Some(row) = self.nodes.table_rows.get_mut(&row_id) {
                row.remove_cell(cell_id);
            }
            self.nodes.table_cells.remove(&cell_id);
            removed += 1;
        }
        Ok(removed)
    }

    /// Pad every short row up to the longest row; returns cells added
    pub fn balance_table(&mut self, table_id: NodeId) -> Result<usize> {
        let rows = self
            .get_table(table_id)
            .ok_or(DocModelError::NodeNotFound(table_id.as_uuid()))?
            .children()
            .to_vec();
        let width = self.row_cell_counts(table_id).into_iter().max().unwrap_or(0);

        let mut added = 0;
        for row_id in rows {
            let count = self
                .nodes
                .table_rows
                .get(&row_id)
                .map(|r| r.cell_count())
                .unwrap_or(width);
            for _ in count..width {
                self.append_cell_to_row(row_id)?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Balance every table in the document
    pub fn balance_all_tables(&mut self) -> usize {
        self.table_ids()
            .into_iter()
            .filter_map(|id| self.balance_table(id).ok())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_tree() -> (DocumentTree, NodeId) {
        let mut tree = DocumentTree::from_text("before");
        let table_id = tree
            .insert_table_at(6, DEFAULT_TABLE_ROWS, DEFAULT_TABLE_COLUMNS)
            .unwrap();
        (tree, table_id)
    }

    fn row(tree: &DocumentTree, table_id: NodeId, index: usize) -> NodeId {
        tree.get_table(table_id).unwrap().children()[index]
    }

    #[test]
    fn test_row_format_shape() {
        let format = RowFormat::generate();
        assert!(format.as_str().starts_with("row-"));
        assert_eq!(format.as_str().len(), "row-".len() + 32);
    }

    #[test]
    fn test_insert_table_default_shape() {
        let (tree, table_id) = table_tree();
        assert_eq!(tree.row_cell_counts(table_id), vec![3, 3, 3]);
        // paragraph, table, trailing paragraph
        assert_eq!(tree.blocks().len(), 3);
        assert_eq!(tree.blocks()[1], table_id);
    }

    #[test]
    fn test_cells_share_row_format() {
        let (tree, table_id) = table_tree();
        let formats: Vec<RowFormat> = tree
            .get_table(table_id)
            .unwrap()
            .children()
            .iter()
            .map(|&row_id| tree.row_format_of(row_id).unwrap())
            .collect();
        assert_ne!(formats[0], formats[1]);
        for (i, format) in formats.iter().enumerate() {
            let row = tree.get_table_row(row(&tree, table_id, i)).unwrap();
            for cell_id in row.children() {
                assert_eq!(&tree.get_table_cell(*cell_id).unwrap().row_format, format);
            }
        }
    }

    #[test]
    fn test_insert_table_mid_paragraph_splits() {
        let mut tree = DocumentTree::from_text("abcd");
        let table_id = tree.insert_table_at(2, 1, 1).unwrap();
        assert_eq!(tree.blocks()[1], table_id);
        assert_eq!(tree.paragraph_text(tree.blocks()[0]), "ab");
        assert_eq!(tree.paragraph_text(tree.blocks()[2]), "cd");
    }

    #[test]
    fn test_append_column_inherits_first_cell_format() {
        let (mut tree, table_id) = table_tree();
        let added = tree.append_table_column(table_id).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(tree.row_cell_counts(table_id), vec![4, 4, 4]);
        for cell_id in added {
            let loc = tree.locate_cell(cell_id).unwrap();
            assert_eq!(loc.column_index, 3);
            let first = tree.get_table_row(loc.row_id).unwrap().children()[0];
            assert_eq!(
                tree.get_table_cell(cell_id).unwrap().row_format,
                tree.get_table_cell(first).unwrap().row_format
            );
        }
    }

    #[test]
    fn test_append_row_gets_fresh_format() {
        let (mut tree, table_id) = table_tree();
        let row_id = tree.append_table_row(table_id).unwrap();
        assert_eq!(tree.row_cell_counts(table_id), vec![3, 3, 3, 3]);
        let fresh = tree.row_format_of(row_id).unwrap();
        for i in 0..3 {
            assert_ne!(tree.row_format_of(row(&tree, table_id, i)).unwrap(), fresh);
        }
    }

    #[test]
    fn test_remove_column_skips_short_rows() {
        let (mut tree, table_id) = table_tree();
        let short_row = row(&tree, table_id, 1);
        let last = *tree.get_table_row(short_row).unwrap().children().last().unwrap();
        tree.nodes.table_rows.get_mut(&short_row).unwrap().remove_cell(last);

        let removed = tree.remove_table_column(table_id, 2).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(tree.row_cell_counts(table_id), vec![2, 2, 2]);
    }

    #[test]
    fn test_balance_is_idempotent() {
        let (mut tree, table_id) = table_tree();
        let r = row(&tree, table_id, 0);
        tree.append_cell_to_row(r).unwrap();
        assert!(!tree.is_rectangular(table_id));

        assert_eq!(tree.balance_table(table_id).unwrap(), 2);
        assert!(tree.is_rectangular(table_id));
        assert_eq!(tree.balance_table(table_id).unwrap(), 0);
    }

    #[test]
    fn test_remove_row_drops_cells() {
        let (mut tree, table_id) = table_tree();
        let r = row(&tree, table_id, 1);
        let cells = tree.get_table_row(r).unwrap().children().to_vec();
        tree.remove_table_row(r).unwrap();
        assert_eq!(tree.row_cell_counts(table_id), vec![3, 3]);
        assert!(cells.iter().all(|c| tree.get_table_cell(*c).is_none()));
    }

    #[test]
    fn test_delete_range_removes_table() {
        let (mut tree, table_id) = table_tree();
        let start = tree.block_start(table_id).unwrap();
        let summary = tree.delete_range(start, 1).unwrap();
        assert_eq!(summary.removed_tables, vec![table_id]);
        assert!(tree.get_table(table_id).is_none());
        assert!(tree.nodes.table_cells.is_empty());
    }
}

//! Table plugin

use super::{ContentPrompt, PromptRequest};
use crate::{
    Command, DeleteColumn, DeleteRow, EditCell, EditingEngine, InsertColumn, InsertRow,
    InsertTable, Result,
};
use doc_model::NodeId;
use serde::{Deserialize, Serialize};

/// Structural toolbar actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAction {
    AddRow,
    AddColumn,
    DeleteRow,
    DeleteColumn,
}

/// Inserts tables and applies row/column actions to the current cell
pub struct TablePlugin<P: ContentPrompt> {
    prompt: P,
}

impl<P: ContentPrompt> TablePlugin<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Insert a table of the configured size at the selection
    pub fn insert_table(&self, engine: &mut EditingEngine) -> Result<bool> {
        let config = engine.config().clone();
        engine.execute_quietly(Box::new(InsertTable::new(
            config.table_rows,
            config.table_columns,
        )))
    }

    /// Single click on a cell makes it the current cell
    pub fn click_cell(&self, engine: &mut EditingEngine, cell_id: NodeId) -> bool {
        engine.select_cell(cell_id)
    }

    /// Apply a toolbar action to the current cell's table
    pub fn handle(&self, engine: &mut EditingEngine, action: TableAction) -> Result<bool> {
        let Some(context) = engine.table_context() else {
            tracing::debug!(?action, "no current cell");
            return Ok(false);
        };
        let cell_id = context.cell_id;
        let command: Box<dyn Command> = match action {
            TableAction::AddRow => Box::new(InsertRow { cell_id }),
            TableAction::AddColumn => Box::new(InsertColumn { cell_id }),
            TableAction::DeleteRow => Box::new(DeleteRow { cell_id }),
            TableAction::DeleteColumn => Box::new(DeleteColumn { cell_id }),
        };
        engine.execute_quietly(command)
    }

    /// Double click: prompt with the cell text and store the answer.
    ///
    /// Cancel leaves the cell alone; any answer, blank included, replaces it.
    pub async fn edit_cell(&self, engine: &mut EditingEngine, cell_id: NodeId) -> Result<bool> {
        let Some(current) = engine.tree().get_table_cell(cell_id).map(|c| c.content.clone()) else {
            tracing::debug!(%cell_id, "not a table cell");
            return Ok(false);
        };
        engine.select_cell(cell_id);

        let Some(content) = self.prompt.prompt(PromptRequest::edit_cell(current)).await else {
            return Ok(false);
        };
        engine.execute_quietly(Box::new(EditCell { cell_id, content }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::ScriptedPrompt;
    use doc_model::{DocumentTree, Node, Selection};

    fn engine_with_table() -> (EditingEngine, TablePlugin<ScriptedPrompt>, NodeId) {
        let mut engine = EditingEngine::with_tree(DocumentTree::from_text("text"));
        engine.set_selection(Some(Selection::collapsed(4)));
        let plugin = TablePlugin::new(ScriptedPrompt::default());
        assert!(plugin.insert_table(&mut engine).unwrap());
        let table_id = engine.tree().table_ids()[0];
        (engine, plugin, table_id)
    }

    fn cell(engine: &EditingEngine, table_id: NodeId, row: usize, col: usize) -> NodeId {
        let tree = engine.tree();
        let row_id = tree.get_table(table_id).unwrap().children()[row];
        tree.get_table_row(row_id).unwrap().children()[col]
    }

    #[test]
    fn test_insert_table_without_selection_is_noop() {
        let mut engine = EditingEngine::with_tree(DocumentTree::from_text("text"));
        let plugin = TablePlugin::new(ScriptedPrompt::default());
        assert!(!plugin.insert_table(&mut engine).unwrap());
        assert!(engine.tree().table_ids().is_empty());
    }

    #[test]
    fn test_actions_without_current_cell_are_noops() {
        let (mut engine, plugin, table_id) = engine_with_table();
        for action in [
            TableAction::AddRow,
            TableAction::AddColumn,
            TableAction::DeleteRow,
            TableAction::DeleteColumn,
        ] {
            assert!(!plugin.handle(&mut engine, action).unwrap());
        }
        assert_eq!(engine.tree().row_cell_counts(table_id), vec![3, 3, 3]);
    }

    #[test]
    fn test_add_column_inherits_formats() {
        let (mut engine, plugin, table_id) = engine_with_table();
        let clicked = cell(&engine, table_id, 0, 0);
        assert!(plugin.click_cell(&mut engine, clicked));
        assert!(plugin.handle(&mut engine, TableAction::AddColumn).unwrap());

        let tree = engine.tree();
        assert_eq!(tree.row_cell_counts(table_id), vec![4, 4, 4]);
        for row in 0..3 {
            let first = tree.get_table_cell(cell(&engine, table_id, row, 0)).unwrap();
            let added = tree.get_table_cell(cell(&engine, table_id, row, 3)).unwrap();
            assert_eq!(first.row_format, added.row_format);
        }
    }

    #[test]
    fn test_delete_row_clears_context_until_next_click() {
        let (mut engine, plugin, table_id) = engine_with_table();
        let clicked = cell(&engine, table_id, 1, 2);
        plugin.click_cell(&mut engine, clicked);

        assert!(plugin.handle(&mut engine, TableAction::DeleteRow).unwrap());
        assert_eq!(engine.tree().row_cell_counts(table_id), vec![3, 3]);
        assert_eq!(engine.table_context(), None);
        assert!(!plugin.handle(&mut engine, TableAction::AddRow).unwrap());

        let next = cell(&engine, table_id, 0, 0);
        plugin.click_cell(&mut engine, next);
        assert!(plugin.handle(&mut engine, TableAction::AddRow).unwrap());
        assert_eq!(engine.tree().row_cell_counts(table_id), vec![3, 3, 3]);
    }

    #[test]
    fn test_delete_column_of_current_cell_clears_context() {
        let (mut engine, plugin, table_id) = engine_with_table();
        let clicked = cell(&engine, table_id, 0, 0);
        plugin.click_cell(&mut engine, clicked);
        assert!(plugin.handle(&mut engine, TableAction::DeleteColumn).unwrap());
        // the clicked cell was in the removed column
        assert_eq!(engine.table_context(), None);
        assert_eq!(engine.tree().row_cell_counts(table_id), vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn test_edit_cell_prefills_and_replaces() {
        let mut engine = EditingEngine::with_tree(DocumentTree::from_text("text"));
        engine.set_selection(Some(Selection::collapsed(4)));
        let plugin = TablePlugin::new(ScriptedPrompt::answering([Some("lemma"), None, Some("")]));
        plugin.insert_table(&mut engine).unwrap();
        let table_id = engine.tree().table_ids()[0];
        let target = cell(&engine, table_id, 0, 1);

        assert!(plugin.edit_cell(&mut engine, target).await.unwrap());
        assert_eq!(engine.tree().get_table_cell(target).unwrap().content, "lemma");
        assert_eq!(engine.table_context().map(|c| c.cell_id), Some(target));

        // cancelled
        assert!(!plugin.edit_cell(&mut engine, target).await.unwrap());
        assert_eq!(engine.tree().get_table_cell(target).unwrap().content, "lemma");
        let second = plugin.prompt().requests.lock().unwrap()[1].clone();
        assert_eq!(second, PromptRequest::edit_cell("lemma"));

        // blank answers are kept
        assert!(plugin.edit_cell(&mut engine, target).await.unwrap());
        assert_eq!(engine.tree().get_table_cell(target).unwrap().content, "");
    }
}

//! Command execution engine

use crate::command::snapshot;
use crate::{
    restore_invariants, Command, EditError, EditorConfig, InvariantReport, Result, TableContext,
    UndoManager,
};
use doc_model::{DocumentTree, NodeId, Selection};

/// The main editing engine that manages document state and command execution
#[derive(Debug)]
pub struct EditingEngine {
    /// Current document tree
    tree: DocumentTree,
    /// Current selection; `None` when the editor has no focus
    selection: Option<Selection>,
    /// Most recently clicked table cell
    table_context: Option<TableContext>,
    /// Undo manager
    undo_manager: UndoManager,
    config: EditorConfig,
}

impl EditingEngine {
    /// Create a new editing engine with an empty document
    pub fn new() -> Self {
        Self::with_tree(DocumentTree::default())
    }

    /// Create an editing engine with a specific document tree
    pub fn with_tree(tree: DocumentTree) -> Self {
        Self::with_config(tree, EditorConfig::default())
    }

    /// Create an editing engine with a document tree and configuration
    pub fn with_config(tree: DocumentTree, config: EditorConfig) -> Self {
        Self {
            tree,
            selection: None,
            table_context: None,
            undo_manager: UndoManager::with_limit(config.max_undo_entries),
            config,
        }
    }

    /// Get the current document tree
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Mutable access for edits made outside the command system.
    ///
    /// Call [`EditingEngine::notify_external_change`] afterwards.
    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    /// Get the current selection
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set the selection
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The current table-editing context
    pub fn table_context(&self) -> Option<TableContext> {
        self.table_context
    }

    /// Record a clicked cell; returns false if it is not a table cell
    pub fn select_cell(&mut self, cell_id: NodeId) -> bool {
        self.table_context = TableContext::for_cell(&self.tree, cell_id);
        self.table_context.is_some()
    }

    pub fn clear_table_context(&mut self) {
        self.table_context = None;
    }

    /// Execute a command
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        let result = command.apply(&self.tree, self.selection)?;
        tracing::debug!(command = command.display_name(), "executed command");

        // Record for undo; redo restores this exact result
        let redo = snapshot(&result.tree, result.selection);
        self.undo_manager.push(command, result.inverse, redo);

        // Update state
        self.tree = result.tree;
        self.selection = result.selection;
        self.refresh_table_context();

        Ok(())
    }

    /// Execute a command, treating an unmet precondition as a quiet no-op.
    ///
    /// Returns whether the command ran.
    pub fn execute_quietly(&mut self, command: Box<dyn Command>) -> Result<bool> {
        let name = command.display_name().to_string();
        match self.execute(command) {
            Ok(()) => Ok(true),
            Err(EditError::Precondition(reason)) => {
                tracing::debug!(command = %name, %reason, "command skipped");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Undo the last command
    pub fn undo(&mut self) -> Result<()> {
        let result = self
            .undo_manager
            .peek_undo()?
            .apply(&self.tree, self.selection)?;

        self.undo_manager.commit_undo();
        self.tree = result.tree;
        self.selection = result.selection;
        self.restore_invariants();

        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> Result<()> {
        let result = self
            .undo_manager
            .peek_redo()?
            .apply(&self.tree, self.selection)?;

        self.undo_manager.commit_redo(result.inverse);
        self.tree = result.tree;
        self.selection = result.selection;
        self.restore_invariants();

        Ok(())
    }

    /// Repair the document after a change made outside the command system
    pub fn notify_external_change(&mut self) -> InvariantReport {
        let report = self.restore_invariants();
        let last = self.tree.length().saturating_sub(1);
        self.selection = self.selection.map(|sel| {
            if sel.index() > last {
                Selection::collapsed(last)
            } else {
                sel
            }
        });
        report
    }

    fn restore_invariants(&mut self) -> InvariantReport {
        let report = restore_invariants(&mut self.tree);
        self.refresh_table_context();
        report
    }

    /// Drop the table context once its cell is gone
    fn refresh_table_context(&mut self) {
        if let Some(context) = self.table_context {
            if !context.is_live(&self.tree) {
                tracing::debug!("current cell removed, clearing table context");
                self.table_context = None;
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}

impl Default for EditingEngine {
    fn default() -> Self {
        Self::new()
    }
}

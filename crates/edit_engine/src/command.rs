//! Command system for document editing
//!
//! A command is applied to a borrowed tree and returns a new tree, the new
//! selection and an inverse command for undo. Inverses are snapshots of the
//! tree taken before the edit, so every command is exactly reversible.

use crate::{restore_invariants, EditError, Result};
use doc_model::{DocumentTree, Selection};

/// Result of applying a command
#[derive(Debug)]
pub struct CommandResult {
    /// The new document tree after the command
    pub tree: DocumentTree,
    /// The new selection after the command
    pub selection: Option<Selection>,
    /// The inverse command (for undo)
    pub inverse: Box<dyn Command>,
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply this command to a document
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult>;

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;
}

impl Clone for Box<dyn Command> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Build the undo inverse for an edit of `tree`
pub(crate) fn snapshot(tree: &DocumentTree, selection: Option<Selection>) -> Box<dyn Command> {
    Box::new(RestoreSnapshot {
        tree: tree.clone(),
        selection,
    })
}

// ============================================================================
// Restore Snapshot
// ============================================================================

/// Replace the document with a saved copy
#[derive(Debug, Clone)]
pub struct RestoreSnapshot {
    pub tree: DocumentTree,
    pub selection: Option<Selection>,
}

impl Command for RestoreSnapshot {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        Ok(CommandResult {
            tree: self.tree.clone(),
            selection: self.selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Restore"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Insert Text
// ============================================================================

/// Insert plain text at a document index
#[derive(Debug, Clone)]
pub struct InsertText {
    pub index: usize,
    pub text: String,
}

impl InsertText {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

impl Command for InsertText {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        new_tree.insert_text(self.index, &self.text)?;

        let caret = self.index + self.text.chars().count();
        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::collapsed(caret)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Typing"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Insert Paragraph Break
// ============================================================================

/// Split the paragraph at a document index
#[derive(Debug, Clone)]
pub struct InsertParagraphBreak {
    pub index: usize,
}

impl InsertParagraphBreak {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Command for InsertParagraphBreak {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        new_tree.insert_paragraph_break(self.index)?;

        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::collapsed(self.index + 1)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "New Paragraph"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Delete Range
// ============================================================================

/// Delete a range of the document.
///
/// The range may take out indicators, tables or the notes area, so the
/// invariant pass always runs afterwards.
#[derive(Debug, Clone)]
pub struct DeleteRange {
    pub index: usize,
    pub length: usize,
}

impl DeleteRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

impl Command for DeleteRange {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        if self.length == 0 {
            return Err(EditError::Precondition("empty range".into()));
        }
        let mut new_tree = tree.clone();
        let summary = new_tree.delete_range(self.index, self.length)?;
        tracing::debug!(
            indicators = summary.removed_indicators.len(),
            tables = summary.removed_tables.len(),
            notes_area = summary.removed_notes_area,
            "range deleted"
        );
        restore_invariants(&mut new_tree);

        let caret = self.index.min(new_tree.length().saturating_sub(1));
        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::collapsed(caret)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Delete"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{FootnoteEntry, FootnoteId};

    #[test]
    fn test_insert_text_moves_caret() {
        let tree = DocumentTree::from_text("ab");
        let result = InsertText::new(1, "xyz").apply(&tree, None).unwrap();
        assert_eq!(result.selection, Some(Selection::collapsed(4)));
        assert_eq!(result.tree.paragraph_text(result.tree.blocks()[0]), "axyzb");
    }

    #[test]
    fn test_inverse_restores_original() {
        let tree = DocumentTree::from_text("ab");
        let result = InsertText::new(2, "c").apply(&tree, Some(Selection::collapsed(2))).unwrap();
        let undone = result.inverse.apply(&result.tree, result.selection).unwrap();
        assert_eq!(undone.tree.paragraph_text(undone.tree.blocks()[0]), "ab");
        assert_eq!(undone.selection, Some(Selection::collapsed(2)));
    }

    #[test]
    fn test_paragraph_break() {
        let tree = DocumentTree::from_text("abcd");
        let result = InsertParagraphBreak::new(2).apply(&tree, None).unwrap();
        assert_eq!(result.tree.blocks().len(), 2);
        assert_eq!(result.selection, Some(Selection::collapsed(3)));
    }

    #[test]
    fn test_delete_range_drops_orphaned_entry() {
        let mut tree = DocumentTree::from_text("abcdef");
        let fid = FootnoteId::new();
        tree.ensure_notes_area();
        tree.insert_footnote_indicator(3, fid, 1).unwrap();
        tree.insert_footnote_entry(FootnoteEntry::new(fid, 1, "note")).unwrap();

        let result = DeleteRange::new(2, 3).apply(&tree, None).unwrap();
        assert_eq!(result.tree.footnote_count(), 0);
        assert!(result.tree.notes_area.as_ref().unwrap().is_empty());
        assert!(result.tree.footnotes_consistent());
    }

    #[test]
    fn test_delete_empty_range_is_precondition() {
        let tree = DocumentTree::from_text("ab");
        let err = DeleteRange::new(0, 0).apply(&tree, None).unwrap_err();
        assert!(err.is_precondition());
    }
}

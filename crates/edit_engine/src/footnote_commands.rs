//! Footnote Commands
//!
//! Commands for creating, editing and removing footnotes. Every command
//! leaves the indicators numbered 1..N in document order with the entries
//! in the same order.

use crate::command::snapshot;
use crate::{Command, CommandResult, EditError, Result};
use doc_model::{DocModelError, DocumentTree, FootnoteEntry, FootnoteId, Selection};

// =============================================================================
// Ensure Notes Area Command
// =============================================================================

/// Create the notes area at the end of the document if it is missing
#[derive(Debug, Clone, Default)]
pub struct EnsureNotesArea;

impl Command for EnsureNotesArea {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        if tree.has_notes_area() {
            return Err(EditError::Precondition("notes area already exists".into()));
        }
        let mut new_tree = tree.clone();
        new_tree.ensure_notes_area();

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Add Notes Area"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Insert Footnote Command
// =============================================================================

/// Insert a footnote indicator and its entry
#[derive(Debug, Clone)]
pub struct InsertFootnote {
    /// Identity given to the new pair
    pub footnote_id: FootnoteId,
    /// Where the indicator goes; `None` means the end of the main text
    pub index: Option<usize>,
    /// Entry content
    pub content: String,
}

impl InsertFootnote {
    /// Create a new insert footnote command
    pub fn new(index: Option<usize>, content: impl Into<String>) -> Self {
        Self {
            footnote_id: FootnoteId::new(),
            index,
            content: content.into(),
        }
    }

    /// Where the indicator lands for a requested index.
    ///
    /// An index outside every paragraph (on a table or the notes area)
    /// falls back to the end of the main text, as does no index at all.
    pub fn resolve_index(tree: &DocumentTree, index: Option<usize>) -> Option<usize> {
        index
            .filter(|&at| tree.resolve_inline(at).is_ok())
            .or_else(|| tree.text_end_index())
    }
}

impl Command for InsertFootnote {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        if self.content.trim().is_empty() {
            return Err(EditError::Precondition("footnote text is empty".into()));
        }
        let index = Self::resolve_index(tree, self.index)
            .ok_or_else(|| EditError::Precondition("document has no text".into()))?;

        let mut new_tree = tree.clone();
        let number = new_tree.footnote_count() as u32 + 1;
        new_tree.ensure_notes_area();
        new_tree.insert_footnote_indicator(index, self.footnote_id, number)?;
        new_tree.insert_footnote_entry(FootnoteEntry::new(
            self.footnote_id,
            number,
            self.content.clone(),
        ))?;
        new_tree.renumber_footnotes();

        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::collapsed(index + 1)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Insert Footnote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Edit Footnote Command
// =============================================================================

/// Replace a footnote's text; blank text deletes the footnote
#[derive(Debug, Clone)]
pub struct EditFootnote {
    pub footnote_id: FootnoteId,
    pub content: String,
}

impl EditFootnote {
    pub fn new(footnote_id: FootnoteId, content: impl Into<String>) -> Self {
        Self {
            footnote_id,
            content: content.into(),
        }
    }
}

impl Command for EditFootnote {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        if self.content.trim().is_empty() {
            return DeleteFootnote::new(self.footnote_id).apply(tree, selection);
        }

        let mut new_tree = tree.clone();
        new_tree.set_footnote_content(self.footnote_id, &self.content)?;

        Ok(CommandResult {
            tree: new_tree,
            selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Edit Footnote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Delete Footnote Command
// =============================================================================

/// Remove a footnote's indicator and entry
#[derive(Debug, Clone)]
pub struct DeleteFootnote {
    pub footnote_id: FootnoteId,
}

impl DeleteFootnote {
    pub fn new(footnote_id: FootnoteId) -> Self {
        Self { footnote_id }
    }
}

impl Command for DeleteFootnote {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let indicator_index = tree
            .find_indicator(self.footnote_id)
            .and_then(|id| tree.index_of_inline(id));

        let mut new_tree = tree.clone();
        if !new_tree.remove_footnote(self.footnote_id) {
            return Err(DocModelError::NodeNotFound(self.footnote_id.as_uuid()).into());
        }
        new_tree.renumber_footnotes();

        // Keep the caret on the same text when the indicator sat before it
        let new_selection = match (selection, indicator_index) {
            (Some(sel), Some(at)) if sel.index() > at => Some(sel.shifted(-1)),
            _ => selection,
        };

        Ok(CommandResult {
            tree: new_tree,
            selection: new_selection,
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        "Delete Footnote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(tree: &DocumentTree, index: Option<usize>, content: &str) -> (DocumentTree, FootnoteId) {
        let command = InsertFootnote::new(index, content);
        let fid = command.footnote_id;
        (command.apply(tree, None).unwrap().tree, fid)
    }

    #[test]
    fn test_ensure_notes_area_twice_is_precondition() {
        let tree = DocumentTree::from_text("abc");
        let result = EnsureNotesArea.apply(&tree, None).unwrap();
        assert!(result.tree.has_notes_area());
        let err = EnsureNotesArea.apply(&result.tree, None).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_insert_defaults_to_end_of_text() {
        let tree = DocumentTree::from_text("abc\ndef");
        let command = InsertFootnote::new(None, "note");
        let result = command.apply(&tree, None).unwrap();
        let last_para = result.tree.blocks()[1];
        assert_eq!(result.tree.paragraph_text(last_para), "def•1");
        assert_eq!(result.selection, Some(Selection::collapsed(8)));
    }

    #[test]
    fn test_insert_before_existing_footnote() {
        let tree = DocumentTree::from_text("first second");
        let (tree, later) = insert(&tree, Some(12), "later");
        let (tree, earlier) = insert(&tree, Some(5), "earlier");

        let para = tree.blocks()[0];
        assert_eq!(tree.paragraph_text(para), "first•1 second•2");
        let area = tree.notes_area.as_ref().unwrap();
        assert_eq!(area.entries()[0].footnote_id, earlier);
        assert_eq!(area.entries()[0].display_text(), "1. earlier");
        assert_eq!(area.entries()[1].footnote_id, later);
        assert!(tree.footnotes_consistent());
    }

    #[test]
    fn test_index_on_notes_area_falls_back_to_text_end() {
        let tree = DocumentTree::from_text("abcd");
        let (tree, first) = insert(&tree, Some(2), "first");
        // "ab•1cd\n" then the notes area
        let notes_index = tree.length() - 1;

        let command = InsertFootnote::new(Some(notes_index), "second");
        let second = command.footnote_id;
        let result = command.apply(&tree, None).unwrap();
        let tree = result.tree;
        assert_eq!(tree.paragraph_text(tree.blocks()[0]), "ab•1cd•2");
        assert_eq!(result.selection, Some(Selection::collapsed(7)));
        assert_eq!(tree.footnote_entry(first).unwrap().number, 1);
        assert_eq!(tree.footnote_entry(second).unwrap().number, 2);
        assert!(tree.footnotes_consistent());
    }

    #[test]
    fn test_blank_content_is_rejected() {
        let tree = DocumentTree::from_text("abc");
        let err = InsertFootnote::new(Some(1), "   ").apply(&tree, None).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_edit_replaces_content() {
        let tree = DocumentTree::from_text("abc");
        let (tree, fid) = insert(&tree, Some(1), "old");
        let result = EditFootnote::new(fid, "new").apply(&tree, None).unwrap();
        assert_eq!(result.tree.footnote_entry(fid).unwrap().content, "new");
    }

    #[test]
    fn test_edit_to_blank_deletes_pair() {
        let tree = DocumentTree::from_text("abcdef");
        let (tree, a) = insert(&tree, Some(2), "a");
        let (tree, b) = insert(&tree, Some(5), "b");

        let result = EditFootnote::new(a, " ").apply(&tree, None).unwrap();
        let tree = result.tree;
        assert!(tree.find_indicator(a).is_none());
        assert!(tree.footnote_entry(a).is_none());
        assert_eq!(tree.footnote_entry(b).unwrap().number, 1);
        assert!(tree.footnotes_consistent());
    }

    #[test]
    fn test_delete_shifts_caret_after_indicator() {
        let tree = DocumentTree::from_text("abcdef");
        let (tree, fid) = insert(&tree, Some(2), "a");
        let result = DeleteFootnote::new(fid)
            .apply(&tree, Some(Selection::collapsed(5)))
            .unwrap();
        assert_eq!(result.selection, Some(Selection::collapsed(4)));
        assert_eq!(result.tree.paragraph_text(result.tree.blocks()[0]), "abcdef");
    }

    #[test]
    fn test_delete_unknown_footnote_fails() {
        let tree = DocumentTree::from_text("abc");
        let err = DeleteFootnote::new(FootnoteId::new()).apply(&tree, None).unwrap_err();
        assert!(matches!(err, EditError::DocModel(DocModelError::NodeNotFound(_))));
    }
}
